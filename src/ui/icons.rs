pub struct Icons;

impl Icons {
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const INFO: &str = "ℹ️";
    pub const FOLDER: &str = "📁";
    pub const TAG: &str = "🏷️";
    pub const DEL: &str = "🗑️";
    pub const POINTER: &str = "›";
}
