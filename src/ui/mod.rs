pub mod icons;
pub mod output;
pub mod picker;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{error, header, info, muted, success};
pub use picker::{pick, Picker, PickerKey, PickerState};
pub use table::{shortcut_table, tag_table};
pub use theme::{stderr_theme, theme, Theme};
