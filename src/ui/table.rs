use tabled::{settings::Style, Table, Tabled};

use crate::shortcut::{Shortcut, TagUsage};

#[derive(Tabled)]
pub struct ShortcutRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Path")]
    pub path: String,
    #[tabled(rename = "Tags")]
    pub tags: String,
}

impl From<&Shortcut> for ShortcutRow {
    fn from(sc: &Shortcut) -> Self {
        Self {
            name: sc.name.clone(),
            path: sc.path.clone(),
            tags: sc.tags.join(", "),
        }
    }
}

#[derive(Tabled)]
pub struct TagRow {
    #[tabled(rename = "Tag")]
    pub name: String,
    #[tabled(rename = "Shortcuts")]
    pub shortcuts: usize,
}

pub fn shortcut_table(shortcuts: &[Shortcut]) -> String {
    if shortcuts.is_empty() {
        return String::new();
    }
    let rows: Vec<ShortcutRow> = shortcuts.iter().map(ShortcutRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn tag_table(tags: &[TagUsage]) -> String {
    if tags.is_empty() {
        return String::new();
    }
    let rows: Vec<TagRow> = tags
        .iter()
        .map(|usage| TagRow {
            name: usage.tag.name.clone(),
            shortcuts: usage.shortcuts,
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}
