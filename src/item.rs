//! Project records shown by the picker.

use std::fmt::Display;

/// Stable identity of an item: the URI it was recorded under
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(String);

impl ItemId {
    /// Wraps a URI
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// The underlying URI
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What kind of thing was opened
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ItemKind {
    /// A folder
    #[default]
    Folder,
    /// A single file
    File,
    /// A multi-root workspace file
    Workspace,
}

impl ItemKind {
    /// Glyph used in front of the item name
    pub fn icon(self) -> &'static str {
        match self {
            ItemKind::Folder => "📁",
            ItemKind::File => "📄",
            ItemKind::Workspace => "📦",
        }
    }
}

/// A recently opened project
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    /// Identity, the recorded URI
    pub id: ItemId,
    /// Last path component
    pub name: String,
    /// Parent directory
    pub path: String,
    /// Full decoded path
    pub full_path: String,
    /// `full_path` translated for the current host, when it lives on another side of a
    /// WSL boundary
    pub display_path: Option<String>,
    /// Folder, file or workspace
    pub kind: ItemKind,
    /// Remote annotation, e.g. `SSH: host` or `WSL: Ubuntu`
    pub tag: Option<String>,
    /// Whether the path still exists
    pub valid: bool,
}

impl Item {
    /// Creates a valid local folder item from a path, mostly useful for tests and demos
    pub fn from_path(path: &str) -> Self {
        let (name, dir) = split_path(path);
        Self {
            id: ItemId::new(format!("file://{path}")),
            name,
            path: dir,
            full_path: path.to_string(),
            display_path: None,
            kind: ItemKind::Folder,
            tag: None,
            valid: true,
        }
    }

    /// The recorded URI
    pub fn uri(&self) -> &str {
        self.id.as_str()
    }

    /// Path as it should be shown to the user
    pub fn shown_path(&self) -> &str {
        self.display_path.as_deref().unwrap_or(&self.full_path)
    }

    /// Directory shown in the path column
    pub fn shown_dir(&self) -> String {
        match &self.display_path {
            Some(display) => split_path(display).1,
            None => self.path.clone(),
        }
    }

    /// Name followed by the tag and the invalid marker, as listed
    pub fn label(&self) -> String {
        let mut label = self.name.clone();
        if let Some(tag) = &self.tag {
            label.push_str(&format!(" [{tag}]"));
        }
        if !self.valid {
            label.push_str(" [invalid]");
        }
        label
    }

    /// Whether `needle` (already lowercased) appears in the name or the directory
    pub fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.path.to_lowercase().contains(needle)
    }
}

/// Splits a slash-separated path into `(name, parent)`.
///
/// The name falls back to the whole path when it would be empty, the parent to `/`.
pub fn split_path(path: &str) -> (String, String) {
    let (dir, base) = match path.rfind('/') {
        Some(pos) => (&path[..pos], &path[pos + 1..]),
        None => ("", path),
    };
    let name = if base.is_empty() { path } else { base };
    let dir = if dir.is_empty() { "/" } else { dir };
    (name.to_string(), dir.to_string())
}
