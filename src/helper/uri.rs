//! Translation of recently-opened entries into [`Item`]s.
//!
//! Entries carry a `file://` or `vscode-remote://` URI. This module decodes the path,
//! infers the remote tag and the item kind, translates paths across the WSL boundary and
//! checks whether the project still exists.

use std::borrow::Cow;
use std::fs;

use serde::Deserialize;
use url::Url;

use crate::item::{Item, ItemId, ItemKind, split_path};

const FILE_SCHEME: &str = "file://";
const REMOTE_SCHEME: &str = "vscode-remote://";

/// Extensions that make a remote "folder" a file
const CODE_EXTENSIONS: &[&str] = &[
    "py", "js", "ts", "jsx", "tsx", "vue", "json", "sh", "md", "txt", "html", "css", "scss", "yaml", "yml", "toml",
    "xml",
];

/// Operating system the picker runs on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostOs {
    /// Native Windows
    Windows,
    /// macOS
    MacOs,
    /// Linux under the Windows Subsystem for Linux
    Wsl,
    /// Any other unix
    Linux,
}

impl HostOs {
    /// Detects the current host
    pub fn detect() -> Self {
        if cfg!(windows) {
            return HostOs::Windows;
        }
        if cfg!(target_os = "macos") {
            return HostOs::MacOs;
        }
        match fs::read_to_string("/proc/version") {
            Ok(version) if version.to_lowercase().contains("microsoft") => HostOs::Wsl,
            _ => HostOs::Linux,
        }
    }
}

/// One entry of the recently-opened list, as stored by the editor
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentEntry {
    /// Set for folders
    #[serde(default)]
    pub folder_uri: Option<String>,
    /// Set for single files
    #[serde(default)]
    pub file_uri: Option<String>,
    /// Set for multi-root workspaces
    #[serde(default)]
    pub workspace: Option<WorkspaceRef>,
    /// Label chosen by the editor, remote entries carry a bracketed tag in it
    #[serde(default)]
    pub label: Option<String>,
}

/// Reference to a workspace file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceRef {
    /// URI of the `.code-workspace` file
    #[serde(default)]
    pub config_path: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl RecentEntry {
    /// The URI identifying the entry: folder, else file, else workspace configuration
    pub fn uri(&self) -> Option<&str> {
        non_empty(&self.folder_uri)
            .or_else(|| non_empty(&self.file_uri))
            .or_else(|| self.workspace.as_ref().and_then(|w| non_empty(&w.config_path)))
    }

    fn kind(&self) -> ItemKind {
        if non_empty(&self.folder_uri).is_some() {
            ItemKind::Folder
        } else if non_empty(&self.file_uri).is_some() {
            ItemKind::File
        } else if self.workspace.is_some() {
            ItemKind::Workspace
        } else {
            ItemKind::Folder
        }
    }
}

/// Builds the item for `entry`, or `None` when the entry has no URI.
///
/// `exists` decides whether a local path is still there.
pub fn item_from_entry(entry: &RecentEntry, os: HostOs, exists: &dyn Fn(&str) -> bool) -> Option<Item> {
    let uri = entry.uri()?;
    let mut kind = entry.kind();
    let mut tag = None;

    let path = if uri.starts_with(FILE_SCHEME) {
        local_path(uri)
    } else if uri.starts_with(REMOTE_SCHEME) {
        let (authority, path) = remote_parts(uri);
        tag = Some(remote_tag(&authority));
        if kind == ItemKind::Folder && looks_like_code_file(&path) {
            kind = ItemKind::File;
        }
        path
    } else {
        uri.to_string()
    };

    if let Some(labelled) = entry.label.as_deref().and_then(label_tag) {
        tag = Some(labelled);
    }

    let display_path = display_path(&path, os);
    let valid = if uri.starts_with(FILE_SCHEME) {
        match (&display_path, os) {
            (Some(display), HostOs::Wsl) => exists(display.as_str()),
            _ => exists(path.as_str()),
        }
    } else if uri.starts_with(REMOTE_SCHEME) {
        // ssh and container paths cannot be checked from here
        display_path.as_deref().is_none_or(exists)
    } else {
        true
    };

    let (name, dir) = split_path(&path);
    trace!("entry {uri} -> {path} ({kind:?}, tag {tag:?}, valid {valid})");
    Some(Item {
        id: ItemId::new(uri),
        name,
        path: dir,
        full_path: path,
        display_path,
        kind,
        tag,
        valid,
    })
}

fn percent_decode(text: &str) -> String {
    urlencoding::decode(text)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| text.to_string())
}

/// Decoded local path of a `file://` URI, without the slash in front of a drive letter
pub fn local_path(uri: &str) -> String {
    let raw = match Url::parse(uri) {
        Ok(url) => percent_decode(url.path()),
        Err(_) => percent_decode(uri.trim_start_matches(FILE_SCHEME)),
    };
    strip_drive_slash(raw)
}

/// Decoded `(authority, path)` of a `vscode-remote://` URI
fn remote_parts(uri: &str) -> (String, String) {
    match Url::parse(uri) {
        Ok(url) => (
            percent_decode(url.host_str().unwrap_or_default()),
            percent_decode(url.path()),
        ),
        Err(e) => {
            debug!("cannot parse {uri}: {e}");
            let rest = uri.trim_start_matches(REMOTE_SCHEME);
            let (authority, path) = rest.split_at(rest.find('/').unwrap_or(rest.len()));
            (percent_decode(authority), percent_decode(path))
        }
    }
}

fn strip_drive_slash(path: String) -> String {
    let bytes = path.as_bytes();
    if bytes.len() > 2 && bytes[0] == b'/' && bytes[2] == b':' {
        path[1..].to_string()
    } else {
        path
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &text[prefix.len()..])
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Tag shown for a remote authority such as `wsl+ubuntu` or `ssh-remote+box`
pub fn remote_tag(authority: &str) -> String {
    let lower = authority.to_lowercase();
    if let Some(distro) = strip_prefix_ignore_case(authority, "wsl+") {
        if distro.is_empty() {
            "WSL".to_string()
        } else {
            format!("WSL: {}", capitalize(distro))
        }
    } else if lower == "wsl" {
        "WSL".to_string()
    } else if let Some(host) = strip_prefix_ignore_case(authority, "ssh-remote+") {
        if host.is_empty() {
            "SSH".to_string()
        } else {
            format!("SSH: {host}")
        }
    } else if lower.contains("ssh") {
        "SSH".to_string()
    } else if lower.contains("dev-container") {
        "Container".to_string()
    } else {
        "Remote".to_string()
    }
}

/// Tag in the trailing brackets of an entry label, e.g. `api [SSH: box]`
pub fn label_tag(label: &str) -> Option<String> {
    let start = label.rfind('[')?;
    let end = label.rfind(']')?;
    (start < end)
        .then(|| label[start + 1..end].to_string())
        .filter(|tag| !tag.is_empty())
}

fn looks_like_code_file(path: &str) -> bool {
    let base = path.rsplit('/').next().unwrap_or(path);
    if base.starts_with('.') {
        return false;
    }
    base.rsplit_once('.')
        .is_some_and(|(_, ext)| CODE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Path as seen from `os`, when it differs from `path`
pub fn display_path(path: &str, os: HostOs) -> Option<String> {
    match os {
        HostOs::Wsl => windows_to_mount(path),
        _ => mount_to_windows(path),
    }
}

/// `D:/x` or `D:\x` to `/mnt/d/x`
pub fn windows_to_mount(path: &str) -> Option<String> {
    let bytes = path.as_bytes();
    if bytes.len() > 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        let drive = char::from(bytes[0].to_ascii_lowercase());
        let rest = path[2..].replace('\\', "/");
        Some(format!("/mnt/{drive}{rest}"))
    } else {
        None
    }
}

/// `/mnt/d/x` to `D:/x`
pub fn mount_to_windows(path: &str) -> Option<String> {
    let rest = path.strip_prefix("/mnt/")?;
    let bytes = rest.as_bytes();
    if bytes.len() > 1 && bytes[0].is_ascii_alphabetic() && bytes[1] == b'/' {
        let tail = &rest[2..];
        if tail.contains(':') {
            return None;
        }
        Some(format!("{}:/{tail}", char::from(bytes[0].to_ascii_uppercase())))
    } else {
        None
    }
}
