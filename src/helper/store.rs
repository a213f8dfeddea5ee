//! The editor's recently-opened list, kept in its SQLite state database.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::{env, fs};

use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::uri::{HostOs, RecentEntry, item_from_entry};
use crate::item::Item;

/// Key of the row holding the list
pub const HISTORY_KEY: &str = "history.recentlyOpenedPathsList";
const STATE_DB: &str = "Code/User/globalStorage/state.vscdb";

/// Errors raised while reading or rewriting the recently-opened list
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database file does not exist
    #[error("database not found: {}", .0.display())]
    Missing(PathBuf),
    /// SQLite failure
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// The list is not valid JSON
    #[error("malformed recently opened list: {0}")]
    Json(#[from] serde_json::Error),
    /// The list is valid JSON but not shaped as expected
    #[error("unexpected recently opened list layout")]
    Malformed,
    /// The database has no recently-opened row to rewrite
    #[error("the database holds no recently opened list")]
    NoHistory,
}

/// Handle on the state database.
///
/// Entries seen by [`RecentStore::load`] are remembered so that a later [`RecentStore::save`]
/// can write back entries the database no longer holds, which is how restores work.
#[derive(Debug)]
pub struct RecentStore {
    path: PathBuf,
    known: HashMap<String, Value>,
}

impl RecentStore {
    /// Opens the store at `path`, which must exist
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if !path.is_file() {
            return Err(StoreError::Missing(path));
        }
        Ok(Self {
            path,
            known: HashMap::new(),
        })
    }

    /// Location of the database
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        Ok(Connection::open_with_flags(&self.path, flags)?)
    }

    /// Reads the list, checking local paths against the filesystem
    pub fn load(&mut self, os: HostOs) -> Result<Vec<Item>, StoreError> {
        self.load_with(os, &|path| Path::new(path).exists())
    }

    /// Reads the list, with `exists` deciding whether a path is still there
    pub fn load_with(&mut self, os: HostOs, exists: &dyn Fn(&str) -> bool) -> Result<Vec<Item>, StoreError> {
        let conn = self.connect()?;
        let Some(document) = read_document(&conn)? else {
            debug!("no {HISTORY_KEY} row in {}", self.path.display());
            return Ok(Vec::new());
        };

        let mut items = Vec::new();
        for raw in entries_of(&document) {
            let entry = match RecentEntry::deserialize(raw) {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("skipping entry {raw}: {e}");
                    continue;
                }
            };
            let Some(uri) = entry.uri() else {
                continue;
            };
            self.known.insert(uri.to_string(), raw.clone());
            items.extend(item_from_entry(&entry, os, exists));
        }
        debug!("loaded {} projects from {}", items.len(), self.path.display());
        Ok(items)
    }

    /// Rewrites the list to hold exactly the entries of `items`, in that order.
    ///
    /// Every other field of the stored document is kept as it is.
    pub fn save(&mut self, items: &[Item]) -> Result<(), StoreError> {
        let conn = self.connect()?;
        let mut document = read_document(&conn)?.ok_or(StoreError::NoHistory)?;

        let mut by_uri = self.known.clone();
        for raw in entries_of(&document) {
            if let Some(uri) = entry_uri(raw) {
                by_uri.insert(uri, raw.clone());
            }
        }
        let entries: Vec<Value> = items.iter().filter_map(|item| by_uri.get(item.uri()).cloned()).collect();
        let count = entries.len();

        document
            .as_object_mut()
            .ok_or(StoreError::Malformed)?
            .insert("entries".to_string(), Value::Array(entries));
        conn.execute(
            "UPDATE ItemTable SET value = ?1 WHERE key = ?2",
            params![serde_json::to_string(&document)?, HISTORY_KEY],
        )?;
        debug!("saved {count} entries to {}", self.path.display());
        Ok(())
    }
}

fn read_document(conn: &Connection) -> Result<Option<Value>, StoreError> {
    let raw: Option<SqlValue> = conn
        .query_row("SELECT value FROM ItemTable WHERE key = ?1", [HISTORY_KEY], |row| row.get(0))
        .optional()?;
    let text = match raw {
        None | Some(SqlValue::Null) => return Ok(None),
        Some(SqlValue::Text(text)) => text,
        Some(SqlValue::Blob(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
        Some(_) => return Err(StoreError::Malformed),
    };
    Ok(Some(serde_json::from_str(&text)?))
}

fn entries_of(document: &Value) -> &[Value] {
    document
        .get("entries")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn entry_uri(raw: &Value) -> Option<String> {
    RecentEntry::deserialize(raw).ok()?.uri().map(str::to_string)
}

/// Expands a leading `~` to the home directory
pub fn expand_home(path: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (path.strip_prefix('~'), home) {
        (Some(""), Some(home)) => home,
        (Some(rest), Some(home)) if rest.starts_with('/') || rest.starts_with('\\') => home.join(&rest[1..]),
        _ => PathBuf::from(path),
    }
}

/// Database to use: `custom` when given (as is if it exists, else with `~` expanded),
/// otherwise the default location for `os`
pub fn resolve_path(custom: Option<&str>, os: HostOs) -> Option<PathBuf> {
    match custom {
        Some(custom) if Path::new(custom).exists() => Some(PathBuf::from(custom)),
        Some(custom) => Some(expand_home(custom)),
        None => default_path(os),
    }
}

/// Where the editor keeps its state database on `os`
pub fn default_path(os: HostOs) -> Option<PathBuf> {
    let base = match os {
        HostOs::Windows => env::var_os("APPDATA").map(PathBuf::from).or_else(dirs::config_dir)?,
        HostOs::MacOs => dirs::home_dir()?.join("Library/Application Support"),
        HostOs::Linux => dirs::config_dir()?,
        HostOs::Wsl => return wsl_default_path(),
    };
    Some(base.join(STATE_DB))
}

fn wsl_default_path() -> Option<PathBuf> {
    let user = Command::new("cmd.exe")
        .args(["/c", "echo %USERNAME%"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string())
        .filter(|user| !user.is_empty());
    if let Some(user) = user {
        return Some(PathBuf::from(format!("/mnt/c/Users/{user}/AppData/Roaming")).join(STATE_DB));
    }

    debug!("cannot ask Windows for the user name, scanning /mnt/c/Users");
    fs::read_dir("/mnt/c/Users")
        .ok()?
        .flatten()
        .map(|dir| dir.path().join("AppData/Roaming").join(STATE_DB))
        .find(|candidate| candidate.is_file())
}
