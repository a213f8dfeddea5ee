use std::path::{Path, PathBuf};

use color_eyre::eyre::Result;
use rusqlite::{Connection, params};
use serde_json::{Value, json};
use tempfile::TempDir;
use vsp::Host;
use vsp::helper::DesktopHost;
use vsp::helper::launcher::Editor;
use vsp::helper::store::{HISTORY_KEY, RecentStore};
use vsp::helper::uri::HostOs;

fn database(entries: Value) -> Result<(TempDir, PathBuf)> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("state.vscdb");
    let conn = Connection::open(&path)?;
    conn.execute_batch("CREATE TABLE ItemTable (key TEXT UNIQUE ON CONFLICT REPLACE, value BLOB)")?;
    conn.execute(
        "INSERT INTO ItemTable (key, value) VALUES (?1, ?2)",
        params![HISTORY_KEY, json!({ "entries": entries }).to_string()],
    )?;
    Ok((dir, path))
}

fn stored_uris(path: &Path) -> Result<Vec<String>> {
    let conn = Connection::open(path)?;
    let text: String = conn.query_row("SELECT value FROM ItemTable WHERE key = ?1", [HISTORY_KEY], |row| {
        row.get(0)
    })?;
    let document: Value = serde_json::from_str(&text)?;
    Ok(document["entries"]
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|e| e["folderUri"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default())
}

fn host(path: &Path) -> Result<DesktopHost> {
    let store = RecentStore::open(path)?;
    Ok(DesktopHost::new(store, Editor::new("vsp-missing-editor"), HostOs::Linux))
}

#[test]
fn host_delete_then_restore_persists() -> Result<()> {
    let (_dir, path) = database(json!([
        {"folderUri": "file:///p/a"},
        {"folderUri": "file:///p/b"},
        {"folderUri": "file:///p/c"},
    ]))?;
    let mut host = host(&path)?;
    let items = host.load()?;
    assert_eq!(items.len(), 3);
    // paths do not exist on this machine
    assert!(items.iter().all(|i| !i.valid));

    let removed = vec![items[1].clone()];
    let remaining = vec![items[0].clone(), items[2].clone()];
    host.delete(&removed, &remaining)?;
    assert_eq!(stored_uris(&path)?, ["file:///p/a", "file:///p/c"]);

    let restored = vec![items[1].clone(), items[0].clone(), items[2].clone()];
    host.restore(&removed, &restored)?;
    assert_eq!(stored_uris(&path)?, ["file:///p/b", "file:///p/a", "file:///p/c"]);
    Ok(())
}

#[test]
fn host_reload_reads_the_database_again() -> Result<()> {
    let (_dir, path) = database(json!([{"folderUri": "file:///p/a"}]))?;
    let mut host = host(&path)?;
    assert_eq!(host.load()?.len(), 1);

    let conn = Connection::open(&path)?;
    conn.execute(
        "INSERT INTO ItemTable (key, value) VALUES (?1, ?2)",
        params![
            HISTORY_KEY,
            json!({"entries": [{"folderUri": "file:///p/x"}, {"folderUri": "file:///p/y"}]}).to_string()
        ],
    )?;
    let names: Vec<String> = host.reload()?.into_iter().map(|i| i.name).collect();
    assert_eq!(names, ["x", "y"]);
    Ok(())
}

#[test]
fn host_open_without_editor_fails() -> Result<()> {
    let (_dir, path) = database(json!([{"folderUri": "file:///p/a"}]))?;
    let mut host = host(&path)?;
    let items = host.load()?;
    assert!(host.open(&[&items[0]], false, false).is_err());
    Ok(())
}
