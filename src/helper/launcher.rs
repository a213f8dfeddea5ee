//! Launching the editor on projects.

use std::env;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;
use thiserror::Error;

use super::shell::spawn_detached;
use crate::item::Item;

/// Editor commands looked up on `PATH`, in order
const EDITOR_COMMANDS: &[&str] = &["code", "code-insiders", "codium"];
const REMOTE_SCHEME: &str = "vscode-remote://";
const FILE_SCHEME: &str = "file://";

/// Errors raised while starting the editor
#[derive(Debug, Error)]
pub enum LaunchError {
    /// No editor executable could be found
    #[error("editor not found, use --code to point at it")]
    NotFound,
    /// The editor process could not be started
    #[error("failed to start {program}: {source}")]
    Spawn {
        /// Program that failed
        program: String,
        /// Underlying error
        #[source]
        source: io::Error,
    },
    /// The temporary workspace file could not be written
    #[error("cannot write the workspace file: {0}")]
    Workspace(#[from] io::Error),
    /// None of the items can go in a workspace file
    #[error("no local folder to put in a workspace")]
    NoLocalFolders,
}

#[derive(Serialize)]
struct WorkspaceFile<'a> {
    folders: Vec<WorkspaceFolder<'a>>,
}

#[derive(Serialize)]
struct WorkspaceFolder<'a> {
    path: &'a str,
}

/// The editor executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editor {
    program: PathBuf,
}

impl Editor {
    /// Uses `program` as the editor
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Finds the editor: `custom` first (a path or a command name), then the usual commands
    /// on `PATH`, then the usual install locations on Windows
    pub fn locate(custom: Option<&str>) -> Result<Self, LaunchError> {
        if let Some(custom) = custom {
            if Path::new(custom).exists() {
                return Ok(Self::new(custom));
            }
            match which::which(custom) {
                Ok(found) => return Ok(Self::new(found)),
                Err(e) => debug!("{custom} is not on PATH: {e}"),
            }
        }

        if let Some(found) = EDITOR_COMMANDS.iter().find_map(|cmd| which::which(cmd).ok()) {
            return Ok(Self::new(found));
        }

        if cfg!(windows)
            && let Some(found) = windows_install_candidates().into_iter().find(|p| p.exists())
        {
            return Ok(Self::new(found));
        }
        Err(LaunchError::NotFound)
    }

    /// Path of the executable
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Opens `items` in the editor.
    ///
    /// With `as_workspace` and several items, the local folders are gathered in a temporary
    /// workspace file. Otherwise each item is opened on its own, the first one reusing the
    /// current window unless `new_window` is set.
    pub fn open(&self, items: &[&Item], new_window: bool, as_workspace: bool) -> Result<(), LaunchError> {
        if items.is_empty() {
            return Ok(());
        }
        if as_workspace && items.len() > 1 {
            let workspace = write_workspace(items)?;
            return self.spawn(&[workspace.into_os_string()]);
        }
        for args in invocations(items, new_window) {
            let args: Vec<OsString> = args.into_iter().map(OsString::from).collect();
            self.spawn(&args)?;
        }
        Ok(())
    }

    fn spawn(&self, args: &[OsString]) -> Result<(), LaunchError> {
        let mut command = if self.is_batch_file() {
            let mut command = Command::new("cmd");
            command.arg("/C").arg(&self.program);
            command
        } else {
            Command::new(&self.program)
        };
        command.args(args);
        debug!("launching {command:?}");
        spawn_detached(&mut command)
            .map(drop)
            .map_err(|source| LaunchError::Spawn {
                program: self.program.display().to_string(),
                source,
            })
    }

    fn is_batch_file(&self) -> bool {
        cfg!(windows)
            && self
                .program
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("cmd"))
    }
}

/// Editor arguments for opening each item on its own
pub fn invocations(items: &[&Item], new_window: bool) -> Vec<Vec<String>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let fresh = new_window || i > 0;
            if item.uri().starts_with(REMOTE_SCHEME) {
                let mut args = vec!["--folder-uri".to_string(), item.uri().to_string()];
                if fresh {
                    args.insert(0, "--new-window".to_string());
                }
                args
            } else {
                let flag = if fresh { "-n" } else { "-r" };
                vec![flag.to_string(), item.full_path.clone()]
            }
        })
        .collect()
}

/// Writes a `.code-workspace` file listing the local folders among `items` and keeps it
/// on disk for the editor to read
pub fn write_workspace(items: &[&Item]) -> Result<PathBuf, LaunchError> {
    let folders: Vec<WorkspaceFolder> = items
        .iter()
        .filter(|item| item.uri().starts_with(FILE_SCHEME))
        .map(|item| WorkspaceFolder {
            path: &item.full_path,
        })
        .collect();
    if folders.is_empty() {
        return Err(LaunchError::NoLocalFolders);
    }

    let mut file = tempfile::Builder::new()
        .prefix("vsp-")
        .suffix(".code-workspace")
        .tempfile()?;
    serde_json::to_writer(&mut file, &WorkspaceFile { folders }).map_err(io::Error::from)?;
    file.flush()?;
    let (_, path) = file.keep().map_err(|e| e.error)?;
    debug!("wrote workspace {}", path.display());
    Ok(path)
}

fn windows_install_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(local) = env::var_os("LOCALAPPDATA") {
        let programs = PathBuf::from(local).join("Programs");
        candidates.extend([
            programs.join("Microsoft VS Code").join("bin").join("code.cmd"),
            programs.join("Microsoft VS Code").join("Code.exe"),
            programs.join("Microsoft VS Code Insiders").join("bin").join("code-insiders.cmd"),
            programs.join("Microsoft VS Code Insiders").join("Code - Insiders.exe"),
        ]);
    }
    let program_files = [
        env::var_os("ProgramFiles").unwrap_or_else(|| "C:\\Program Files".into()),
        env::var_os("ProgramFiles(x86)").unwrap_or_else(|| "C:\\Program Files (x86)".into()),
    ];
    for root in program_files.map(PathBuf::from) {
        candidates.extend([
            root.join("Microsoft VS Code").join("bin").join("code.cmd"),
            root.join("Microsoft VS Code").join("Code.exe"),
            root.join("Microsoft VS Code Insiders").join("bin").join("code-insiders.cmd"),
        ]);
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemId;

    fn remote(uri: &str) -> Item {
        let mut item = Item::from_path("/srv/app");
        item.id = ItemId::new(uri);
        item
    }

    #[test]
    fn test_local_invocations() {
        let a = Item::from_path("/p/a");
        let b = Item::from_path("/p/b");
        assert_eq!(
            invocations(&[&a, &b], false),
            vec![vec!["-r".to_string(), "/p/a".to_string()], vec!["-n".to_string(), "/p/b".to_string()]]
        );
        assert_eq!(invocations(&[&a], true), vec![vec!["-n".to_string(), "/p/a".to_string()]]);
    }

    #[test]
    fn test_remote_invocations() {
        let r = remote("vscode-remote://ssh-remote%2Bbox/srv/app");
        assert_eq!(
            invocations(&[&r], false),
            vec![vec![
                "--folder-uri".to_string(),
                "vscode-remote://ssh-remote%2Bbox/srv/app".to_string()
            ]]
        );
        let a = Item::from_path("/p/a");
        let args = invocations(&[&a, &r], false);
        assert_eq!(args[1][0], "--new-window");
    }

    #[test]
    fn test_workspace_file_lists_local_folders() {
        let a = Item::from_path("/p/a");
        let b = Item::from_path("/p/b");
        let r = remote("vscode-remote://wsl%2Bubuntu/home/me");
        let path = write_workspace(&[&a, &r, &b]).unwrap();
        assert!(path.to_string_lossy().ends_with(".code-workspace"));

        let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(written, serde_json::json!({"folders": [{"path": "/p/a"}, {"path": "/p/b"}]}));
    }

    #[test]
    fn test_workspace_needs_local_folders() {
        let r = remote("vscode-remote://wsl%2Bubuntu/home/me");
        assert!(matches!(write_workspace(&[&r]), Err(LaunchError::NoLocalFolders)));
    }

    #[test]
    fn test_locate_explicit_path() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_string_lossy().into_owned();
        let editor = Editor::locate(Some(&path)).unwrap();
        assert_eq!(editor.program(), file.path());
    }
}
