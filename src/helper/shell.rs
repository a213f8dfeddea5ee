//! Clipboard and file manager integration.

use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

use thiserror::Error;

use super::uri::HostOs;
use crate::item::{Item, ItemKind};

/// Errors raised by shell integrations
#[derive(Debug, Error)]
pub enum ShellError {
    /// No clipboard tool is installed
    #[error("no clipboard tool found, install xclip or xsel")]
    NoClipboard,
    /// The tool could not be started or fed
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Tool that failed
        program: String,
        /// Underlying error
        #[source]
        source: io::Error,
    },
    /// The tool ran but reported a failure
    #[error("{program} failed ({status})")]
    Failed {
        /// Tool that failed
        program: String,
        /// Its exit status
        status: ExitStatus,
    },
}

/// Command line of the clipboard tool for `os`, the text goes to its stdin
pub fn clipboard_command(os: HostOs) -> Option<Vec<&'static str>> {
    match os {
        HostOs::MacOs => Some(vec!["pbcopy"]),
        HostOs::Wsl => Some(vec!["clip.exe"]),
        HostOs::Windows => Some(vec!["cmd", "/C", "clip"]),
        HostOs::Linux => {
            if which::which("xclip").is_ok() {
                Some(vec!["xclip", "-selection", "clipboard"])
            } else if which::which("xsel").is_ok() {
                Some(vec!["xsel", "--clipboard", "--input"])
            } else {
                None
            }
        }
    }
}

/// Puts `text` on the system clipboard
pub fn copy_to_clipboard(text: &str, os: HostOs) -> Result<(), ShellError> {
    let argv = clipboard_command(os).ok_or(ShellError::NoClipboard)?;
    let (program, args) = argv.split_first().ok_or(ShellError::NoClipboard)?;
    let spawn_error = |source| ShellError::Spawn {
        program: program.to_string(),
        source,
    };

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(spawn_error)?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes()).map_err(spawn_error)?;
    }
    let status = child.wait().map_err(spawn_error)?;
    if !status.success() {
        return Err(ShellError::Failed {
            program: program.to_string(),
            status,
        });
    }
    debug!("copied {} bytes with {program}", text.len());
    Ok(())
}

/// Directory to show for `item`: the folder itself, or the directory holding the file
pub fn reveal_target(item: &Item) -> &str {
    match item.kind {
        ItemKind::Folder => &item.full_path,
        _ => &item.path,
    }
}

/// `/mnt/c/x/y` to `C:\x\y`
pub fn mount_to_windows_path(path: &str) -> Option<String> {
    let rest = path.strip_prefix("/mnt/")?;
    let mut chars = rest.chars();
    let drive = chars.next().filter(char::is_ascii_alphabetic)?;
    let tail = chars.as_str();
    if !(tail.is_empty() || tail.starts_with('/')) {
        return None;
    }
    Some(format!("{}:{}", drive.to_ascii_uppercase(), tail.replace('/', "\\")))
}

/// Shows `path` in the system file manager
pub fn reveal(path: &str, os: HostOs) -> Result<(), ShellError> {
    let (program, target) = match os {
        HostOs::MacOs => ("open", path.to_string()),
        HostOs::Linux => ("xdg-open", path.to_string()),
        HostOs::Wsl => ("explorer.exe", wsl_to_windows(path)),
        HostOs::Windows => {
            let native = path.replace('/', "\\");
            let target = if Path::new(&native).exists() {
                native
            } else {
                Path::new(&native)
                    .parent()
                    .filter(|parent| parent.exists())
                    .map(|parent| parent.display().to_string())
                    .unwrap_or(native)
            };
            ("explorer", target)
        }
    };
    debug!("revealing {target} with {program}");
    // explorer exits with 1 even when it worked, so the status is not checked
    spawn_detached(Command::new(program).arg(&target))
        .map(drop)
        .map_err(|source| ShellError::Spawn {
            program: program.to_string(),
            source,
        })
}

/// Starts `command` with null stdio and returns without waiting for it.
///
/// A background thread waits on the child so it does not linger as a zombie; its handle
/// yields the exit status.
pub fn spawn_detached(command: &mut Command) -> io::Result<JoinHandle<Option<ExitStatus>>> {
    command.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        // out of the picker's process group, Ctrl-C and hangups stay with the picker
        command.process_group(0);
    }
    let mut child = command.spawn()?;
    let pid = child.id();
    thread::Builder::new()
        .name(format!("reap-{pid}"))
        .spawn(move || match child.wait() {
            Ok(status) => {
                trace!("child {pid} exited with {status}");
                Some(status)
            }
            Err(e) => {
                debug!("cannot wait for child {pid}: {e}");
                None
            }
        })
}

fn wsl_to_windows(path: &str) -> String {
    if let Some(windows) = mount_to_windows_path(path) {
        return windows;
    }
    match Command::new("wslpath").args(["-w", path]).output() {
        Ok(out) if out.status.success() => String::from_utf8_lossy(&out.stdout).trim().to_string(),
        _ => path.to_string(),
    }
}
