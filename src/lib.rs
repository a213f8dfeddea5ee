//! vsp is an interactive terminal picker for the editor's recently opened projects.
//!
//! It lists folders, files and workspaces, filters them as you type, and lets you open,
//! reveal, copy or forget them. The interactive engine lives in [`tui`]; everything that
//! touches the outside world goes through a [`Host`].
//!
//! # Examples
//!
//! ```no_run
//! use vsp::prelude::*;
//!
//! struct Printer;
//!
//! impl Host for Printer {
//!     fn open(&mut self, items: &[&Item], _new_window: bool, _as_workspace: bool) -> Result<()> {
//!         for item in items {
//!             println!("{}", item.full_path);
//!         }
//!         Ok(())
//!     }
//!     fn delete(&mut self, _removed: &[Item], _remaining: &[Item]) -> Result<()> { Ok(()) }
//!     fn restore(&mut self, _restored: &[Item], _items: &[Item]) -> Result<()> { Ok(()) }
//!     fn copy_path(&mut self, _item: &Item) -> Result<()> { Ok(()) }
//!     fn reveal(&mut self, _item: &Item) -> Result<()> { Ok(()) }
//!     fn reload(&mut self) -> Result<Vec<Item>> { Ok(Vec::new()) }
//! }
//!
//! let options = PickerOptionsBuilder::default().build().unwrap();
//! let items = vec![Item::from_path("/home/me/api"), Item::from_path("/home/me/web")];
//! let output = Picker::run(&options, items, &mut Printer).unwrap();
//! println!("accepted: {}", output.accepted);
//! ```

#![warn(missing_docs)]

#[macro_use]
extern crate log;

use std::io::Write;

use color_eyre::eyre::Result;

pub use crate::item::{Item, ItemId, ItemKind};
pub use crate::options::{PickerOptions, PickerOptionsBuilder};
pub use crate::theme::ColorTheme;
use crate::tui::decoder::Decoder;
use crate::tui::{App, Frame, Intent, Layout, Tui};

pub mod helper;
pub mod item;
pub mod options;
pub mod prelude;
pub mod theme;
pub mod tui;

/// Carries out what the picker asks for.
///
/// Failures are shown in the status line and never end the session, except for the open
/// that ends it with Enter.
pub trait Host {
    /// Opens `items` in the editor
    fn open(&mut self, items: &[&Item], new_window: bool, as_workspace: bool) -> Result<()>;
    /// Persists a delete, `remaining` being the whole collection after it
    fn delete(&mut self, removed: &[Item], remaining: &[Item]) -> Result<()>;
    /// Persists a restore, `items` being the whole collection after it
    fn restore(&mut self, restored: &[Item], items: &[Item]) -> Result<()>;
    /// Copies the path of `item` to the clipboard
    fn copy_path(&mut self, item: &Item) -> Result<()>;
    /// Shows `item` in the file manager
    fn reveal(&mut self, item: &Item) -> Result<()>;
    /// Reads the collection again
    fn reload(&mut self) -> Result<Vec<Item>>;
}

/// Outcome of a session
#[derive(Debug)]
pub struct PickerOutput {
    /// Whether the session ended by opening the selection with Enter
    pub accepted: bool,
    /// The collection as it stands at the end of the session
    pub items: Vec<Item>,
}

/// Main entry point for running the picker
pub struct Picker {}

impl Picker {
    /// Runs a session on the controlling terminal.
    ///
    /// Fails before touching the screen when the terminal has no raw mode.
    pub fn run(options: &PickerOptions, items: Vec<Item>, host: &mut dyn Host) -> Result<PickerOutput> {
        let theme = ColorTheme::init_from_options(options);
        let mut tui = Tui::new(!options.no_mouse)?;
        Self::run_with(&mut tui, &theme, items, host)
    }

    /// Runs a session on `tui`, which is restored on every way out
    pub fn run_with<W: Write>(
        tui: &mut Tui<W>,
        theme: &ColorTheme,
        items: Vec<Item>,
        host: &mut dyn Host,
    ) -> Result<PickerOutput> {
        tui.start()?;
        let mut app = App::new(items);
        let result = event_loop(tui, theme, &mut app, host);
        let stopped = tui.stop();
        result?;
        stopped?;

        Ok(PickerOutput {
            accepted: app.accepted(),
            items: app.into_items(),
        })
    }
}

fn event_loop<W: Write>(tui: &mut Tui<W>, theme: &ColorTheme, app: &mut App, host: &mut dyn Host) -> Result<()> {
    let mut decoder = Decoder::new();
    while app.is_running() {
        let (rows, cols) = tui.size()?;
        let layout = Layout::new(rows, cols);
        app.set_viewport(layout);
        Frame::build(app, theme, &layout).paint(tui)?;

        let raw = tui.read_event()?;
        for event in decoder.feed(&raw) {
            trace!("event: {event:?}");
            for intent in app.handle_event(event) {
                dispatch(app, host, intent)?;
            }
            if !app.is_running() {
                break;
            }
        }
    }
    Ok(())
}

/// Hands one intent to the host, turning the outcome into a status message
fn dispatch(app: &mut App, host: &mut dyn Host, intent: Intent) -> Result<()> {
    match intent {
        Intent::Open {
            indices,
            new_window,
            as_workspace,
        } => {
            let items: Vec<&Item> = indices.iter().filter_map(|&i| app.item_list.items().get(i)).collect();
            if let Err(e) = host.open(&items, new_window, as_workspace) {
                if !app.is_running() {
                    return Err(e);
                }
                warn!("open failed: {e}");
                app.set_message(format!("Cannot open: {e}"));
            }
        }
        Intent::DeleteCommit { removed } => {
            if let Err(e) = host.delete(&removed, app.item_list.items()) {
                warn!("delete failed: {e}");
                app.set_message(format!("Cannot save the list: {e}"));
            }
        }
        Intent::RestoreCommit { restored } => {
            if let Err(e) = host.restore(&restored, app.item_list.items()) {
                warn!("restore failed: {e}");
                app.set_message(format!("Cannot save the list: {e}"));
            }
        }
        Intent::CopyPath(item) => match host.copy_path(&item) {
            Ok(()) => app.set_message(format!("Copied path: {}", item.name)),
            Err(e) => {
                warn!("copy failed: {e}");
                app.set_message(format!("Copy failed: {e}"));
            }
        },
        Intent::Reveal(item) => match host.reveal(&item) {
            Ok(()) => app.set_message(format!("Revealed in the file manager: {}", item.name)),
            Err(e) => {
                warn!("reveal failed: {e}");
                app.set_message(format!("Cannot reveal: {e}"));
            }
        },
        Intent::Reload => match host.reload() {
            Ok(items) => app.reload(items),
            Err(e) => {
                warn!("reload failed: {e}");
                app.set_message(format!("Reload failed: {e}"));
            }
        },
    }
    Ok(())
}
