use std::collections::VecDeque;

use color_eyre::eyre::{Result, eyre};
use vsp::tui::decoder::Decoder;
use vsp::tui::event::RawEvent;
use vsp::tui::{App, Frame, InputSource, Intent, Layout, TerminalError};
use vsp::{ColorTheme, Host, Item, ItemKind};

/// Builds local folder items under `/p`
pub fn items(names: &[&str]) -> Vec<Item> {
    names.iter().map(|n| Item::from_path(&format!("/p/{n}"))).collect()
}

/// A file item
pub fn file(path: &str) -> Item {
    let mut item = Item::from_path(path);
    item.kind = ItemKind::File;
    item
}

/// Drives an [`App`] with raw terminal bytes, the way the session loop does, and keeps
/// every intent it emits.
pub struct Harness {
    pub app: App,
    pub intents: Vec<Intent>,
    decoder: Decoder,
    theme: ColorTheme,
}

impl Harness {
    pub fn new(items: Vec<Item>) -> Self {
        Self::with_size(items, 24, 80)
    }

    pub fn with_size(items: Vec<Item>, rows: u16, cols: u16) -> Self {
        let mut app = App::new(items);
        app.set_viewport(Layout::new(rows, cols));
        Self {
            app,
            intents: Vec::new(),
            decoder: Decoder::new(),
            theme: ColorTheme::default(),
        }
    }

    /// Feeds one read worth of bytes
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Intent> {
        let mut emitted = Vec::new();
        for event in self.decoder.feed_bytes(bytes) {
            emitted.extend(self.app.handle_event(event));
            if !self.app.is_running() {
                break;
            }
        }
        self.intents.extend(emitted.iter().cloned());
        emitted
    }

    /// Feeds each character of `keys` as its own read
    pub fn keys(&mut self, keys: &str) -> Vec<Intent> {
        let mut emitted = Vec::new();
        for c in keys.chars() {
            let mut buf = [0; 4];
            emitted.extend(self.feed(c.encode_utf8(&mut buf).as_bytes()));
        }
        emitted
    }

    /// Names of the whole collection, in order
    pub fn names(&self) -> Vec<String> {
        self.app.item_list.items().iter().map(|i| i.name.clone()).collect()
    }

    /// Names of the visible items, in order
    pub fn visible_names(&self) -> Vec<String> {
        let items = self.app.item_list.items();
        self.app
            .item_list
            .visible()
            .iter()
            .map(|&i| items[i].name.clone())
            .collect()
    }

    /// Name of the item under the cursor
    pub fn current(&self) -> Option<String> {
        self.app.item_list.current().map(|i| i.name.clone())
    }

    /// The plain-text screen, trailing spaces removed
    pub fn screen(&self) -> String {
        Frame::build(&self.app, &self.theme, &self.app.layout)
            .lines()
            .iter()
            .map(|l| l.trim_end())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// What a [`RecordingHost`] was asked to do
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Open {
        names: Vec<String>,
        new_window: bool,
        as_workspace: bool,
    },
    Delete {
        removed: Vec<String>,
        remaining: Vec<String>,
    },
    Restore {
        restored: Vec<String>,
        items: Vec<String>,
    },
    Copy(String),
    Reveal(String),
    Reload,
}

fn names_of<'a>(items: impl IntoIterator<Item = &'a Item>) -> Vec<String> {
    items.into_iter().map(|i| i.name.clone()).collect()
}

/// Host that records calls and fails on demand
#[derive(Default)]
pub struct RecordingHost {
    pub calls: Vec<Call>,
    pub reload_items: Vec<Item>,
    pub fail_open: bool,
    pub fail_save: bool,
    pub fail_tools: bool,
    pub fail_reload: bool,
}

impl RecordingHost {
    fn outcome(&self, fail: bool, what: &str) -> Result<()> {
        if fail { Err(eyre!("{what} broke")) } else { Ok(()) }
    }
}

impl Host for RecordingHost {
    fn open(&mut self, items: &[&Item], new_window: bool, as_workspace: bool) -> Result<()> {
        self.calls.push(Call::Open {
            names: items.iter().map(|i| i.name.clone()).collect(),
            new_window,
            as_workspace,
        });
        self.outcome(self.fail_open, "editor")
    }

    fn delete(&mut self, removed: &[Item], remaining: &[Item]) -> Result<()> {
        self.calls.push(Call::Delete {
            removed: names_of(removed),
            remaining: names_of(remaining),
        });
        self.outcome(self.fail_save, "database")
    }

    fn restore(&mut self, restored: &[Item], items: &[Item]) -> Result<()> {
        self.calls.push(Call::Restore {
            restored: names_of(restored),
            items: names_of(items),
        });
        self.outcome(self.fail_save, "database")
    }

    fn copy_path(&mut self, item: &Item) -> Result<()> {
        self.calls.push(Call::Copy(item.name.clone()));
        self.outcome(self.fail_tools, "clipboard")
    }

    fn reveal(&mut self, item: &Item) -> Result<()> {
        self.calls.push(Call::Reveal(item.name.clone()));
        self.outcome(self.fail_tools, "file manager")
    }

    fn reload(&mut self) -> Result<Vec<Item>> {
        self.calls.push(Call::Reload);
        if self.fail_reload {
            return Err(eyre!("database broke"));
        }
        Ok(self.reload_items.clone())
    }
}

/// Terminal input replayed from a script. Once the script runs out it reports the end of
/// input once, then a closed stream.
pub struct ScriptedInput {
    reads: VecDeque<RawEvent>,
    eof_sent: bool,
}

impl ScriptedInput {
    /// One read per string
    pub fn new(reads: &[&str]) -> Self {
        Self {
            reads: reads.iter().map(|r| RawEvent::Bytes(r.as_bytes().to_vec())).collect(),
            eof_sent: false,
        }
    }
}

impl InputSource for ScriptedInput {
    fn read_raw(&mut self) -> Result<RawEvent, TerminalError> {
        if let Some(raw) = self.reads.pop_front() {
            return Ok(raw);
        }
        if self.eof_sent {
            return Err(TerminalError::InputClosed);
        }
        self.eof_sent = true;
        Ok(RawEvent::Bytes(vec![0x04]))
    }
}
