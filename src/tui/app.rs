use std::mem;

use crate::item::Item;

use super::event::{Event, Intent};
use super::item_list::ItemList;
use super::layout::Layout;

/// Input mode of the picker
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Navigation and commands
    #[default]
    Normal,
    /// Typing into the query
    Search,
    /// Waiting for the user to confirm a delete
    ConfirmDelete,
}

/// Picker state machine.
///
/// Events come in through [`App::handle_event`], which mutates the state and returns the
/// [`Intent`]s the host has to carry out. The app never touches the terminal, the store or
/// any process itself.
#[derive(Debug)]
pub struct App {
    /// Items, filter, cursor and selection
    pub item_list: ItemList,
    /// Current query
    pub query: String,
    /// Current mode
    pub mode: Mode,
    /// Status line banner, cleared by the next event
    pub message: Option<String>,
    /// Geometry of the last frame, used for mouse hit-testing and paging
    pub layout: Layout,
    pending_delete: Vec<usize>,
    last_removed: Vec<Item>,
    running: bool,
    accepted: bool,
}

impl App {
    /// Starts a session over `items`
    pub fn new(items: Vec<Item>) -> Self {
        let layout = Layout::default();
        let mut item_list = ItemList::new(items);
        item_list.set_height(layout.list_height);
        Self {
            item_list,
            query: String::new(),
            mode: Mode::Normal,
            message: None,
            layout,
            pending_delete: Vec::new(),
            last_removed: Vec::new(),
            running: true,
            accepted: false,
        }
    }

    /// Whether the session goes on
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the session ended by opening the selection with Enter
    pub fn accepted(&self) -> bool {
        self.accepted
    }

    /// Items waiting for a delete confirmation, as indices into the collection
    pub fn pending_delete(&self) -> &[usize] {
        &self.pending_delete
    }

    /// Whether `u` would restore something
    pub fn can_undo(&self) -> bool {
        !self.last_removed.is_empty()
    }

    /// Applies the geometry of the frame about to be drawn
    pub fn set_viewport(&mut self, layout: Layout) {
        self.layout = layout;
        self.item_list.set_height(layout.list_height);
    }

    /// Shows `message` in the status line until the next event
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Replaces the collection with a freshly loaded one
    pub fn reload(&mut self, items: Vec<Item>) {
        self.item_list.replace(items);
        self.last_removed.clear();
        self.refilter();
        self.set_message("Project list reloaded");
    }

    /// Consumes the app, returning the items as they stand
    pub fn into_items(self) -> Vec<Item> {
        self.item_list.into_items()
    }

    fn refilter(&mut self) {
        self.item_list.filter(&self.query);
    }

    fn quit(&mut self) {
        debug!("leaving the picker");
        self.running = false;
    }

    /// Selection in collection order, or the current item alone
    fn targets(&self) -> Vec<usize> {
        if self.item_list.selection().is_empty() {
            self.item_list.current_index().into_iter().collect()
        } else {
            self.item_list.selected_in_order()
        }
    }

    /// Handles one event, returning what the host must do about it
    pub fn handle_event(&mut self, event: Event) -> Vec<Intent> {
        self.message = None;
        let intents = match self.mode {
            Mode::ConfirmDelete => self.handle_confirm(event),
            Mode::Search => {
                self.handle_search(event);
                Vec::new()
            }
            Mode::Normal => self.handle_normal(event),
        };
        if !intents.is_empty() {
            debug!("intents: {:?}", intents);
        }
        intents
    }

    fn handle_confirm(&mut self, event: Event) -> Vec<Intent> {
        match event {
            Event::Printable('y' | 'Y') => {
                self.mode = Mode::Normal;
                self.commit_delete()
            }
            Event::Printable('n' | 'N') | Event::Escape | Event::Interrupt => {
                self.mode = Mode::Normal;
                self.pending_delete.clear();
                self.set_message("Delete cancelled");
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn commit_delete(&mut self) -> Vec<Intent> {
        let pending = mem::take(&mut self.pending_delete);
        if pending.is_empty() {
            self.set_message("Nothing to delete");
            return Vec::new();
        }
        let removed = self.item_list.remove(&pending);
        self.refilter();
        self.set_message(format!("Deleted {}, press u to undo", count(removed.len())));
        self.last_removed = removed.clone();
        vec![Intent::DeleteCommit { removed }]
    }

    fn restore(&mut self) -> Vec<Intent> {
        if self.last_removed.is_empty() {
            self.set_message("Nothing to undo");
            return Vec::new();
        }
        let restored = mem::take(&mut self.last_removed);
        self.item_list.prepend(restored.clone());
        self.refilter();
        self.item_list.jump_to_first();
        self.set_message(format!("Restored {}", count(restored.len())));
        vec![Intent::RestoreCommit { restored }]
    }

    fn handle_search(&mut self, event: Event) {
        match event {
            Event::Escape | Event::Enter => self.mode = Mode::Normal,
            Event::Backspace => {
                if self.query.pop().is_some() {
                    self.refilter();
                } else {
                    self.mode = Mode::Normal;
                }
            }
            Event::Interrupt => {
                self.query.clear();
                self.mode = Mode::Normal;
                self.refilter();
            }
            Event::Printable(c) => {
                self.query.push(c);
                self.refilter();
            }
            _ => {}
        }
    }

    fn handle_normal(&mut self, event: Event) -> Vec<Intent> {
        let list = &mut self.item_list;
        match event {
            Event::Printable('q' | 'Q') | Event::Interrupt | Event::EndOfInput => self.quit(),
            Event::Escape => {
                if !self.query.is_empty() {
                    self.query.clear();
                    self.refilter();
                } else if !list.selection().is_empty() {
                    list.clear_selection();
                } else {
                    self.quit();
                }
            }
            Event::Up | Event::Printable('k') | Event::MouseWheelUp => list.select_previous(),
            Event::Down | Event::Printable('j') | Event::MouseWheelDown => list.select_next(),
            Event::PageUp => list.page_up(),
            Event::PageDown => list.page_down(),
            Event::Home | Event::Printable('g') => list.jump_to_first(),
            Event::End | Event::Printable('G') => list.jump_to_last(),
            Event::Printable('/') => self.mode = Mode::Search,
            Event::Printable(' ') => list.toggle(),
            Event::Printable('a' | 'A') => list.toggle_all(),
            Event::MouseClick(_, y) => {
                if let Some(row) = self.layout.list_row(y) {
                    list.toggle_row(row);
                }
            }
            Event::Backspace => {
                if !self.query.is_empty() {
                    self.query.clear();
                    self.refilter();
                }
            }
            Event::Enter => return self.open_and_quit(),
            Event::Printable('n' | 'N') => return self.open_in_new_window(),
            Event::Printable('w' | 'W') => return self.open_as_workspace(),
            Event::Printable('d' | 'D') => {
                if list.current_index().is_some() {
                    self.pending_delete = self.targets();
                    self.mode = Mode::ConfirmDelete;
                }
            }
            Event::Printable('u' | 'U') => return self.restore(),
            Event::Printable('r' | 'R') => return vec![Intent::Reload],
            Event::Printable('y' | 'Y') => {
                return list.current().cloned().map(Intent::CopyPath).into_iter().collect();
            }
            Event::Printable('o' | 'O') => {
                return list.current().cloned().map(Intent::Reveal).into_iter().collect();
            }
            _ => {}
        }
        Vec::new()
    }

    fn open_and_quit(&mut self) -> Vec<Intent> {
        if self.item_list.current_index().is_none() {
            return Vec::new();
        }
        let new_window = !self.item_list.selection().is_empty();
        let indices = self.targets();
        self.accepted = true;
        self.quit();
        vec![Intent::Open {
            indices,
            new_window,
            as_workspace: false,
        }]
    }

    fn open_in_new_window(&mut self) -> Vec<Intent> {
        let Some(current) = self.item_list.current() else {
            return Vec::new();
        };
        let message = if self.item_list.selection().is_empty() {
            format!("Opened in a new window: {}", current.name)
        } else {
            format!("Opened {} in new windows", count(self.item_list.selection().len()))
        };
        let indices = self.targets();
        self.item_list.clear_selection();
        self.set_message(message);
        vec![Intent::Open {
            indices,
            new_window: true,
            as_workspace: false,
        }]
    }

    fn open_as_workspace(&mut self) -> Vec<Intent> {
        if !self.item_list.selection().is_empty() {
            let indices = self.item_list.selected_in_order();
            self.item_list.clear_selection();
            self.set_message(format!("Opened {} as a workspace", count(indices.len())));
            return vec![Intent::Open {
                indices,
                new_window: true,
                as_workspace: true,
            }];
        }
        let Some(index) = self.item_list.current_index() else {
            return Vec::new();
        };
        self.set_message(format!("Opened: {}", self.item_list.items()[index].name));
        vec![Intent::Open {
            indices: vec![index],
            new_window: true,
            as_workspace: false,
        }]
    }
}

fn count(n: usize) -> String {
    if n == 1 {
        "1 project".to_string()
    } else {
        format!("{n} projects")
    }
}
