//! Collaborators of the picker: the recent-projects store, the editor launcher and the
//! shell integrations, bundled as a [`DesktopHost`].

use color_eyre::eyre::Result;

use crate::Host;
use crate::item::Item;

pub mod launcher;
pub mod shell;
pub mod store;
pub mod uri;

use launcher::Editor;
use store::RecentStore;
use uri::HostOs;

/// [`Host`] backed by the editor's state database and the desktop
#[derive(Debug)]
pub struct DesktopHost {
    store: RecentStore,
    editor: Editor,
    os: HostOs,
}

impl DesktopHost {
    /// Bundles the store and the editor for `os`
    pub fn new(store: RecentStore, editor: Editor, os: HostOs) -> Self {
        Self { store, editor, os }
    }

    /// Loads the projects from the store
    pub fn load(&mut self) -> Result<Vec<Item>> {
        Ok(self.store.load(self.os)?)
    }
}

impl Host for DesktopHost {
    fn open(&mut self, items: &[&Item], new_window: bool, as_workspace: bool) -> Result<()> {
        Ok(self.editor.open(items, new_window, as_workspace)?)
    }

    fn delete(&mut self, removed: &[Item], remaining: &[Item]) -> Result<()> {
        debug!("forgetting {} projects", removed.len());
        Ok(self.store.save(remaining)?)
    }

    fn restore(&mut self, restored: &[Item], items: &[Item]) -> Result<()> {
        debug!("restoring {} projects", restored.len());
        Ok(self.store.save(items)?)
    }

    fn copy_path(&mut self, item: &Item) -> Result<()> {
        Ok(shell::copy_to_clipboard(item.shown_path(), self.os)?)
    }

    fn reveal(&mut self, item: &Item) -> Result<()> {
        Ok(shell::reveal(shell::reveal_target(item), self.os)?)
    }

    fn reload(&mut self) -> Result<Vec<Item>> {
        self.load()
    }
}
