//! The list of items with its filter, cursor, scroll offset and multi-selection.

use std::collections::HashSet;

use indexmap::IndexSet;

use crate::item::{Item, ItemId};

/// Items as shown in the list.
///
/// `visible` holds indices into `items` that match the current query, in `items` order.
/// `cursor` indexes `visible` and `offset` is the first visible row on screen. The
/// selection holds indices into `items` and survives filtering.
#[derive(Debug, Default)]
pub struct ItemList {
    items: Vec<Item>,
    visible: Vec<usize>,
    selection: IndexSet<usize>,
    cursor: usize,
    offset: usize,
    height: usize,
}

impl ItemList {
    /// Builds an unfiltered list
    pub fn new(items: Vec<Item>) -> Self {
        let mut list = Self {
            items,
            height: 1,
            ..Default::default()
        };
        list.filter("");
        list
    }

    /// All items
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Consumes the list, returning the items
    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    /// Indices of the items matching the query
    pub fn visible(&self) -> &[usize] {
        &self.visible
    }

    /// Cursor position within [`ItemList::visible`]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// First row shown on screen
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of rows the list can show
    pub fn height(&self) -> usize {
        self.height
    }

    /// Selected item indices, in selection order
    pub fn selection(&self) -> &IndexSet<usize> {
        &self.selection
    }

    /// Whether the item at `index` is selected
    pub fn is_selected(&self, index: usize) -> bool {
        self.selection.contains(&index)
    }

    /// Selected item indices in collection order
    pub fn selected_in_order(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self.selection.iter().copied().collect();
        indices.sort_unstable();
        indices
    }

    /// Index into `items` of the item under the cursor
    pub fn current_index(&self) -> Option<usize> {
        self.visible.get(self.cursor).copied()
    }

    /// The item under the cursor
    pub fn current(&self) -> Option<&Item> {
        self.current_index().map(|i| &self.items[i])
    }

    /// Updates the viewport height, keeping the cursor on screen
    pub fn set_height(&mut self, height: usize) {
        self.height = height.max(1);
        self.ensure_visible();
    }

    /// Recomputes `visible` for a case-insensitive substring `query` over names and paths
    pub fn filter(&mut self, query: &str) {
        let needle = query.to_lowercase();
        self.visible = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| needle.is_empty() || item.matches(&needle))
            .map(|(i, _)| i)
            .collect();
        self.cursor = self.cursor.min(self.visible.len().saturating_sub(1));
        self.ensure_visible();
        trace!("filter {:?}: {} of {} items", query, self.visible.len(), self.items.len());
    }

    fn max_offset(&self) -> usize {
        self.visible.len().saturating_sub(self.height)
    }

    fn ensure_visible(&mut self) {
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.offset + self.height <= self.cursor {
            self.offset = self.cursor - self.height + 1;
        }
        self.offset = self.offset.min(self.max_offset());
    }

    /// Moves the cursor by `delta` rows, clamped to the list
    pub fn scroll_by(&mut self, delta: isize) {
        if self.visible.is_empty() {
            return;
        }
        let last = self.visible.len() - 1;
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
        self.ensure_visible();
    }

    /// Moves the cursor one row up
    pub fn select_previous(&mut self) {
        self.scroll_by(-1);
    }

    /// Moves the cursor one row down
    pub fn select_next(&mut self) {
        self.scroll_by(1);
    }

    /// Moves the cursor and the viewport one page up
    pub fn page_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(self.height);
        self.offset = self.offset.saturating_sub(self.height);
        self.ensure_visible();
    }

    /// Moves the cursor and the viewport one page down
    pub fn page_down(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        self.cursor = (self.cursor + self.height).min(self.visible.len() - 1);
        self.offset = (self.offset + self.height).min(self.max_offset());
        self.ensure_visible();
    }

    /// Jumps to the first row
    pub fn jump_to_first(&mut self) {
        self.cursor = 0;
        self.offset = 0;
    }

    /// Jumps to the last row
    pub fn jump_to_last(&mut self) {
        self.cursor = self.visible.len().saturating_sub(1);
        self.offset = self.max_offset();
    }

    /// Toggles the selection of the item under the cursor
    pub fn toggle(&mut self) {
        if let Some(index) = self.current_index() {
            toggle_item(&mut self.selection, index);
        }
    }

    /// Moves the cursor to the `row`-th row of the viewport and toggles it.
    ///
    /// Rows past the end of the list are ignored.
    pub fn toggle_row(&mut self, row: usize) {
        let position = self.offset + row;
        if position >= self.visible.len() {
            return;
        }
        self.cursor = position;
        self.ensure_visible();
        self.toggle();
    }

    /// Whether every visible item is selected
    pub fn all_visible_selected(&self) -> bool {
        self.visible.iter().all(|i| self.selection.contains(i))
    }

    /// Selects every visible item, or clears the selection when they already all are
    pub fn toggle_all(&mut self) {
        if self.all_visible_selected() {
            self.selection.clear();
        } else {
            self.selection.extend(self.visible.iter().copied());
        }
    }

    /// Clears the selection
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Removes the items at `indices`, matched by identity.
    ///
    /// Returns the removed items in their collection order. The selection is cleared
    /// and `visible` must be recomputed by the caller.
    pub fn remove(&mut self, indices: &[usize]) -> Vec<Item> {
        let ids: HashSet<ItemId> = indices
            .iter()
            .filter_map(|&i| self.items.get(i))
            .map(|item| item.id.clone())
            .collect();
        let (removed, kept): (Vec<Item>, Vec<Item>) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|item| ids.contains(&item.id));
        self.items = kept;
        self.selection.clear();
        removed
    }

    /// Inserts `restored` in front of the collection.
    ///
    /// Selected indices are shifted so they keep pointing at the same items. The cursor
    /// returns to the top.
    pub fn prepend(&mut self, restored: Vec<Item>) {
        let shift = restored.len();
        self.selection = self.selection.iter().map(|i| i + shift).collect();
        self.items.splice(0..0, restored);
        self.jump_to_first();
    }

    /// Replaces the whole collection, dropping the selection
    pub fn replace(&mut self, items: Vec<Item>) {
        self.items = items;
        self.selection.clear();
        self.jump_to_first();
    }
}

fn toggle_item(selection: &mut IndexSet<usize>, index: usize) {
    if !selection.shift_remove(&index) {
        selection.insert(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(names: &[&str], height: usize) -> ItemList {
        let items = names.iter().map(|n| Item::from_path(&format!("/work/{n}"))).collect();
        let mut list = ItemList::new(items);
        list.set_height(height);
        list
    }

    fn assert_in_view(list: &ItemList) {
        if !list.visible().is_empty() {
            assert!(list.offset() <= list.cursor());
            assert!(list.cursor() < list.offset() + list.height());
            assert!(list.offset() <= list.visible().len().saturating_sub(list.height()));
        }
    }

    #[test]
    fn test_filter_is_stable_and_case_insensitive() {
        let mut l = list(&["foo", "bar", "FooBar"], 5);
        l.filter("foo");
        assert_eq!(l.visible(), &[0, 2]);
        l.filter("WORK");
        assert_eq!(l.visible(), &[0, 1, 2]);
        l.filter("zzz");
        assert!(l.visible().is_empty());
        assert_eq!(l.cursor(), 0);
        assert_eq!(l.current(), None);
    }

    #[test]
    fn test_down_keeps_cursor_on_last_row() {
        let mut l = list(&["a", "b", "c", "d", "e"], 3);
        for _ in 0..4 {
            l.select_next();
            assert_in_view(&l);
        }
        assert_eq!(l.cursor(), 4);
        assert_eq!(l.offset(), 2);
        l.select_next();
        assert_eq!(l.cursor(), 4);
    }

    #[test]
    fn test_paging_and_jumps() {
        let names: Vec<String> = (0..10).map(|i| format!("p{i}")).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut l = list(&names, 3);
        l.page_down();
        assert_eq!((l.cursor(), l.offset()), (3, 3));
        l.page_down();
        l.page_down();
        l.page_down();
        assert_eq!((l.cursor(), l.offset()), (9, 7));
        l.page_up();
        assert_eq!((l.cursor(), l.offset()), (6, 4));
        assert_in_view(&l);
        l.jump_to_first();
        assert_eq!((l.cursor(), l.offset()), (0, 0));
        l.jump_to_last();
        assert_eq!((l.cursor(), l.offset()), (9, 7));
    }

    #[test]
    fn test_filter_clamps_cursor() {
        let mut l = list(&["alpha", "beta", "gamma", "delta"], 2);
        l.jump_to_last();
        l.filter("ta");
        assert_eq!(l.visible(), &[1, 3]);
        assert_eq!(l.cursor(), 1);
        assert_in_view(&l);
    }

    #[test]
    fn test_toggle_all_pairs() {
        let mut l = list(&["a", "b", "c"], 3);
        l.toggle_all();
        assert_eq!(l.selection().len(), 3);
        l.toggle_all();
        assert!(l.selection().is_empty());
    }

    #[test]
    fn test_selection_survives_filter() {
        let mut l = list(&["foo", "bar"], 3);
        l.select_next();
        l.toggle();
        l.filter("foo");
        assert!(l.is_selected(1));
        assert!(!l.all_visible_selected());
    }

    #[test]
    fn test_toggle_row_uses_offset() {
        let mut l = list(&["a", "b", "c", "d", "e"], 2);
        l.jump_to_last();
        l.toggle_row(0);
        assert_eq!(l.cursor(), 3);
        assert!(l.is_selected(3));
        l.toggle_row(5);
        assert_eq!(l.cursor(), 3);
    }

    #[test]
    fn test_remove_then_prepend() {
        let mut l = list(&["a", "b", "c", "d"], 4);
        let removed = l.remove(&[3, 1]);
        assert_eq!(removed.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(), ["b", "d"]);
        l.filter("");
        assert_eq!(l.visible().len(), 2);

        l.toggle();
        l.prepend(removed);
        l.filter("");
        let names: Vec<&str> = l.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["b", "d", "a", "c"]);
        assert!(l.is_selected(2));
    }
}
