use crate::item::Item;

/// Input events understood by the picker
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Arrow up
    Up,
    /// Arrow down
    Down,
    /// Arrow left
    Left,
    /// Arrow right
    Right,
    /// Page up
    PageUp,
    /// Page down
    PageDown,
    /// Home
    Home,
    /// End
    End,
    /// Forward delete
    Delete,
    /// A lone escape key press
    Escape,
    /// Enter/Return
    Enter,
    /// Tab
    Tab,
    /// Backspace
    Backspace,
    /// Ctrl-C
    Interrupt,
    /// Ctrl-D, or the input stream reached its end
    EndOfInput,
    /// A printable character
    Printable(char),
    /// Left button press at 1-based `(x, y)` terminal coordinates
    MouseClick(u16, u16),
    /// Scroll wheel up
    MouseWheelUp,
    /// Scroll wheel down
    MouseWheelDown,
}

/// One unit of input as delivered by the terminal, before decoding
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawEvent {
    /// Bytes read from a POSIX-style terminal
    Bytes(Vec<u8>),
    /// A native console input record
    Record(ConsoleRecord),
}

/// Platform-neutral view of a console input record
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConsoleRecord {
    /// Keyboard record
    Key {
        /// `true` on press, `false` on release
        key_down: bool,
        /// Virtual key code
        virtual_key: u16,
        /// Character payload, if any
        ch: Option<char>,
    },
    /// Mouse record, coordinates are 0-based
    Mouse {
        /// Column
        x: i16,
        /// Row
        y: i16,
        /// Pressed buttons; the high word carries the wheel delta
        button_state: u32,
        /// Kind of mouse event (moved, double click, wheeled...)
        event_flags: u32,
    },
    /// Focus, resize, menu records
    Other,
}

/// What the picker asks its host to do in reaction to an event
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
    /// Open the items at `indices` in the editor
    Open {
        /// Indices into the current item collection, in collection order
        indices: Vec<usize>,
        /// Force a new editor window
        new_window: bool,
        /// Group all items into a single multi-root workspace
        as_workspace: bool,
    },
    /// Items were removed from the collection and the store must follow
    DeleteCommit {
        /// Removed items, in their former relative order
        removed: Vec<Item>,
    },
    /// Previously removed items were put back at the front of the collection
    RestoreCommit {
        /// Restored items
        restored: Vec<Item>,
    },
    /// Copy the item's path to the clipboard
    CopyPath(Item),
    /// Show the item in the file manager
    Reveal(Item),
    /// Replace the whole collection with a fresh load
    Reload,
}
