//! Terminal UI components and rendering.
//!
//! This module holds the interactive engine of the picker: the terminal channel, the
//! decoder turning raw input into [`Event`]s, the [`App`] state machine and the renderer.

use std::io;

use thiserror::Error;

pub use app::{App, Mode};
pub use backend::{InputSource, Tui};
pub use event::{Event, Intent};
pub use layout::Layout;
pub use render::Frame;

mod app;
mod backend;
/// Raw input to [`Event`] decoding
pub mod decoder;
/// Event and intent definitions
pub mod event;
/// Item list display and management
pub mod item_list;
mod layout;
mod render;
/// Display-width aware text helpers
pub mod text;

pub use backend::restore;

/// Errors raised by the terminal channel
#[derive(Debug, Error)]
pub enum TerminalError {
    /// Raw mode could not be enabled, usually because there is no terminal attached
    #[error("cannot enable raw mode on this terminal: {0}")]
    NoRawMode(#[source] io::Error),
    /// The platform offers no supported way to read terminal input
    #[error("terminal input is not supported on this platform")]
    Unsupported,
    /// The input side of the terminal was closed
    #[error("terminal input closed")]
    InputClosed,
    /// Any other I/O failure
    #[error(transparent)]
    Io(#[from] io::Error),
}
