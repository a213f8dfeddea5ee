//! Convenience re-exports of commonly used types.
//!
//! `use vsp::prelude::*;` brings in the picker, its options, the item types and the
//! `Result` type the [`Host`](crate::Host) methods return.

pub use crate::helper::DesktopHost;
pub use crate::options::{PickerOptions, PickerOptionsBuilder};
pub use crate::tui::{Event, Intent};
pub use crate::{Host, Item, ItemId, ItemKind, Picker, PickerOutput};
pub use color_eyre::eyre::Result;
