//! Event types for the TUI event loop.

use crossterm::event::KeyEvent;
use lantern_core::{Coordinates, CounterState, Item, ItemId, LanternResult};

#[derive(Debug)]
pub enum TuiEvent {
    Input(KeyEvent),
    Tick,
    Resize { width: u16, height: u16 },
    Fetched(Fetched),
}

/// Completion of a background fetch started by the app.
#[derive(Debug)]
pub enum Fetched {
    /// A "load more" finished. Loaded items are read from the sequence.
    Page(LanternResult<()>),
    Story {
        id: ItemId,
        result: LanternResult<Option<Item>>,
    },
    /// Every comment under the story has settled.
    Comments { story: ItemId },
    Coordinates {
        city: String,
        result: LanternResult<Coordinates>,
    },
    Counter(LanternResult<CounterState>),
}
