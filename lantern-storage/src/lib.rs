//! Lantern Storage - Counter Persistence
//!
//! Two `CounterStore` implementations: plain-text files on disk and an
//! in-memory pair for tests and ephemeral servers.

mod file;
mod memory;

pub use file::FileCounterStore;
pub use memory::InMemoryCounterStore;
