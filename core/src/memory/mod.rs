mod book;
mod helpers;
mod in_memory;
mod ops;
mod traits;

pub use book::{MemoryBook, StoredValue};
pub use in_memory::InMemoryStore;
pub use ops::run_memory_op;
pub use traits::{HistoryEntry, MemoryEntry, MemoryStats, MemoryStore};
