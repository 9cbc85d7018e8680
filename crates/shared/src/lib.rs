mod command;
mod date;
pub mod keys;
pub mod storage;

pub use command::*;
pub use date::*;
pub use storage::{FileStore, KeyValueStore, MemoryStore, Storage, StorageError};
