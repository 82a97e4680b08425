// tasklist - Local task list with priority sorting, filtering and pluggable storage

pub mod config;
pub mod error;
pub mod filter;
pub mod migrate;
pub mod models;
pub mod sqlite;
pub mod storage;
pub mod store;

// Re-export main types for convenience
pub use config::{Backend, Config};
pub use error::ValidationError;
pub use filter::Filter;
pub use models::{Priority, Stats, Task, now_ms};
pub use sqlite::SqliteStorage;
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{STORAGE_KEY, StoreSettings, TaskStore, TaskView};
