//! 基础设施层：持久化与日志

pub mod document_store;
pub mod kv_store;
pub mod logger;

pub use document_store::{DocumentStore, StoreError};
pub use kv_store::{FileKvStore, KeyValueStore, KvError, MemoryKvStore};
pub use logger::Logger;
