//! SQLite storage layer.
//!
//! The durable key-value store and chat history, backed by SQLite with WAL
//! mode and split read/write connection pools.

pub mod history;
pub mod kv;
pub mod pool;
