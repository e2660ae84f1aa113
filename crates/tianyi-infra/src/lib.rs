//! Infrastructure layer for the Tianyi chat client.
//!
//! Contains implementations of the port traits defined in `tianyi-core`:
//! SQLite and in-memory key-value stores, the AES-256-GCM credential vault,
//! the locally simulated remote services, and data directory / config
//! loading.

pub mod config;
pub mod crypto;
pub mod memory;
pub mod remote;
pub mod sqlite;
