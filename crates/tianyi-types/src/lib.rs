//! Shared domain types for the Tianyi chat client.
//!
//! This crate contains the types every other crate speaks in: the session
//! snapshot, chat messages, persisted credential keys, client configuration,
//! and the error enums returned across crate boundaries.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod credential;
pub mod error;
pub mod session;
