//! Storage abstractions.
//!
//! Defines the key-value store trait the session manager persists
//! credentials through. Implementations live in tianyi-infra.

pub mod kv_store;
