//! Business logic and port trait definitions for the Tianyi chat client.
//!
//! This crate owns the two pieces of client state -- the authentication
//! session and the chat log -- and defines the "ports" (storage, remote
//! authentication, response source, credential cipher) that the
//! infrastructure layer implements. It depends only on `tianyi-types`,
//! never on `tianyi-infra` or any database/IO crate.

pub mod auth;
pub mod chat;
pub mod storage;
