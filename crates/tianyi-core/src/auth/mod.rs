//! Authentication session lifecycle.
//!
//! - `authenticator`: the remote login/registration port
//! - `box_authenticator`: type-erased wrapper for runtime selection
//! - `cipher`: sealing of the remembered re-authentication secret
//! - `manager`: the `SessionManager` state owner

pub mod authenticator;
pub mod box_authenticator;
pub mod cipher;
pub mod manager;
