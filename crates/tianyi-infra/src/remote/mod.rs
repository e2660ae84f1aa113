//! Locally simulated remote services.
//!
//! Stand-ins for the account service and the character backend. They
//! accept every request after a fixed latency, which is all the client
//! needs until a networked implementation of the same ports exists.

pub mod echo;
pub mod simulated;
