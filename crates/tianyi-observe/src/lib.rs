//! Observability for the Tianyi chat client.
//!
//! - `tracing_setup`: subscriber initialization (fmt/JSON, optional OpenTelemetry)

pub mod tracing_setup;
