//! Interactive chat command.
//!
//! - `loop_runner`: login gate and input loop
//! - `commands`: slash command parsing
//! - `renderer`: message and event output

pub mod commands;
pub mod loop_runner;
pub mod renderer;
