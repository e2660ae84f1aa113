//! Chat message exchange pipeline.
//!
//! - `source`: the `ResponseSource` port replies come from
//! - `box_source`: type-erased wrapper for runtime selection
//! - `history`: the `HistoryStore` port messages are recorded to
//! - `events`: broadcast bus the presentation layer listens on
//! - `session`: the `ChatSession` log owner with its single-flight guard

pub mod box_source;
pub mod events;
pub mod history;
pub mod session;
pub mod source;
