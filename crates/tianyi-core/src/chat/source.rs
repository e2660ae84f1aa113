//! ResponseSource trait definition.
//!
//! Given a user message, a response source eventually yields exactly one
//! reply or reports a failure. Implementations live in tianyi-infra.

use std::future::Future;

use tianyi_types::chat::{Reply, ReplyRequest};
use tianyi_types::error::ResponseError;

/// Trait for reply backends (local simulator, networked assistant).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition). The chat
/// session bounds every call with its own timeout, so implementations do
/// not need one.
pub trait ResponseSource: Send + Sync {
    /// Human-readable source name (e.g., "echo").
    fn name(&self) -> &str;

    /// Produce the reply to `request.message`.
    fn respond(
        &self,
        request: &ReplyRequest,
    ) -> impl Future<Output = Result<Reply, ResponseError>> + Send;
}
