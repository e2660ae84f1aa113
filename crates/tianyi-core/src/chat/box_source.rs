//! BoxResponseSource -- object-safe dynamic dispatch wrapper for ResponseSource.
//!
//! Same blanket-impl pattern as `BoxAuthenticator`.

use std::future::Future;
use std::pin::Pin;

use tianyi_types::chat::{Reply, ReplyRequest};
use tianyi_types::error::ResponseError;

use super::source::ResponseSource;

/// Object-safe version of [`ResponseSource`] with boxed futures.
pub trait ResponseSourceDyn: Send + Sync {
    fn name(&self) -> &str;

    fn respond_boxed<'a>(
        &'a self,
        request: &'a ReplyRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Reply, ResponseError>> + Send + 'a>>;
}

impl<T: ResponseSource> ResponseSourceDyn for T {
    fn name(&self) -> &str {
        ResponseSource::name(self)
    }

    fn respond_boxed<'a>(
        &'a self,
        request: &'a ReplyRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Reply, ResponseError>> + Send + 'a>> {
        Box::pin(self.respond(request))
    }
}

/// Type-erased response source for runtime selection.
pub struct BoxResponseSource {
    inner: Box<dyn ResponseSourceDyn + Send + Sync>,
}

impl BoxResponseSource {
    /// Wrap a concrete `ResponseSource` in a type-erased box.
    pub fn new<T: ResponseSource + 'static>(source: T) -> Self {
        Self {
            inner: Box::new(source),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn respond(&self, request: &ReplyRequest) -> Result<Reply, ResponseError> {
        self.inner.respond_boxed(request).await
    }
}

impl std::fmt::Debug for BoxResponseSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxResponseSource")
            .field("name", &self.name())
            .finish()
    }
}
