use futures::future::BoxFuture;
use std::sync::Arc;

use crate::error::Result;
use crate::llm::types::GenerateRequest;

/// The external model service.
///
/// Implementations perform exactly one outbound call per `generate` and return the
/// raw reply text. Structured requests expect JSON text matching `response_schema`;
/// the flows do the parsing.
pub trait ModelBackend: Send + Sync {
    fn generate(&self, request: GenerateRequest) -> BoxFuture<'_, Result<String>>;
}

impl<T: ModelBackend + ?Sized> ModelBackend for Arc<T> {
    fn generate(&self, request: GenerateRequest) -> BoxFuture<'_, Result<String>> {
        (**self).generate(request)
    }
}

impl<T: ModelBackend + ?Sized> ModelBackend for Box<T> {
    fn generate(&self, request: GenerateRequest) -> BoxFuture<'_, Result<String>> {
        (**self).generate(request)
    }
}
