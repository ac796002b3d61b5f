use mcommon::BoxFuture;

use crate::{ModelRequest, ModelResponse, ProviderError, ProviderId};

pub type ProviderFuture<'a, T> = BoxFuture<'a, T>;

/// Model invocation transport: one request in, one complete response out.
///
/// Authentication and network retries are the implementation's concern; callers
/// see either a response or a final [`ProviderError`].
pub trait ModelProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    fn converse<'a>(
        &'a self,
        request: ModelRequest<'a>,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>>;
}
