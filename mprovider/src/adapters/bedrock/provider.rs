//! Bedrock provider implemented over the Converse transport.

use std::sync::Arc;

use reqwest::Client;

use crate::{
    ModelProvider, ModelRequest, ModelResponse, NoopOperationHooks, ProviderError, ProviderFuture,
    ProviderId, ProviderOperationHooks, RetryPolicy, SecureCredentialManager, execute_with_retry,
};

use super::serde_api::build_api_request;
use super::transport::{BedrockHttpTransport, ConverseTransport};
use super::types::resolve_bedrock_auth;

const CONVERSE_OPERATION: &str = "converse";

#[derive(Clone)]
pub struct BedrockProvider {
    credentials: Arc<SecureCredentialManager>,
    transport: Arc<dyn ConverseTransport>,
    retry_policy: RetryPolicy,
    hooks: Arc<dyn ProviderOperationHooks>,
}

impl BedrockProvider {
    pub fn new(
        credentials: Arc<SecureCredentialManager>,
        transport: Arc<dyn ConverseTransport>,
    ) -> Self {
        Self {
            credentials,
            transport,
            retry_policy: RetryPolicy::default(),
            hooks: Arc::new(NoopOperationHooks),
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ProviderOperationHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn default_http_transport(client: Client, region: &str) -> BedrockHttpTransport {
        BedrockHttpTransport::new(client, region)
    }
}

impl ModelProvider for BedrockProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Bedrock
    }

    fn converse<'a>(
        &'a self,
        request: ModelRequest<'a>,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
        Box::pin(async move {
            request.validate()?;
            let auth = resolve_bedrock_auth(&self.credentials)?;
            let body = build_api_request(&request)?;

            let model_id = request.model_id.as_str();
            let transport = self.transport.as_ref();
            let (body, auth) = (&body, &auth);

            let response = execute_with_retry(
                self.id(),
                CONVERSE_OPERATION,
                &self.retry_policy,
                self.hooks.as_ref(),
                move |_attempt| transport.converse(model_id, body, auth),
                tokio::time::sleep,
            )
            .await?;

            response.into_model_response(model_id)
        })
    }
}
