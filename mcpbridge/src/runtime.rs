//! Session wiring from a [`BridgeConfig`].

use std::sync::Arc;

use mchat::{Answer, ChatPolicy, McpSession};
use mobserve::{SafeChatHooks, SafeProviderHooks, SafeToolHooks, TracingObservabilityHooks};
use mprovider::adapters::bedrock::{BedrockHttpTransport, BedrockProvider};
use mprovider::{ModelProvider, SecureCredentialManager};
use mtooling::ToolProviderClient;
use mtooling::mcp::McpHttpClient;
use reqwest::Client;

use crate::{BridgeConfig, BridgeError, BridgeErrorKind};

pub fn http_client(config: &BridgeConfig) -> Result<Client, BridgeError> {
    Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|err| BridgeError::new(BridgeErrorKind::Provider, err.to_string()))
}

/// Bedrock provider with tracing hooks, reusing `client` for every call.
pub fn build_provider(
    config: &BridgeConfig,
    client: Client,
) -> Result<Arc<dyn ModelProvider>, BridgeError> {
    config.validate()?;

    let credentials = Arc::new(SecureCredentialManager::new());
    credentials.set_bedrock_api_key(config.bedrock_api_key.expose())?;

    let mut transport = BedrockHttpTransport::new(client, &config.region);
    if let Some(endpoint) = &config.endpoint {
        transport = transport.with_endpoint(endpoint.clone());
    }

    let provider = BedrockProvider::new(credentials, Arc::new(transport))
        .with_hooks(Arc::new(SafeProviderHooks::new(TracingObservabilityHooks)));
    Ok(Arc::new(provider))
}

pub fn build_tool_client(
    config: &BridgeConfig,
    client: Client,
) -> Result<Arc<dyn ToolProviderClient>, BridgeError> {
    config.validate()?;

    let mut tool_client = McpHttpClient::new(client, config.mcp_url.clone());
    if let Some(token) = &config.mcp_auth_token {
        tool_client = tool_client.with_auth_token(token.expose());
    }
    if let Some(session_id) = &config.mcp_session_id {
        tool_client = tool_client.with_session_id(session_id.clone());
    }

    Ok(Arc::new(tool_client))
}

pub fn build_session(config: &BridgeConfig) -> Result<McpSession, BridgeError> {
    build_session_with_client(config, http_client(config)?)
}

/// Like [`build_session`] with a caller-supplied HTTP client shared by both transports.
pub fn build_session_with_client(
    config: &BridgeConfig,
    client: Client,
) -> Result<McpSession, BridgeError> {
    let provider = build_provider(config, client.clone())?;
    let tool_client = build_tool_client(config, client)?;

    let session = McpSession::builder(provider, tool_client)
        .model_id(config.model_id.clone())
        .policy(ChatPolicy::default().with_max_rounds(config.max_rounds))
        .hooks(Arc::new(SafeChatHooks::new(TracingObservabilityHooks)))
        .tool_hooks(Arc::new(SafeToolHooks::new(TracingObservabilityHooks)))
        .build()?;
    Ok(session)
}

/// Builds a session, answers `input`, and closes the session.
pub async fn answer_once(
    config: &BridgeConfig,
    input: &str,
    system: Option<&str>,
) -> Result<Answer, BridgeError> {
    let session = build_session(config)?;
    Ok(session.answer_once(input, system).await?)
}
