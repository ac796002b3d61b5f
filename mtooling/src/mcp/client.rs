//! MCP streamable-HTTP client.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use mcommon::SessionId;
use mprovider::SecretString;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::{Value, json};

use crate::{ToolDescriptor, ToolError, ToolFuture, ToolProviderClient};

use super::jsonrpc::{
    JsonRpcRequest, ListToolsResult, extract_error_message, parse_response_body, tool_call_error,
};

pub const MCP_SESSION_HEADER: &str = "Mcp-Session-Id";
pub const MCP_PROTOCOL_VERSION: &str = "2025-03-26";

const ACCEPT_JSON_AND_SSE: &str = "application/json, text/event-stream";
const EVENT_STREAM: &str = "text/event-stream";
const INITIALIZE: &str = "initialize";

pub struct McpHttpClient {
    client: Client,
    url: String,
    auth_token: Option<SecretString>,
    session_id: Mutex<Option<String>>,
    next_id: AtomicU64,
    protocol_version: String,
    client_name: String,
    client_version: String,
}

impl std::fmt::Debug for McpHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpHttpClient")
            .field("url", &self.url)
            .field("auth_token", &self.auth_token)
            .finish_non_exhaustive()
    }
}

impl McpHttpClient {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            auth_token: None,
            session_id: Mutex::new(None),
            next_id: AtomicU64::new(1),
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            client_name: env!("CARGO_PKG_NAME").to_string(),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Sent as a bearer token on every request. Blank tokens are ignored.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        let token = SecretString::new(token);
        self.auth_token = (!token.is_empty()).then_some(token);
        self
    }

    /// Resumes a session issued earlier by the same server.
    pub fn with_session_id(self, session_id: impl Into<String>) -> Self {
        let session_id = session_id.into();
        let session_id = (!session_id.trim().is_empty()).then_some(session_id);
        Self {
            session_id: Mutex::new(session_id),
            ..self
        }
    }

    pub fn with_protocol_version(mut self, version: impl Into<String>) -> Self {
        self.protocol_version = version.into();
        self
    }

    pub fn with_client_info(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.client_name = name.into();
        self.client_version = version.into();
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn session_id(&self) -> Result<Option<SessionId>, ToolError> {
        Ok(self.session()?.clone().map(SessionId::from))
    }

    fn session(&self) -> Result<MutexGuard<'_, Option<String>>, ToolError> {
        self.session_id
            .lock()
            .map_err(|_| ToolError::other("MCP session lock poisoned"))
    }

    fn unsessioned_request(&self, method: Method) -> RequestBuilder {
        let builder = self
            .client
            .request(method, &self.url)
            .header(ACCEPT, ACCEPT_JSON_AND_SSE);

        match &self.auth_token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        }
    }

    fn request(&self, method: Method) -> Result<RequestBuilder, ToolError> {
        let mut builder = self.unsessioned_request(method);

        if let Some(session_id) = self.session()?.as_deref() {
            builder = builder.header(MCP_SESSION_HEADER, session_id);
        }

        Ok(builder)
    }

    fn remember_session(&self, response: &Response) -> Result<(), ToolError> {
        let issued = response
            .headers()
            .get(MCP_SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        if let Some(issued) = issued {
            *self.session()? = Some(issued.to_string());
        }

        Ok(())
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ToolError> {
        let response = builder.send().await.map_err(|err| {
            if err.is_timeout() {
                ToolError::timeout(err.to_string())
            } else {
                ToolError::transport(err.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(Self::parse_error(response).await);
        }

        Ok(response)
    }

    async fn parse_error(response: Response) -> ToolError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body)
            .unwrap_or_else(|| format!("MCP request failed with status {status}"));

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ToolError::unauthorized(message),
            StatusCode::NOT_FOUND => {
                ToolError::not_found(format!("MCP session not found or expired: {message}"))
            }
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                ToolError::timeout(message)
            }
            _ => ToolError::transport(message),
        }
    }

    async fn rpc(&self, method: &str, params: Value) -> Result<Value, ToolError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        // The server assigns the session in its initialize response.
        let builder = if method == INITIALIZE {
            self.unsessioned_request(Method::POST)
        } else {
            self.request(Method::POST)?
        };
        let builder = builder.json(&JsonRpcRequest::call(id, method, params));
        let response = self.send(builder).await?;
        self.remember_session(&response)?;

        let event_stream = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with(EVENT_STREAM));
        let body = response
            .text()
            .await
            .map_err(|err| ToolError::transport(err.to_string()))?;

        parse_response_body(&body, event_stream, id)?.into_result()
    }

    async fn notify(&self, method: &str) -> Result<(), ToolError> {
        let builder = self
            .request(Method::POST)?
            .json(&JsonRpcRequest::notification(method));
        self.send(builder).await.map(|_| ())
    }
}

impl ToolProviderClient for McpHttpClient {
    fn initialize<'a>(&'a self) -> ToolFuture<'a, Result<SessionId, ToolError>> {
        Box::pin(async move {
            let params = json!({
                "protocolVersion": self.protocol_version,
                "capabilities": {},
                "clientInfo": {
                    "name": self.client_name,
                    "version": self.client_version,
                }
            });
            self.rpc(INITIALIZE, params).await?;
            self.notify("notifications/initialized").await?;

            Ok(self.session_id()?.unwrap_or_default())
        })
    }

    fn list_tools<'a>(&'a self) -> ToolFuture<'a, Result<Vec<ToolDescriptor>, ToolError>> {
        Box::pin(async move {
            let mut descriptors = Vec::new();
            let mut cursor: Option<String> = None;
            let mut seen_cursors = HashSet::new();

            loop {
                let params = match &cursor {
                    Some(cursor) => json!({ "cursor": cursor }),
                    None => json!({}),
                };
                let page: ListToolsResult = serde_json::from_value(
                    self.rpc("tools/list", params).await?,
                )
                .map_err(|err| ToolError::protocol(format!("invalid tools/list result: {err}")))?;

                descriptors.extend(page.tools.into_iter().map(ToolDescriptor::from));

                match page.next_cursor {
                    Some(next) if !next.is_empty() => {
                        if !seen_cursors.insert(next.clone()) {
                            return Err(ToolError::protocol(format!(
                                "tools/list cursor '{next}' was already visited"
                            )));
                        }
                        cursor = Some(next);
                    }
                    _ => return Ok(descriptors),
                }
            }
        })
    }

    fn call_tool<'a>(
        &'a self,
        name: &'a str,
        input: &'a Value,
    ) -> ToolFuture<'a, Result<Value, ToolError>> {
        Box::pin(async move {
            let result = self
                .rpc("tools/call", json!({ "name": name, "arguments": input }))
                .await
                .map_err(|error| error.with_tool_name(name))?;

            match tool_call_error(&result) {
                Some(message) => Err(ToolError::execution(message).with_tool_name(name)),
                None => Ok(result),
            }
        })
    }

    fn close<'a>(&'a self) -> ToolFuture<'a, Result<bool, ToolError>> {
        Box::pin(async move {
            let has_session = self.session()?.is_some();
            if !has_session {
                return Ok(false);
            }

            let response = self
                .request(Method::DELETE)?
                .send()
                .await
                .map_err(|err| ToolError::transport(err.to_string()))?;

            let status = response.status();
            if status == StatusCode::METHOD_NOT_ALLOWED {
                return Ok(false);
            }
            if !status.is_success() {
                return Err(Self::parse_error(response).await);
            }

            *self.session()? = None;
            Ok(true)
        })
    }
}
