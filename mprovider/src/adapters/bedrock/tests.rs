//! Focused unit tests for Bedrock adapter internals.

#![cfg(test)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{Value, json};

use crate::{
    ContentBlock, GenerationOptions, Message, ModelProvider, ModelRequest, ProviderError,
    ProviderErrorKind, ProviderFuture, RetryPolicy, SecureCredentialManager, StopReason,
    ToolConfig, ToolResult, ToolSpec, ToolUse,
};

use super::provider::BedrockProvider;
use super::serde_api::{ConverseApiRequest, ConverseApiResponse, build_api_request};
use super::transport::{BedrockHttpTransport, ConverseTransport, classify_converse_error};
use super::types::BedrockAuth;

#[derive(Debug, Default)]
struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<Value, ProviderError>>>,
    requests: Mutex<Vec<(String, Value)>>,
}

impl ScriptedTransport {
    fn with(responses: Vec<Result<Value, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn recorded(&self) -> Vec<(String, Value)> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl ConverseTransport for ScriptedTransport {
    fn converse<'a>(
        &'a self,
        model_id: &'a str,
        request: &'a ConverseApiRequest<'a>,
        auth: &'a BedrockAuth,
    ) -> ProviderFuture<'a, Result<ConverseApiResponse, ProviderError>> {
        Box::pin(async move {
            let BedrockAuth::ApiKey(key) = auth;
            assert_eq!(key.expose(), "bedrock-key");

            let body = serde_json::to_value(request).expect("request should serialize");
            self.requests
                .lock()
                .expect("requests lock")
                .push((model_id.to_string(), body));

            let next = self
                .responses
                .lock()
                .expect("responses lock")
                .pop_front()
                .unwrap_or_else(|| Err(ProviderError::other("no scripted response")));

            next.and_then(|value| {
                serde_json::from_value(value).map_err(|err| ProviderError::transport(err.to_string()))
            })
        })
    }
}

fn provider_with(transport: Arc<ScriptedTransport>) -> BedrockProvider {
    let credentials = Arc::new(SecureCredentialManager::new());
    credentials
        .set_bedrock_api_key("bedrock-key")
        .expect("key should store");
    BedrockProvider::new(credentials, transport).with_retry_policy(
        RetryPolicy::new(3).with_backoff(Duration::from_millis(1), Duration::from_millis(1)),
    )
}

fn search_tool() -> ToolSpec {
    ToolSpec {
        name: "search_docs".to_string(),
        description: "Search the documentation".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": { "query": { "type": "string" } }
        }),
    }
}

#[test]
fn api_request_uses_converse_wire_shape() {
    let transcript = vec![
        Message::user_text("find the install guide"),
        Message::new(
            crate::Role::Assistant,
            vec![ContentBlock::ToolUse(ToolUse::new(
                "tu-1",
                "search_docs",
                json!({ "query": "install" }),
            ))],
        ),
        Message::tool_results(vec![
            ToolResult::success("tu-1", "\"found\""),
            ToolResult::error("tu-2", "tool execution error: boom"),
        ]),
    ];
    let config = ToolConfig::auto(vec![search_tool()]);
    let request = ModelRequest::new("model-x", &transcript)
        .with_tool_config(Some(&config))
        .with_system(Some("be brief"))
        .with_options(GenerationOptions::default().with_max_tokens(256));

    let built = build_api_request(&request).expect("request should build");
    let body = serde_json::to_value(&built).expect("request should serialize");

    assert_eq!(
        body,
        json!({
            "messages": [
                { "role": "user", "content": [{ "text": "find the install guide" }] },
                {
                    "role": "assistant",
                    "content": [{
                        "toolUse": {
                            "toolUseId": "tu-1",
                            "name": "search_docs",
                            "input": { "query": "install" }
                        }
                    }]
                },
                {
                    "role": "user",
                    "content": [
                        {
                            "toolResult": {
                                "toolUseId": "tu-1",
                                "content": [{ "text": "\"found\"" }],
                                "status": "success"
                            }
                        },
                        {
                            "toolResult": {
                                "toolUseId": "tu-2",
                                "content": [{ "text": "tool execution error: boom" }],
                                "status": "error"
                            }
                        }
                    ]
                }
            ],
            "system": [{ "text": "be brief" }],
            "toolConfig": {
                "tools": [{
                    "toolSpec": {
                        "name": "search_docs",
                        "description": "Search the documentation",
                        "inputSchema": {
                            "json": {
                                "type": "object",
                                "properties": { "query": { "type": "string" } }
                            }
                        }
                    }
                }],
                "toolChoice": { "auto": {} }
            },
            "inferenceConfig": { "maxTokens": 256 }
        })
    );
}

#[test]
fn api_request_omits_empty_optional_sections() {
    let transcript = vec![Message::user_text("hi")];
    let request = ModelRequest::new("model-x", &transcript).with_system(Some("   "));

    let body = serde_json::to_value(build_api_request(&request).expect("request should build"))
        .expect("request should serialize");

    assert_eq!(
        body,
        json!({ "messages": [{ "role": "user", "content": [{ "text": "hi" }] }] })
    );
}

#[test]
fn api_request_leaves_out_blank_tool_description() {
    let transcript = vec![Message::user_text("ping the server")];
    let mut undocumented = search_tool();
    undocumented.name = "ping".to_string();
    undocumented.description = " ".to_string();
    let config = ToolConfig::auto(vec![undocumented, search_tool()]);
    let request = ModelRequest::new("model-x", &transcript).with_tool_config(Some(&config));

    let body = serde_json::to_value(build_api_request(&request).expect("request should build"))
        .expect("request should serialize");

    let tools = &body["toolConfig"]["tools"];
    assert_eq!(tools[0]["toolSpec"]["name"], "ping");
    assert!(tools[0]["toolSpec"].get("description").is_none());
    assert_eq!(tools[1]["toolSpec"]["description"], "Search the documentation");
}

#[test]
fn api_request_rejects_message_without_content() {
    let transcript = vec![Message::user_text("hi"), Message::new(crate::Role::Assistant, Vec::new())];
    let request = ModelRequest::new("model-x", &transcript);

    let error = build_api_request(&request).expect_err("empty content should fail");
    assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);
}

#[test]
fn response_conversion_drops_unknown_blocks_and_keeps_unknown_stop_reason() {
    let response: ConverseApiResponse = serde_json::from_value(json!({
        "output": {
            "message": {
                "role": "assistant",
                "content": [
                    { "reasoningContent": { "reasoningText": { "text": "hmm" } } },
                    { "text": "Let me look." },
                    { "toolUse": { "toolUseId": "tu-9", "name": "search_docs", "input": { "query": "x" } } }
                ]
            }
        },
        "stopReason": "guardrail_intervened",
        "usage": { "inputTokens": 11, "outputTokens": 7, "totalTokens": 18 }
    }))
    .expect("response should deserialize");

    let converted = response
        .into_model_response("model-x")
        .expect("response should convert");

    assert_eq!(converted.message.content.len(), 2);
    assert_eq!(converted.first_text(), Some("Let me look."));
    assert_eq!(converted.message.tool_uses().count(), 1);
    assert_eq!(
        converted.stop_reason,
        StopReason::Other("guardrail_intervened".to_string())
    );
    assert_eq!(converted.usage.total_tokens, 18);
}

#[test]
fn response_conversion_rejects_unknown_role() {
    let response: ConverseApiResponse = serde_json::from_value(json!({
        "output": { "message": { "role": "system", "content": [{ "text": "x" }] } },
        "stopReason": "end_turn"
    }))
    .expect("response should deserialize");

    let error = response
        .into_model_response("model-x")
        .expect_err("unknown role should fail");
    assert_eq!(error.kind, ProviderErrorKind::Transport);
}

#[test]
fn converse_url_percent_encodes_model_id() {
    let transport = BedrockHttpTransport::new(reqwest::Client::new(), "eu-west-1");
    assert_eq!(transport.endpoint(), "https://bedrock-runtime.eu-west-1.amazonaws.com");
    assert_eq!(
        transport.converse_url("anthropic.claude-3-haiku-20240307-v1:0"),
        "https://bedrock-runtime.eu-west-1.amazonaws.com/model/anthropic.claude-3-haiku-20240307-v1%3A0/converse"
    );

    let local = transport.with_endpoint("http://localhost:4566/");
    assert_eq!(local.converse_url("m"), "http://localhost:4566/model/m/converse");
}

#[test]
fn converse_errors_classify_by_exception_name_before_status() {
    let not_ready = classify_converse_error(
        StatusCode::TOO_MANY_REQUESTS,
        Some("ModelNotReadyException"),
        "model is loading".to_string(),
    );
    assert_eq!(not_ready.kind, ProviderErrorKind::RateLimited);
    assert_eq!(not_ready.status, Some(429));

    let model_error = classify_converse_error(
        StatusCode::FAILED_DEPENDENCY,
        Some("ModelErrorException"),
        "model failed".to_string(),
    );
    assert_eq!(model_error.kind, ProviderErrorKind::Other);
    assert!(!model_error.retryable);

    let quota = classify_converse_error(
        StatusCode::BAD_REQUEST,
        Some("ServiceQuotaExceededException"),
        "quota".to_string(),
    );
    assert!(!quota.retryable);

    let internal = classify_converse_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        Some("InternalServerException"),
        "oops".to_string(),
    );
    assert_eq!(internal.kind, ProviderErrorKind::Unavailable);

    let untyped = classify_converse_error(StatusCode::FORBIDDEN, None, "denied".to_string());
    assert_eq!(untyped.kind, ProviderErrorKind::Authentication);
}

#[test]
fn auth_debug_is_redacted() {
    let auth = BedrockAuth::ApiKey(crate::SecretString::new("bedrock-key"));
    assert_eq!(format!("{auth:?}"), "BedrockAuth::ApiKey([REDACTED])");
}

#[tokio::test]
async fn provider_requires_credentials() {
    let transport = Arc::new(ScriptedTransport::default());
    let provider = BedrockProvider::new(
        Arc::new(SecureCredentialManager::new()),
        Arc::clone(&transport) as Arc<dyn ConverseTransport>,
    );
    let transcript = vec![Message::user_text("hi")];

    let error = provider
        .converse(ModelRequest::new("model-x", &transcript))
        .await
        .expect_err("missing credentials should fail");

    assert_eq!(error.kind, ProviderErrorKind::Authentication);
    assert!(transport.recorded().is_empty());
}

#[tokio::test]
async fn provider_retries_transient_failures_then_converts_response() {
    let transport = Arc::new(ScriptedTransport::with(vec![
        Err(ProviderError::rate_limited("ThrottlingException").with_status(429)),
        Ok(json!({
            "output": { "message": { "role": "assistant", "content": [{ "text": "Done." }] } },
            "stopReason": "end_turn",
            "usage": { "inputTokens": 3, "outputTokens": 2, "totalTokens": 5 }
        })),
    ]));
    let provider = provider_with(Arc::clone(&transport));
    let transcript = vec![Message::user_text("hi")];

    let response = provider
        .converse(ModelRequest::new("model-x", &transcript))
        .await
        .expect("second attempt should succeed");

    assert_eq!(response.first_text(), Some("Done."));
    assert_eq!(response.stop_reason, StopReason::EndTurn);
    assert_eq!(response.model, "model-x");

    let recorded = transport.recorded();
    assert_eq!(recorded.len(), 2);
    assert_eq!(recorded[0], recorded[1]);
    assert_eq!(recorded[0].0, "model-x");
}

#[tokio::test]
async fn provider_does_not_retry_validation_errors() {
    let transport = Arc::new(ScriptedTransport::with(vec![
        Err(ProviderError::invalid_request("ValidationException").with_status(400)),
        Ok(json!({ "stopReason": "end_turn" })),
    ]));
    let provider = provider_with(Arc::clone(&transport));
    let transcript = vec![Message::user_text("hi")];

    let error = provider
        .converse(ModelRequest::new("model-x", &transcript))
        .await
        .expect_err("validation errors should surface");

    assert_eq!(error.status, Some(400));
    assert_eq!(transport.recorded().len(), 1);
}

#[tokio::test]
async fn provider_validates_before_calling_transport() {
    let transport = Arc::new(ScriptedTransport::default());
    let provider = provider_with(Arc::clone(&transport));
    let transcript = vec![Message::assistant_text("hello")];

    let error = provider
        .converse(ModelRequest::new("model-x", &transcript))
        .await
        .expect_err("assistant-first transcript should fail");

    assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);
    assert!(transport.recorded().is_empty());
}
