use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use mchat::prelude::*;
use mprovider::{
    ContentBlock, Message, ModelProvider, ModelRequest, ModelResponse, ProviderError,
    ProviderFuture, ProviderId, Role, StopReason, TokenUsage, ToolChoice, ToolUse, TurnKind,
};
use mtooling::{ToolDescriptor, ToolError, ToolFuture, ToolProviderClient};
use serde_json::{Value, json};

#[derive(Debug, Clone)]
struct SeenRequest {
    messages: Vec<Message>,
    tool_names: Vec<String>,
    tool_choice: Option<ToolChoice>,
    system: Option<String>,
}

struct ScriptedProvider {
    script: Mutex<VecDeque<(Message, StopReason)>>,
    repeat_last: Option<(Message, StopReason)>,
    seen: Mutex<Vec<SeenRequest>>,
}

impl ScriptedProvider {
    fn new(script: Vec<(Message, StopReason)>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            repeat_last: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn always(message: Message, stop_reason: StopReason) -> Self {
        Self {
            repeat_last: Some((message, stop_reason)),
            ..Self::new(Vec::new())
        }
    }

    fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().expect("seen lock").clone()
    }
}

impl ModelProvider for ScriptedProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Bedrock
    }

    fn converse<'a>(
        &'a self,
        request: ModelRequest<'a>,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
        Box::pin(async move {
            self.seen.lock().expect("seen lock").push(SeenRequest {
                messages: request.messages.to_vec(),
                tool_names: request
                    .tool_config
                    .map(|config| config.tools.iter().map(|tool| tool.name.clone()).collect())
                    .unwrap_or_default(),
                tool_choice: request.tool_config.map(|config| config.tool_choice.clone()),
                system: request.system.map(str::to_string),
            });

            let next = self.script.lock().expect("script lock").pop_front();
            let (message, stop_reason) = next
                .or_else(|| self.repeat_last.clone())
                .ok_or_else(|| ProviderError::other("script exhausted"))?;

            Ok(ModelResponse {
                provider: ProviderId::Bedrock,
                model: request.model_id,
                message,
                stop_reason,
                usage: TokenUsage {
                    input_tokens: 10,
                    output_tokens: 4,
                    total_tokens: 14,
                },
            })
        })
    }
}

#[derive(Default)]
struct DocsToolProvider {
    events: Mutex<Vec<String>>,
    calls: Mutex<Vec<(String, Value)>>,
    fail_close: bool,
}

impl DocsToolProvider {
    fn events(&self) -> Vec<String> {
        self.events.lock().expect("events lock").clone()
    }
}

impl ToolProviderClient for DocsToolProvider {
    fn initialize<'a>(&'a self) -> ToolFuture<'a, Result<SessionId, ToolError>> {
        Box::pin(async move {
            self.events.lock().expect("events lock").push("initialize".to_string());
            Ok(SessionId::new("mcp-session-1"))
        })
    }

    fn list_tools<'a>(&'a self) -> ToolFuture<'a, Result<Vec<ToolDescriptor>, ToolError>> {
        Box::pin(async move {
            self.events.lock().expect("events lock").push("list_tools".to_string());
            Ok(vec![ToolDescriptor::new(
                "search-docs",
                "Search the documentation",
                json!({
                    "type": "object",
                    "properties": { "query": { "type": "string" } },
                    "required": ["query"]
                }),
            )])
        })
    }

    fn call_tool<'a>(
        &'a self,
        name: &'a str,
        input: &'a Value,
    ) -> ToolFuture<'a, Result<Value, ToolError>> {
        Box::pin(async move {
            self.calls
                .lock()
                .expect("calls lock")
                .push((name.to_string(), input.clone()));
            match name {
                "search-docs" => Ok(json!({ "hits": ["install.md"] })),
                other => Err(ToolError::not_found(format!("unknown tool '{other}'"))),
            }
        })
    }

    fn close<'a>(&'a self) -> ToolFuture<'a, Result<bool, ToolError>> {
        Box::pin(async move {
            self.events.lock().expect("events lock").push("close".to_string());
            if self.fail_close {
                return Err(ToolError::transport("connection reset"));
            }
            Ok(true)
        })
    }
}

fn search_call(id: &str) -> Message {
    Message::new(
        Role::Assistant,
        vec![ContentBlock::ToolUse(ToolUse::new(
            id,
            "search_docs",
            json!({ "query": "install" }),
        ))],
    )
}

fn session(provider: Arc<ScriptedProvider>, client: Arc<DocsToolProvider>) -> McpSession {
    McpSession::builder(provider, client)
        .model_id("test-model")
        .build()
        .expect("session should build")
}

#[tokio::test]
async fn search_docs_round_trip_maps_names_and_answers() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        (search_call("tu-1"), StopReason::ToolUse),
        (Message::assistant_text("Done."), StopReason::EndTurn),
    ]));
    let client = Arc::new(DocsToolProvider::default());
    let mut session = session(provider.clone(), client.clone());

    let answer = session
        .answer("How do I install it?", Some("Be brief."))
        .await
        .expect("answer should succeed");

    assert_eq!(answer, Answer::Text("Done.".to_string()));
    assert_eq!(
        *client.calls.lock().expect("calls lock"),
        vec![("search-docs".to_string(), json!({ "query": "install" }))]
    );

    let seen = provider.seen();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].tool_names, vec!["search_docs".to_string()]);
    assert_eq!(seen[0].tool_choice, Some(ToolChoice::Auto));
    assert_eq!(seen[0].system.as_deref(), Some("Be brief."));
    assert_eq!(seen[0].messages.len(), 1);
    assert_eq!(seen[1].messages.len(), 3);

    let kinds: Vec<_> = session.transcript().iter().map(Message::kind).collect();
    assert_eq!(
        kinds,
        vec![
            TurnKind::User,
            TurnKind::Assistant,
            TurnKind::ToolResult,
            TurnKind::Assistant,
        ]
    );

    let result = session.transcript().messages()[2]
        .tool_results_iter()
        .next()
        .cloned()
        .expect("tool result should be recorded");
    assert_eq!(result.tool_use_id, "tu-1");
    assert!(!result.is_error());
    assert_eq!(result.content, r#"{"hits":["install.md"]}"#);
}

#[tokio::test]
async fn failing_tool_is_reported_to_the_model_not_the_caller() {
    let unknown = Message::new(
        Role::Assistant,
        vec![
            ContentBlock::ToolUse(ToolUse::new("tu-1", "drop_tables", json!({}))),
            ContentBlock::ToolUse(ToolUse::new("tu-2", "search_docs", json!({ "query": "x" }))),
        ],
    );
    let provider = Arc::new(ScriptedProvider::new(vec![
        (unknown, StopReason::ToolUse),
        (Message::assistant_text("Recovered."), StopReason::EndTurn),
    ]));
    let client = Arc::new(DocsToolProvider::default());
    let mut session = session(provider, client);

    let answer = session
        .answer("go", None)
        .await
        .expect("tool failure must not abort the turn");
    assert_eq!(answer.text_or_fallback(), "Recovered.");

    let results: Vec<_> = session.transcript().messages()[2]
        .tool_results_iter()
        .cloned()
        .collect();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].tool_use_id, "tu-1");
    assert!(results[0].is_error());
    assert!(results[0].content.starts_with("tool execution error: "));
    assert!(results[0].content.contains("drop-tables"));
    assert_eq!(results[1].tool_use_id, "tu-2");
    assert!(!results[1].is_error());
}

#[tokio::test]
async fn always_tool_use_model_exhausts_after_five_rounds() {
    let provider = Arc::new(ScriptedProvider::always(
        search_call("tu-loop"),
        StopReason::ToolUse,
    ));
    let client = Arc::new(DocsToolProvider::default());
    let mut session = session(provider.clone(), client.clone());

    let outcome = session
        .invoke_with_tools("loop forever", None)
        .await
        .expect("exhaustion is not an error");

    assert!(outcome.is_exhausted());
    assert_eq!(outcome.rounds(), 5);
    assert_eq!(outcome.usage().total_tokens, 70);
    assert_eq!(provider.seen().len(), 5);
    assert_eq!(client.calls.lock().expect("calls lock").len(), 5);
    assert_eq!(session.transcript().len(), 11);

    let mut session = McpSession::builder(provider, client)
        .model_id("test-model")
        .build()
        .expect("session should build");
    let answer = session.answer("again", None).await.expect("answer");
    assert_eq!(answer, Answer::Exhausted);
    assert_eq!(answer.text_or_fallback(), "Unable to generate a response.");
}

#[tokio::test]
async fn max_tokens_appends_one_continuation_then_reinvokes() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        (Message::assistant_text("The first half"), StopReason::MaxTokens),
        (Message::assistant_text("and the rest."), StopReason::EndTurn),
    ]));
    let mut session = session(provider.clone(), Arc::new(DocsToolProvider::default()));

    let answer = session.answer("Tell me everything", None).await.expect("answer");
    assert_eq!(answer.as_text(), Some("and the rest."));

    let seen = provider.seen();
    assert_eq!(seen.len(), 2);
    let second_call = &seen[1].messages;
    assert_eq!(second_call.len(), 3);
    assert_eq!(second_call[2].kind(), TurnKind::User);
    assert_eq!(second_call[2].first_text(), Some("Please continue."));
}

#[tokio::test]
async fn unrecognized_stop_reason_is_fatal_without_retry() {
    let provider = Arc::new(ScriptedProvider::new(vec![(
        Message::assistant_text("filtered"),
        StopReason::Other("content_filtered".to_string()),
    )]));
    let mut session = session(provider.clone(), Arc::new(DocsToolProvider::default()));

    let error = session
        .answer("hello", None)
        .await
        .expect_err("unknown stop reason should fail");

    assert_eq!(error.kind, ChatErrorKind::UnrecognizedStopReason);
    assert!(error.message.contains("content_filtered"));
    assert_eq!(provider.seen().len(), 1);
}

#[tokio::test]
async fn end_turn_without_text_is_an_empty_answer() {
    let provider = Arc::new(ScriptedProvider::new(vec![(
        Message::new(Role::Assistant, Vec::new()),
        StopReason::EndTurn,
    )]));
    let mut session = session(provider, Arc::new(DocsToolProvider::default()));

    let answer = session.answer("hello", None).await.expect("answer");
    assert_eq!(answer, Answer::Empty);
    assert_eq!(answer.text_or_fallback(), "Unable to generate a response.");
    assert_eq!(session.transcript().len(), 1);
}

#[tokio::test]
async fn blank_input_is_rejected_before_any_call() {
    let provider = Arc::new(ScriptedProvider::new(Vec::new()));
    let client = Arc::new(DocsToolProvider::default());
    let mut session = session(provider.clone(), client.clone());

    let error = session
        .answer("   ", None)
        .await
        .expect_err("blank input should fail");

    assert_eq!(error.kind, ChatErrorKind::InvalidRequest);
    assert!(error.is_user_error());
    assert!(provider.seen().is_empty());
    assert!(client.events().is_empty());
    assert!(session.transcript().is_empty());
}

#[tokio::test]
async fn catalog_loads_lazily_once_and_close_keeps_transcript() {
    let provider = Arc::new(ScriptedProvider::always(
        Message::assistant_text("ok"),
        StopReason::EndTurn,
    ));
    let client = Arc::new(DocsToolProvider::default());
    let mut session = session(provider, client.clone());
    assert!(session.catalog().is_none());

    session.answer("one", None).await.expect("first answer");
    session.answer("two", None).await.expect("second answer");

    assert_eq!(client.events(), vec!["initialize", "list_tools"]);
    assert_eq!(session.session_id().map(SessionId::as_str), Some("mcp-session-1"));
    assert_eq!(session.catalog().map(|catalog| catalog.len()), Some(1));

    assert!(session.close().await.expect("close should succeed"));
    assert!(session.catalog().is_none());
    assert!(session.session_id().is_none());
    assert_eq!(session.transcript().len(), 4);
}

#[tokio::test]
async fn answer_once_closes_on_success_and_on_failure() {
    let provider = Arc::new(ScriptedProvider::new(vec![(
        Message::assistant_text("Done."),
        StopReason::EndTurn,
    )]));
    let client = Arc::new(DocsToolProvider::default());
    let answer = session(provider, client.clone())
        .answer_once("hi", None)
        .await
        .expect("answer_once should succeed");
    assert_eq!(answer.as_text(), Some("Done."));
    assert_eq!(client.events().last().map(String::as_str), Some("close"));

    let failing = Arc::new(ScriptedProvider::new(Vec::new()));
    let client = Arc::new(DocsToolProvider {
        fail_close: true,
        ..DocsToolProvider::default()
    });
    let error = session(failing, client.clone())
        .answer_once("hi", None)
        .await
        .expect_err("provider failure should surface");

    assert_eq!(error.kind, ChatErrorKind::Provider);
    assert_eq!(client.events().last().map(String::as_str), Some("close"));
}
