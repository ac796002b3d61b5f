//! Provider-agnostic conversation, tool, and response model types.
//!
//! ```rust
//! use mprovider::{ContentBlock, Message, ModelRequest, ProviderErrorKind, Role, TurnKind};
//!
//! let transcript = vec![Message::user_text("Summarize this diff")];
//! assert_eq!(transcript[0].kind(), TurnKind::User);
//!
//! let ok = ModelRequest::new("anthropic.claude-3-haiku-20240307-v1:0", &transcript);
//! assert!(ok.validate().is_ok());
//!
//! let err = ModelRequest::new("", &transcript)
//!     .validate()
//!     .expect_err("empty model should fail");
//! assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);
//! assert!(matches!(transcript[0].content[0], ContentBlock::Text(_)));
//! assert_eq!(transcript[0].role, Role::User);
//! ```

use std::fmt::{Display, Formatter};

use mcommon::GenerationOptions;
use serde_json::Value;

use crate::{ProviderError, ProviderErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Bedrock,
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let id = match self {
            Self::Bedrock => "bedrock",
        };

        f.write_str(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// Logical classification of a transcript turn.
///
/// Tool results travel on the wire as user-role turns; a user turn made up
/// entirely of tool-result blocks is reported as [`TurnKind::ToolResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnKind {
    User,
    Assistant,
    ToolResult,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolUse {
    pub id: String,
    pub name: String,
    pub input: Value,
}

impl ToolUse {
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolResultStatus {
    Success,
    Error,
}

impl ToolResultStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub tool_use_id: String,
    pub status: ToolResultStatus,
    pub content: String,
}

impl ToolResult {
    pub fn success(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            status: ToolResultStatus::Success,
            content: content.into(),
        }
    }

    pub fn error(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            status: ToolResultStatus::Error,
            content: content.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == ToolResultStatus::Error
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Text(String),
    ToolUse(ToolUse),
    ToolResult(ToolResult),
}

impl ContentBlock {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Message {
    pub fn new(role: Role, content: Vec<ContentBlock>) -> Self {
        Self { role, content }
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![ContentBlock::text(text)])
    }

    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, vec![ContentBlock::text(text)])
    }

    pub fn tool_results(results: Vec<ToolResult>) -> Self {
        Self::new(
            Role::User,
            results.into_iter().map(ContentBlock::ToolResult).collect(),
        )
    }

    pub fn kind(&self) -> TurnKind {
        match self.role {
            Role::Assistant => TurnKind::Assistant,
            Role::User
                if !self.content.is_empty()
                    && self
                        .content
                        .iter()
                        .all(|block| matches!(block, ContentBlock::ToolResult(_))) =>
            {
                TurnKind::ToolResult
            }
            Role::User => TurnKind::User,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(ContentBlock::as_text)
    }

    pub fn tool_uses(&self) -> impl Iterator<Item = &ToolUse> {
        self.content.iter().filter_map(|block| match block {
            ContentBlock::ToolUse(tool_use) => Some(tool_use),
            _ => None,
        })
    }

    pub fn tool_results_iter(&self) -> impl Iterator<Item = &ToolResult> {
        self.content.iter().filter_map(|block| match block {
            ContentBlock::ToolResult(result) => Some(result),
            _ => None,
        })
    }
}

/// Tool description in the model API's naming convention.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolChoice {
    /// The model decides whether to call a tool.
    Auto,
    /// The model must call at least one tool.
    Any,
    /// The model must call the named tool.
    Tool(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolConfig {
    pub tools: Vec<ToolSpec>,
    pub tool_choice: ToolChoice,
}

impl ToolConfig {
    pub fn auto(tools: Vec<ToolSpec>) -> Self {
        Self {
            tools,
            tool_choice: ToolChoice::Auto,
        }
    }

    pub fn with_tool_choice(mut self, tool_choice: ToolChoice) -> Self {
        self.tool_choice = tool_choice;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    ToolUse,
    EndTurn,
    StopSequence,
    MaxTokens,
    /// Any signal this crate does not model, kept verbatim.
    Other(String),
}

impl StopReason {
    pub fn parse(value: &str) -> Self {
        match value {
            "tool_use" => Self::ToolUse,
            "end_turn" => Self::EndTurn,
            "stop_sequence" => Self::StopSequence,
            "max_tokens" => Self::MaxTokens,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::ToolUse => "tool_use",
            Self::EndTurn => "end_turn",
            Self::StopSequence => "stop_sequence",
            Self::MaxTokens => "max_tokens",
            Self::Other(value) => value.as_str(),
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, Self::EndTurn | Self::StopSequence)
    }
}

impl Display for StopReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn accumulate(&mut self, other: TokenUsage) {
        self.input_tokens = self.input_tokens.saturating_add(other.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(other.output_tokens);
        self.total_tokens = self.total_tokens.saturating_add(other.total_tokens);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelResponse {
    pub provider: ProviderId,
    pub model: String,
    pub message: Message,
    pub stop_reason: StopReason,
    pub usage: TokenUsage,
}

impl ModelResponse {
    pub fn first_text(&self) -> Option<&str> {
        self.message.first_text()
    }
}

/// A single model invocation. Borrows the transcript so the caller keeps ownership
/// of the full history between rounds.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest<'a> {
    pub model_id: String,
    pub messages: &'a [Message],
    pub tool_config: Option<&'a ToolConfig>,
    pub system: Option<&'a str>,
    pub options: GenerationOptions,
}

impl<'a> ModelRequest<'a> {
    pub fn new(model_id: impl Into<String>, messages: &'a [Message]) -> Self {
        Self {
            model_id: model_id.into(),
            messages,
            tool_config: None,
            system: None,
            options: GenerationOptions::default(),
        }
    }

    pub fn with_tool_config(mut self, tool_config: Option<&'a ToolConfig>) -> Self {
        self.tool_config = tool_config;
        self
    }

    pub fn with_system(mut self, system: Option<&'a str>) -> Self {
        self.system = system;
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.model_id.trim().is_empty() {
            return Err(ProviderError::invalid_request("model id must not be empty"));
        }

        if self.messages.is_empty() {
            return Err(ProviderError::invalid_request(
                "at least one message is required",
            ));
        }

        if self.messages[0].role != Role::User {
            return Err(ProviderError::invalid_request(
                "conversation must start with a user turn",
            ));
        }

        if let Some(config) = self.tool_config
            && config.tools.is_empty()
        {
            return Err(ProviderError::invalid_request(
                "tool config must declare at least one tool",
            ));
        }

        if let Some(max_tokens) = self.options.max_tokens
            && max_tokens == 0
        {
            return Err(ProviderError::invalid_request(
                "max_tokens must be greater than zero",
            ));
        }

        if let Some(temperature) = self.options.temperature
            && !(0.0..=1.0).contains(&temperature)
        {
            return Err(ProviderError::new(
                ProviderErrorKind::InvalidRequest,
                "temperature must be in the inclusive range 0.0..=1.0",
                false,
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn stop_reason_parse_keeps_unknown_values() {
        assert_eq!(StopReason::parse("tool_use"), StopReason::ToolUse);
        assert_eq!(StopReason::parse("end_turn"), StopReason::EndTurn);
        assert_eq!(StopReason::parse("stop_sequence"), StopReason::StopSequence);
        assert_eq!(StopReason::parse("max_tokens"), StopReason::MaxTokens);

        let other = StopReason::parse("guardrail_intervened");
        assert_eq!(other, StopReason::Other("guardrail_intervened".to_string()));
        assert_eq!(other.to_string(), "guardrail_intervened");
        assert!(!other.is_final());
        assert!(StopReason::StopSequence.is_final());
    }

    #[test]
    fn message_kind_distinguishes_tool_result_turns() {
        assert_eq!(Message::user_text("hi").kind(), TurnKind::User);
        assert_eq!(Message::assistant_text("hey").kind(), TurnKind::Assistant);
        assert_eq!(
            Message::tool_results(vec![ToolResult::success("t1", "{}")]).kind(),
            TurnKind::ToolResult
        );
        assert_eq!(Message::new(Role::User, Vec::new()).kind(), TurnKind::User);
    }

    #[test]
    fn message_helpers_find_text_and_tool_uses() {
        let message = Message::new(
            Role::Assistant,
            vec![
                ContentBlock::ToolUse(ToolUse::new("t1", "search_docs", json!({"q": "rust"}))),
                ContentBlock::text("looking"),
                ContentBlock::ToolUse(ToolUse::new("t2", "fetch_page", json!({}))),
            ],
        );

        assert_eq!(message.first_text(), Some("looking"));
        let ids = message
            .tool_uses()
            .map(|call| call.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["t1", "t2"]);
    }

    #[test]
    fn token_usage_accumulates_saturating() {
        let mut usage = TokenUsage {
            input_tokens: u32::MAX - 1,
            output_tokens: 1,
            total_tokens: 2,
        };
        usage.accumulate(TokenUsage {
            input_tokens: 5,
            output_tokens: 2,
            total_tokens: 3,
        });

        assert_eq!(usage.input_tokens, u32::MAX);
        assert_eq!(usage.output_tokens, 3);
        assert_eq!(usage.total_tokens, 5);
    }

    #[test]
    fn validate_rejects_empty_tool_config_and_assistant_first() {
        let messages = vec![Message::user_text("hi")];
        let empty = ToolConfig::auto(Vec::new());
        let error = ModelRequest::new("model", &messages)
            .with_tool_config(Some(&empty))
            .validate()
            .expect_err("empty tool config should fail");
        assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);

        let assistant_first = vec![Message::assistant_text("hello")];
        assert!(
            ModelRequest::new("model", &assistant_first)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn validate_checks_generation_options() {
        let messages = vec![Message::user_text("hi")];
        let zero_tokens = ModelRequest::new("model", &messages)
            .with_options(GenerationOptions::default().with_max_tokens(0));
        assert!(zero_tokens.validate().is_err());

        let hot = ModelRequest::new("model", &messages)
            .with_options(GenerationOptions::default().with_temperature(1.5));
        assert!(hot.validate().is_err());
    }
}
