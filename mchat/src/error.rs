//! Chat-layer errors and classification.

use std::error::Error;
use std::fmt::{Display, Formatter};

use mprovider::{ProviderError, ProviderErrorKind};
use mtooling::{ToolError, ToolErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    InvalidRequest,
    Provider,
    Tooling,
    /// The model stopped for a reason the loop has no transition for.
    UnrecognizedStopReason,
}

/// Session step that was running when the error surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorPhase {
    Initialize,
    Model,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorSource {
    Provider(ProviderErrorKind),
    Tool(ToolErrorKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
    pub phase: Option<ChatErrorPhase>,
    pub source: Option<ChatErrorSource>,
    pub retryable: bool,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            phase: None,
            source: None,
            retryable: false,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::InvalidRequest, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Provider, message).with_phase(ChatErrorPhase::Model)
    }

    pub fn tooling(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Tooling, message)
    }

    pub fn unrecognized_stop_reason(stop_reason: impl Display) -> Self {
        Self::new(
            ChatErrorKind::UnrecognizedStopReason,
            format!("unrecognized stop reason: {stop_reason}"),
        )
        .with_phase(ChatErrorPhase::Model)
    }

    pub fn with_phase(mut self, phase: ChatErrorPhase) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    pub fn is_user_error(&self) -> bool {
        match (self.kind, self.source) {
            (ChatErrorKind::InvalidRequest, _) => true,
            (_, Some(ChatErrorSource::Provider(kind))) => matches!(
                kind,
                ProviderErrorKind::Authentication | ProviderErrorKind::InvalidRequest
            ),
            (_, Some(ChatErrorSource::Tool(kind))) => matches!(
                kind,
                ToolErrorKind::InvalidArguments
                    | ToolErrorKind::NotFound
                    | ToolErrorKind::Unauthorized
            ),
            _ => false,
        }
    }
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.phase {
            Some(phase) => write!(f, "{:?} [phase={:?}]: {}", self.kind, phase, self.message),
            None => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl Error for ChatError {}

impl From<ProviderError> for ChatError {
    fn from(value: ProviderError) -> Self {
        Self {
            source: Some(ChatErrorSource::Provider(value.kind)),
            retryable: value.retryable,
            ..ChatError::provider(value.to_string())
        }
    }
}

impl From<ToolError> for ChatError {
    fn from(value: ToolError) -> Self {
        Self {
            source: Some(ChatErrorSource::Tool(value.kind)),
            retryable: value.retryable,
            ..ChatError::tooling(value.to_string())
        }
    }
}
