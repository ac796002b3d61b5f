use std::error::Error;
use std::fmt::{Display, Formatter};

use mchat::ChatError;
use mprovider::ProviderError;
use mtooling::ToolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeErrorKind {
    /// Required settings are missing or malformed.
    Config,
    Provider,
    Tooling,
    Chat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeError {
    pub kind: BridgeErrorKind,
    pub message: String,
}

impl BridgeError {
    pub fn new(kind: BridgeErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(BridgeErrorKind::Config, message)
    }

    pub fn is_config(&self) -> bool {
        self.kind == BridgeErrorKind::Config
    }
}

impl Display for BridgeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for BridgeError {}

impl From<ProviderError> for BridgeError {
    fn from(value: ProviderError) -> Self {
        Self::new(BridgeErrorKind::Provider, value.to_string())
    }
}

impl From<ToolError> for BridgeError {
    fn from(value: ToolError) -> Self {
        Self::new(BridgeErrorKind::Tooling, value.to_string())
    }
}

impl From<ChatError> for BridgeError {
    fn from(value: ChatError) -> Self {
        Self::new(BridgeErrorKind::Chat, value.to_string())
    }
}
