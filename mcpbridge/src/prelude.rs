//! Common imports for most mcpbridge applications.

pub use crate::{
    Answer, BridgeConfig, BridgeError, BridgeErrorKind, ChatError, ChatErrorKind, ChatPolicy,
    LoopOutcome, McpSession, Message, ModelProvider, SessionId, StopReason, ToolDescriptor,
    ToolProviderClient, Transcript,
};
pub use crate::{answer_once, build_session, build_session_with_client};
