//! Common `mprovider` imports for downstream crates.

pub use crate::{
    ContentBlock, Message, ModelProvider, ModelRequest, ModelResponse, NoopOperationHooks,
    ProviderError, ProviderErrorKind, ProviderFuture, ProviderId, ProviderOperationHooks,
    RetryPolicy, Role, StopReason, TokenUsage, ToolChoice, ToolConfig, ToolResult,
    ToolResultStatus, ToolSpec, ToolUse, TurnKind, execute_with_retry,
};
pub use mcommon::{BoxFuture, GenerationOptions, MetadataMap};
