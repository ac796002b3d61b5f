//! Unified facade over the mcpbridge workspace crates.
//!
//! Wires a Bedrock Converse model and an MCP tool server into one [`McpSession`]:
//!
//! ```rust,no_run
//! use mcpbridge::prelude::*;
//!
//! async fn run() -> Result<(), BridgeError> {
//!     let config = BridgeConfig::from_env()?;
//!     let mut session = build_session(&config)?;
//!
//!     session.initialize().await?;
//!     let answer = session.answer("How do I install the CLI?", None).await?;
//!     println!("{}", answer.text_or_fallback());
//!     session.close().await?;
//!     Ok(())
//! }
//! ```

mod config;
mod error;

pub mod prelude;
pub mod runtime;

pub use mchat;
pub use mcommon;
pub use mobserve;
pub use mprovider;
pub use mtooling;

pub use config::{
    BridgeConfig, DEFAULT_TIMEOUT, ENV_AWS_DEFAULT_REGION, ENV_AWS_REGION, ENV_BEDROCK_API_KEY,
    ENV_BEDROCK_ENDPOINT, ENV_BEDROCK_MODEL_ID, ENV_MCP_AUTH_TOKEN, ENV_MCP_SESSION_ID,
    ENV_MCP_URL,
};
pub use error::{BridgeError, BridgeErrorKind};

pub use mchat::{
    Answer, ChatError, ChatErrorKind, ChatPolicy, ChatRuntimeHooks, LoopOutcome, McpSession,
    McpSessionBuilder, ToolLoop, Transcript,
};
pub use mcommon::{BoxFuture, GenerationOptions, SessionId, TraceId};
pub use mprovider::{
    Message, ModelProvider, ModelResponse, ProviderError, ProviderErrorKind, RetryPolicy,
    StopReason, TokenUsage,
};
pub use mtooling::{ToolCatalog, ToolDescriptor, ToolError, ToolErrorKind, ToolProviderClient};

pub use runtime::{
    answer_once, build_provider, build_session, build_session_with_client, build_tool_client,
    http_client,
};
