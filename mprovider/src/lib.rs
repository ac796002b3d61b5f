//! Model provider abstractions and the Bedrock Converse adapter.
//!
//! ```rust
//! use mprovider::{Message, ModelRequest, ToolConfig, ToolSpec};
//! use serde_json::json;
//!
//! let transcript = vec![Message::user_text("What does search_docs return?")];
//! let tools = ToolConfig::auto(vec![ToolSpec {
//!     name: "search_docs".to_string(),
//!     description: "Search the documentation".to_string(),
//!     input_schema: json!({ "type": "object", "properties": {} }),
//! }]);
//!
//! let request = ModelRequest::new("anthropic.claude-3-haiku-20240307-v1:0", &transcript)
//!     .with_tool_config(Some(&tools));
//! assert!(request.validate().is_ok());
//! ```

mod credentials;
mod error;
mod model;
mod provider;
mod resilience;

pub mod adapters;
pub mod prelude;

pub use credentials::{SecretString, SecureCredentialManager};
pub use error::{ProviderError, ProviderErrorKind};
pub use mcommon::{BoxFuture, GenerationOptions};
pub use model::{
    ContentBlock, Message, ModelRequest, ModelResponse, ProviderId, Role, StopReason, TokenUsage,
    ToolChoice, ToolConfig, ToolResult, ToolResultStatus, ToolSpec, ToolUse, TurnKind,
};
pub use provider::{ModelProvider, ProviderFuture};
pub use resilience::{
    NoopOperationHooks, ProviderOperationHooks, RetryClass, RetryPolicy, execute_with_retry,
};
