//! Tool orchestration loop and session facade.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use mchat::prelude::*;
//! use mprovider::ModelProvider;
//! use mtooling::ToolProviderClient;
//!
//! async fn ask(
//!     provider: Arc<dyn ModelProvider>,
//!     client: Arc<dyn ToolProviderClient>,
//! ) -> Result<String, ChatError> {
//!     let session = McpSession::builder(provider, client)
//!         .model_id("anthropic.claude-3-haiku-20240307-v1:0")
//!         .max_rounds(5)
//!         .build()?;
//!
//!     let answer = session.answer_once("What changed in 2.0?", None).await?;
//!     Ok(answer.text_or_fallback().to_string())
//! }
//! ```

mod error;
mod hooks;
mod session;
mod tool_loop;
mod transcript;
mod types;

pub mod prelude {
    pub use crate::{
        Answer, ChatError, ChatErrorKind, ChatErrorPhase, ChatErrorSource, ChatPolicy,
        ChatRuntimeHooks, LoopOutcome, McpSession, McpSessionBuilder, NoopChatRuntimeHooks,
        ToolLoop, Transcript,
    };
    pub use mcommon::{SessionId, TraceId};
}

pub use error::{ChatError, ChatErrorKind, ChatErrorPhase, ChatErrorSource};
pub use hooks::{ChatRuntimeHooks, NoopChatRuntimeHooks};
pub use session::{McpSession, McpSessionBuilder};
pub use tool_loop::ToolLoop;
pub use transcript::Transcript;
pub use types::{
    Answer, ChatPolicy, DEFAULT_CONTINUATION_PROMPT, DEFAULT_MAX_ROUNDS, FALLBACK_ANSWER,
    LoopOutcome,
};
