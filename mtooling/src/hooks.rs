//! Lifecycle hooks for tool calls made by the dispatcher.
//!
//! ```rust
//! use mtooling::{NoopToolRuntimeHooks, ToolRuntimeHooks};
//!
//! fn assert_hooks_trait(_hooks: &dyn ToolRuntimeHooks) {}
//!
//! let hooks = NoopToolRuntimeHooks;
//! assert_hooks_trait(&hooks);
//! ```

use std::time::Duration;

use mprovider::{ToolResult, ToolUse};

use crate::{ToolError, ToolExecutionContext};

pub trait ToolRuntimeHooks: Send + Sync {
    /// `provider_name` is the name actually sent to the tool provider.
    fn on_execution_start(
        &self,
        _tool_use: &ToolUse,
        _provider_name: &str,
        _context: &ToolExecutionContext,
    ) {
    }

    fn on_execution_success(
        &self,
        _tool_use: &ToolUse,
        _context: &ToolExecutionContext,
        _result: &ToolResult,
        _elapsed: Duration,
    ) {
    }

    fn on_execution_failure(
        &self,
        _tool_use: &ToolUse,
        _context: &ToolExecutionContext,
        _error: &ToolError,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopToolRuntimeHooks;

impl ToolRuntimeHooks for NoopToolRuntimeHooks {}
