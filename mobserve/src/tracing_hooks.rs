//! Tracing-based hooks for model calls, tool dispatch, and orchestration rounds.
//!
//! ```rust
//! use mchat::ChatRuntimeHooks;
//! use mobserve::TracingObservabilityHooks;
//!
//! fn accepts_chat_hooks(_hooks: &dyn ChatRuntimeHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_chat_hooks(&hooks);
//! ```

use std::time::Duration;

use mchat::{ChatError, ChatRuntimeHooks, LoopOutcome};
use mcommon::SessionId;
use mprovider::{
    ProviderError, ProviderId, ProviderOperationHooks, StopReason, TokenUsage, ToolResult, ToolUse,
};
use mtooling::{ToolError, ToolExecutionContext, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl ProviderOperationHooks for TracingObservabilityHooks {
    fn on_attempt_start(&self, provider: ProviderId, operation: &str, attempt: u32) {
        tracing::info!(
            phase = "provider",
            event = "attempt_start",
            provider = %provider,
            operation,
            attempt
        );
    }

    fn on_retry_scheduled(
        &self,
        provider: ProviderId,
        operation: &str,
        attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        tracing::warn!(
            phase = "provider",
            event = "retry_scheduled",
            provider = %provider,
            operation,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error_kind = ?error.kind,
            status = error.status,
            retryable = error.retryable,
            error = %error
        );
    }

    fn on_success(&self, provider: ProviderId, operation: &str, attempts: u32) {
        tracing::info!(
            phase = "provider",
            event = "success",
            provider = %provider,
            operation,
            attempts
        );
    }

    fn on_failure(
        &self,
        provider: ProviderId,
        operation: &str,
        attempts: u32,
        error: &ProviderError,
    ) {
        tracing::error!(
            phase = "provider",
            event = "failure",
            provider = %provider,
            operation,
            attempts,
            error_kind = ?error.kind,
            status = error.status,
            retryable = error.retryable,
            error = %error
        );
    }
}

impl ToolRuntimeHooks for TracingObservabilityHooks {
    fn on_execution_start(
        &self,
        tool_use: &ToolUse,
        provider_name: &str,
        context: &ToolExecutionContext,
    ) {
        tracing::info!(
            phase = "tool",
            event = "execution_start",
            tool_name = tool_use.name,
            provider_name,
            tool_use_id = tool_use.id,
            session_id = %context.session_id,
            trace_id = context.trace_id.as_ref().map(|id| id.as_str())
        );
    }

    fn on_execution_success(
        &self,
        tool_use: &ToolUse,
        context: &ToolExecutionContext,
        result: &ToolResult,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "tool",
            event = "execution_success",
            tool_name = tool_use.name,
            tool_use_id = tool_use.id,
            session_id = %context.session_id,
            trace_id = context.trace_id.as_ref().map(|id| id.as_str()),
            result_bytes = result.content.len() as u64,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_execution_failure(
        &self,
        tool_use: &ToolUse,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        tracing::warn!(
            phase = "tool",
            event = "execution_failure",
            tool_name = tool_use.name,
            tool_use_id = tool_use.id,
            session_id = %context.session_id,
            trace_id = context.trace_id.as_ref().map(|id| id.as_str()),
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }
}

impl ChatRuntimeHooks for TracingObservabilityHooks {
    fn on_round_start(&self, session_id: &SessionId, round: u32) {
        tracing::debug!(
            phase = "chat",
            event = "round_start",
            session_id = %session_id,
            round
        );
    }

    fn on_round_complete(
        &self,
        session_id: &SessionId,
        round: u32,
        stop_reason: &StopReason,
        usage: TokenUsage,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "chat",
            event = "round_complete",
            session_id = %session_id,
            round,
            stop_reason = %stop_reason,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_turn_complete(&self, session_id: &SessionId, outcome: &LoopOutcome, elapsed: Duration) {
        if outcome.is_exhausted() {
            tracing::warn!(
                phase = "chat",
                event = "turn_exhausted",
                session_id = %session_id,
                rounds = outcome.rounds(),
                total_tokens = outcome.usage().total_tokens,
                elapsed_ms = elapsed.as_millis() as u64
            );
            return;
        }

        tracing::info!(
            phase = "chat",
            event = "turn_complete",
            session_id = %session_id,
            rounds = outcome.rounds(),
            stop_reason = outcome.stop_reason().map(StopReason::as_str),
            total_tokens = outcome.usage().total_tokens,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_turn_failure(
        &self,
        session_id: &SessionId,
        round: u32,
        error: &ChatError,
        elapsed: Duration,
    ) {
        tracing::error!(
            phase = "chat",
            event = "turn_failure",
            session_id = %session_id,
            round,
            error_kind = ?error.kind,
            elapsed_ms = elapsed.as_millis() as u64,
            error = %error
        );
    }
}
