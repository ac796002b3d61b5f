//! Metrics-based hooks for model calls, tool dispatch, and orchestration rounds.
//!
//! ```rust
//! use mobserve::MetricsObservabilityHooks;
//! use mprovider::ProviderOperationHooks;
//!
//! fn accepts_provider_hooks(_hooks: &dyn ProviderOperationHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_provider_hooks(&hooks);
//! ```

use std::time::Duration;

use mchat::{ChatError, ChatRuntimeHooks, LoopOutcome};
use mcommon::SessionId;
use mprovider::{
    ProviderError, ProviderId, ProviderOperationHooks, StopReason, TokenUsage, ToolResult, ToolUse,
};
use mtooling::{ToolError, ToolExecutionContext, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl ProviderOperationHooks for MetricsObservabilityHooks {
    fn on_attempt_start(&self, provider: ProviderId, operation: &str, _attempt: u32) {
        metrics::counter!(
            "mcpbridge_provider_attempt_start_total",
            "provider" => provider.to_string(),
            "operation" => operation.to_string()
        )
        .increment(1);
    }

    fn on_retry_scheduled(
        &self,
        provider: ProviderId,
        operation: &str,
        _attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        metrics::counter!(
            "mcpbridge_provider_retry_scheduled_total",
            "provider" => provider.to_string(),
            "operation" => operation.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "mcpbridge_provider_retry_delay_seconds",
            "provider" => provider.to_string(),
            "operation" => operation.to_string()
        )
        .record(delay.as_secs_f64());
    }

    fn on_success(&self, provider: ProviderId, operation: &str, attempts: u32) {
        metrics::counter!(
            "mcpbridge_provider_success_total",
            "provider" => provider.to_string(),
            "operation" => operation.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "mcpbridge_provider_attempts_per_success",
            "provider" => provider.to_string(),
            "operation" => operation.to_string()
        )
        .record(attempts as f64);
    }

    fn on_failure(
        &self,
        provider: ProviderId,
        operation: &str,
        attempts: u32,
        error: &ProviderError,
    ) {
        metrics::counter!(
            "mcpbridge_provider_failure_total",
            "provider" => provider.to_string(),
            "operation" => operation.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
    }
}

impl ToolRuntimeHooks for MetricsObservabilityHooks {
    fn on_execution_start(
        &self,
        _tool_use: &ToolUse,
        provider_name: &str,
        _context: &ToolExecutionContext,
    ) {
        metrics::counter!(
            "mcpbridge_tool_execution_start_total",
            "tool_name" => provider_name.to_string()
        )
        .increment(1);
    }

    fn on_execution_success(
        &self,
        tool_use: &ToolUse,
        _context: &ToolExecutionContext,
        _result: &ToolResult,
        elapsed: Duration,
    ) {
        metrics::histogram!(
            "mcpbridge_tool_execution_duration_seconds",
            "tool_name" => tool_use.name.clone(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_execution_failure(
        &self,
        tool_use: &ToolUse,
        _context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "mcpbridge_tool_execution_failure_total",
            "tool_name" => tool_use.name.clone(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "mcpbridge_tool_execution_duration_seconds",
            "tool_name" => tool_use.name.clone(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}

impl ChatRuntimeHooks for MetricsObservabilityHooks {
    fn on_round_complete(
        &self,
        _session_id: &SessionId,
        _round: u32,
        stop_reason: &StopReason,
        usage: TokenUsage,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "mcpbridge_chat_round_total",
            "stop_reason" => stop_reason.to_string()
        )
        .increment(1);
        metrics::counter!("mcpbridge_chat_input_tokens_total")
            .increment(u64::from(usage.input_tokens));
        metrics::counter!("mcpbridge_chat_output_tokens_total")
            .increment(u64::from(usage.output_tokens));
        metrics::histogram!("mcpbridge_chat_round_duration_seconds").record(elapsed.as_secs_f64());
    }

    fn on_turn_complete(&self, _session_id: &SessionId, outcome: &LoopOutcome, elapsed: Duration) {
        let status = if outcome.is_exhausted() {
            "exhausted"
        } else {
            "completed"
        };
        metrics::counter!("mcpbridge_chat_turn_total", "status" => status).increment(1);
        metrics::histogram!("mcpbridge_chat_rounds_per_turn", "status" => status)
            .record(f64::from(outcome.rounds()));
        metrics::histogram!("mcpbridge_chat_turn_duration_seconds", "status" => status)
            .record(elapsed.as_secs_f64());
    }

    fn on_turn_failure(
        &self,
        _session_id: &SessionId,
        _round: u32,
        error: &ChatError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "mcpbridge_chat_turn_total",
            "status" => "failure",
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!("mcpbridge_chat_turn_duration_seconds", "status" => "failure")
            .record(elapsed.as_secs_f64());
    }
}
