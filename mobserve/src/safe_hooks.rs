use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use mchat::{ChatError, ChatRuntimeHooks, LoopOutcome};
use mcommon::SessionId;
use mprovider::{
    ProviderError, ProviderId, ProviderOperationHooks, StopReason, TokenUsage, ToolResult, ToolUse,
};
use mtooling::{ToolError, ToolExecutionContext, ToolRuntimeHooks};

pub struct SafeProviderHooks<H> {
    inner: H,
}

impl<H> SafeProviderHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ProviderOperationHooks for SafeProviderHooks<H>
where
    H: ProviderOperationHooks,
{
    fn on_attempt_start(&self, provider: ProviderId, operation: &str, attempt: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_attempt_start(provider, operation, attempt)
        }));
    }

    fn on_retry_scheduled(
        &self,
        provider: ProviderId,
        operation: &str,
        attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_retry_scheduled(provider, operation, attempt, delay, error)
        }));
    }

    fn on_success(&self, provider: ProviderId, operation: &str, attempts: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_success(provider, operation, attempts)
        }));
    }

    fn on_failure(
        &self,
        provider: ProviderId,
        operation: &str,
        attempts: u32,
        error: &ProviderError,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_failure(provider, operation, attempts, error)
        }));
    }
}

pub struct SafeToolHooks<H> {
    inner: H,
}

impl<H> SafeToolHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ToolRuntimeHooks for SafeToolHooks<H>
where
    H: ToolRuntimeHooks,
{
    fn on_execution_start(
        &self,
        tool_use: &ToolUse,
        provider_name: &str,
        context: &ToolExecutionContext,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_execution_start(tool_use, provider_name, context)
        }));
    }

    fn on_execution_success(
        &self,
        tool_use: &ToolUse,
        context: &ToolExecutionContext,
        result: &ToolResult,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_execution_success(tool_use, context, result, elapsed)
        }));
    }

    fn on_execution_failure(
        &self,
        tool_use: &ToolUse,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_execution_failure(tool_use, context, error, elapsed)
        }));
    }
}

pub struct SafeChatHooks<H> {
    inner: H,
}

impl<H> SafeChatHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ChatRuntimeHooks for SafeChatHooks<H>
where
    H: ChatRuntimeHooks,
{
    fn on_round_start(&self, session_id: &SessionId, round: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_round_start(session_id, round)
        }));
    }

    fn on_round_complete(
        &self,
        session_id: &SessionId,
        round: u32,
        stop_reason: &StopReason,
        usage: TokenUsage,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_round_complete(session_id, round, stop_reason, usage, elapsed)
        }));
    }

    fn on_turn_complete(&self, session_id: &SessionId, outcome: &LoopOutcome, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_complete(session_id, outcome, elapsed)
        }));
    }

    fn on_turn_failure(
        &self,
        session_id: &SessionId,
        round: u32,
        error: &ChatError,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_turn_failure(session_id, round, error, elapsed)
        }));
    }
}
