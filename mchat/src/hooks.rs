//! Lifecycle hooks for orchestration rounds and whole turns.
//!
//! ```rust
//! use mchat::{ChatRuntimeHooks, NoopChatRuntimeHooks};
//!
//! fn accepts_chat_hooks(_hooks: &dyn ChatRuntimeHooks) {}
//!
//! accepts_chat_hooks(&NoopChatRuntimeHooks);
//! ```

use std::time::Duration;

use mcommon::SessionId;
use mprovider::{StopReason, TokenUsage};

use crate::{ChatError, LoopOutcome};

pub trait ChatRuntimeHooks: Send + Sync {
    fn on_round_start(&self, _session_id: &SessionId, _round: u32) {}

    fn on_round_complete(
        &self,
        _session_id: &SessionId,
        _round: u32,
        _stop_reason: &StopReason,
        _usage: TokenUsage,
        _elapsed: Duration,
    ) {
    }

    fn on_turn_complete(&self, _session_id: &SessionId, _outcome: &LoopOutcome, _elapsed: Duration) {
    }

    fn on_turn_failure(
        &self,
        _session_id: &SessionId,
        _round: u32,
        _error: &ChatError,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopChatRuntimeHooks;

impl ChatRuntimeHooks for NoopChatRuntimeHooks {}
