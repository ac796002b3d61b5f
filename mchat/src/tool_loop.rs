//! Bounded model/tool orchestration over a borrowed transcript.

use std::sync::Arc;
use std::time::Instant;

use mcommon::SessionId;
use mprovider::{
    Message, ModelProvider, ModelRequest, StopReason, TokenUsage, ToolConfig, ToolUse,
};
use mtooling::{ToolDispatcher, ToolExecutionContext};

use crate::{ChatError, ChatPolicy, ChatRuntimeHooks, LoopOutcome, NoopChatRuntimeHooks, Transcript};

/// Drives model calls until a final stop reason or until the round budget is spent.
///
/// One round is one model call plus whatever follows it: dispatching every tool
/// use of that response or appending the continuation prompt.
#[derive(Clone)]
pub struct ToolLoop {
    provider: Arc<dyn ModelProvider>,
    dispatcher: ToolDispatcher,
    hooks: Arc<dyn ChatRuntimeHooks>,
    policy: ChatPolicy,
    model_id: String,
}

impl std::fmt::Debug for ToolLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolLoop")
            .field("provider", &self.provider.id())
            .field("policy", &self.policy)
            .field("model_id", &self.model_id)
            .finish_non_exhaustive()
    }
}

impl ToolLoop {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        dispatcher: ToolDispatcher,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            dispatcher,
            hooks: Arc::new(NoopChatRuntimeHooks),
            policy: ChatPolicy::default(),
            model_id: model_id.into(),
        }
    }

    pub fn with_policy(mut self, policy: ChatPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ChatRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn policy(&self) -> &ChatPolicy {
        &self.policy
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }

    /// Runs rounds against `transcript`, which must already end with the user turn.
    ///
    /// Every response turn with content, every tool-result turn, and every
    /// continuation prompt is appended to `transcript`, including on error.
    pub async fn run(
        &self,
        transcript: &mut Transcript,
        tool_config: Option<&ToolConfig>,
        system: Option<&str>,
        session_id: &SessionId,
    ) -> Result<LoopOutcome, ChatError> {
        let started = Instant::now();
        let mut round = 0;
        let result = self
            .run_rounds(transcript, tool_config, system, session_id, &mut round)
            .await;

        match &result {
            Ok(outcome) => self
                .hooks
                .on_turn_complete(session_id, outcome, started.elapsed()),
            Err(error) => self
                .hooks
                .on_turn_failure(session_id, round, error, started.elapsed()),
        }

        result
    }

    async fn run_rounds(
        &self,
        transcript: &mut Transcript,
        tool_config: Option<&ToolConfig>,
        system: Option<&str>,
        session_id: &SessionId,
        round: &mut u32,
    ) -> Result<LoopOutcome, ChatError> {
        let max_rounds = self.policy.max_rounds();
        let mut usage = TokenUsage::default();

        while *round < max_rounds {
            *round += 1;
            self.hooks.on_round_start(session_id, *round);
            let round_started = Instant::now();

            let request = ModelRequest::new(self.model_id.clone(), transcript.messages())
                .with_tool_config(tool_config)
                .with_system(system)
                .with_options(self.policy.options);
            let response = self.provider.converse(request).await?;

            usage.accumulate(response.usage);
            self.hooks.on_round_complete(
                session_id,
                *round,
                &response.stop_reason,
                response.usage,
                round_started.elapsed(),
            );

            if !response.message.is_empty() {
                transcript.push(response.message.clone());
            }

            match &response.stop_reason {
                StopReason::ToolUse => {
                    let calls: Vec<ToolUse> = response.message.tool_uses().cloned().collect();
                    if !calls.is_empty() {
                        let context = ToolExecutionContext::new(session_id.clone())
                            .with_trace_id(format!("{session_id}:{round}"));
                        let results = self.dispatcher.dispatch(&calls, &context).await;
                        transcript.push(Message::tool_results(results));
                    }
                }
                StopReason::EndTurn | StopReason::StopSequence => {
                    return Ok(LoopOutcome::Completed {
                        response,
                        rounds: *round,
                        usage,
                    });
                }
                StopReason::MaxTokens => {
                    transcript.push(Message::user_text(self.policy.continuation_prompt.clone()));
                }
                StopReason::Other(raw) => {
                    return Err(ChatError::unrecognized_stop_reason(raw));
                }
            }
        }

        Ok(LoopOutcome::Exhausted {
            rounds: *round,
            usage,
        })
    }
}
