//! Executes the tool calls of one model turn against the tool provider.

use std::sync::Arc;
use std::time::Instant;

use mprovider::{ToolResult, ToolUse};

use crate::naming::model_name_to_provider_name;
use crate::{
    NoopToolRuntimeHooks, ToolError, ToolExecutionContext, ToolProviderClient, ToolRuntimeHooks,
};

/// Prefix of the text reported back to the model when a call fails.
pub const TOOL_ERROR_PREFIX: &str = "tool execution error";

#[derive(Clone)]
pub struct ToolDispatcher {
    client: Arc<dyn ToolProviderClient>,
    hooks: Arc<dyn ToolRuntimeHooks>,
}

impl std::fmt::Debug for ToolDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDispatcher").finish_non_exhaustive()
    }
}

impl ToolDispatcher {
    pub fn new(client: Arc<dyn ToolProviderClient>) -> Self {
        Self {
            client,
            hooks: Arc::new(NoopToolRuntimeHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn client(&self) -> &Arc<dyn ToolProviderClient> {
        &self.client
    }

    /// Runs every call in order and returns one result per call, with matching
    /// ids in the same order. A failed call becomes an error result; it never
    /// stops the remaining calls.
    pub async fn dispatch(
        &self,
        calls: &[ToolUse],
        context: &ToolExecutionContext,
    ) -> Vec<ToolResult> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            results.push(self.dispatch_one(call, context).await);
        }
        results
    }

    async fn dispatch_one(&self, call: &ToolUse, context: &ToolExecutionContext) -> ToolResult {
        let provider_name = model_name_to_provider_name(&call.name);
        self.hooks.on_execution_start(call, &provider_name, context);

        let started = Instant::now();
        let outcome = self
            .client
            .call_tool(&provider_name, &call.input)
            .await
            .and_then(|value| {
                serde_json::to_string(&value).map_err(|err| {
                    ToolError::protocol(format!("tool output is not serializable: {err}"))
                })
            });
        let elapsed = started.elapsed();

        match outcome {
            Ok(content) => {
                let result = ToolResult::success(&call.id, content);
                self.hooks
                    .on_execution_success(call, context, &result, elapsed);
                result
            }
            Err(error) => {
                let error = error
                    .with_tool_name(provider_name)
                    .with_tool_use_id(&call.id);
                self.hooks
                    .on_execution_failure(call, context, &error, elapsed);
                ToolResult::error(&call.id, format!("{TOOL_ERROR_PREFIX}: {error}"))
            }
        }
    }
}
