//! Session facade: one tool-provider session, one transcript, one loop.

use std::sync::Arc;

use mcommon::SessionId;
use mprovider::{Message, ModelProvider};
use mtooling::{
    NoopToolRuntimeHooks, ToolCatalog, ToolDispatcher, ToolProviderClient, ToolRuntimeHooks,
};

use crate::{
    Answer, ChatError, ChatErrorPhase, ChatPolicy, ChatRuntimeHooks, LoopOutcome,
    NoopChatRuntimeHooks, ToolLoop, Transcript,
};

pub struct McpSessionBuilder {
    provider: Arc<dyn ModelProvider>,
    client: Arc<dyn ToolProviderClient>,
    model_id: String,
    policy: ChatPolicy,
    hooks: Arc<dyn ChatRuntimeHooks>,
    tool_hooks: Arc<dyn ToolRuntimeHooks>,
}

impl McpSessionBuilder {
    pub fn new(provider: Arc<dyn ModelProvider>, client: Arc<dyn ToolProviderClient>) -> Self {
        Self {
            provider,
            client,
            model_id: String::new(),
            policy: ChatPolicy::default(),
            hooks: Arc::new(NoopChatRuntimeHooks),
            tool_hooks: Arc::new(NoopToolRuntimeHooks),
        }
    }

    pub fn model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    pub fn policy(mut self, policy: ChatPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn max_rounds(mut self, max_rounds: u32) -> Self {
        self.policy = self.policy.with_max_rounds(max_rounds);
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn ChatRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn tool_hooks(mut self, tool_hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.tool_hooks = tool_hooks;
        self
    }

    pub fn build(self) -> Result<McpSession, ChatError> {
        if self.model_id.trim().is_empty() {
            return Err(ChatError::invalid_request("model id is required to build a session"));
        }

        let dispatcher = ToolDispatcher::new(self.client.clone()).with_hooks(self.tool_hooks);
        let tool_loop = ToolLoop::new(self.provider, dispatcher, self.model_id)
            .with_policy(self.policy)
            .with_hooks(self.hooks);

        Ok(McpSession {
            client: self.client,
            tool_loop,
            transcript: Transcript::new(),
            catalog: None,
            session_id: None,
        })
    }
}

/// A conversation against one model and one MCP tool provider.
///
/// The catalog is loaded lazily on the first request unless [`McpSession::initialize`]
/// was called explicitly. The transcript outlives [`McpSession::close`].
pub struct McpSession {
    client: Arc<dyn ToolProviderClient>,
    tool_loop: ToolLoop,
    transcript: Transcript,
    catalog: Option<ToolCatalog>,
    session_id: Option<SessionId>,
}

impl std::fmt::Debug for McpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpSession")
            .field("tool_loop", &self.tool_loop)
            .field("turns", &self.transcript.len())
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}

impl McpSession {
    pub fn builder(
        provider: Arc<dyn ModelProvider>,
        client: Arc<dyn ToolProviderClient>,
    ) -> McpSessionBuilder {
        McpSessionBuilder::new(provider, client)
    }

    /// Opens the tool-provider session and (re)loads the tool catalog.
    pub async fn initialize(&mut self) -> Result<SessionId, ChatError> {
        let session_id = self
            .client
            .initialize()
            .await
            .map_err(|error| ChatError::from(error).with_phase(ChatErrorPhase::Initialize))?;
        let tools = self
            .client
            .list_tools()
            .await
            .map_err(|error| ChatError::from(error).with_phase(ChatErrorPhase::Initialize))?;

        self.catalog = Some(ToolCatalog::new(tools));
        self.session_id = Some(session_id.clone());
        Ok(session_id)
    }

    pub async fn answer(&mut self, input: &str, system: Option<&str>) -> Result<Answer, ChatError> {
        self.invoke_with_tools(input, system)
            .await
            .map(LoopOutcome::into_answer)
    }

    pub async fn invoke_with_tools(
        &mut self,
        input: &str,
        system: Option<&str>,
    ) -> Result<LoopOutcome, ChatError> {
        if input.trim().is_empty() {
            return Err(ChatError::invalid_request("user input must not be empty"));
        }

        if self.catalog.is_none() {
            self.initialize().await?;
        }

        self.transcript.push(Message::user_text(input));

        let session_id = self.session_id.clone().unwrap_or_default();
        let tool_config = self.catalog.as_ref().and_then(ToolCatalog::tool_config);
        self.tool_loop
            .run(&mut self.transcript, tool_config, system, &session_id)
            .await
    }

    /// Releases the tool-provider session. Returns whether the provider accepted it.
    pub async fn close(&mut self) -> Result<bool, ChatError> {
        let closed = self
            .client
            .close()
            .await
            .map_err(|error| ChatError::from(error).with_phase(ChatErrorPhase::Close))?;

        self.catalog = None;
        self.session_id = None;
        Ok(closed)
    }

    /// Answers one request and closes the session on every path.
    ///
    /// An answer error is returned in preference to a close error.
    pub async fn answer_once(
        mut self,
        input: &str,
        system: Option<&str>,
    ) -> Result<Answer, ChatError> {
        let answer = self.answer(input, system).await;
        let closed = self.close().await;

        let answer = answer?;
        closed?;
        Ok(answer)
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn catalog(&self) -> Option<&ToolCatalog> {
        self.catalog.as_ref()
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    pub fn policy(&self) -> &ChatPolicy {
        self.tool_loop.policy()
    }
}
