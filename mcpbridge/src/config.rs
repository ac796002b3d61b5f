//! Bridge settings and environment loading.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use mcpbridge::BridgeConfig;
//!
//! let config = BridgeConfig::new("http://localhost:8080/mcp", "bedrock-key")
//!     .with_region("eu-west-1")
//!     .with_timeout(Duration::from_secs(30))
//!     .with_max_rounds(3);
//!
//! assert_eq!(config.region, "eu-west-1");
//! assert!(config.validate().is_ok());
//! ```

use std::time::Duration;

use mchat::DEFAULT_MAX_ROUNDS;
use mprovider::SecretString;
use mprovider::adapters::bedrock::{DEFAULT_BEDROCK_MODEL_ID, DEFAULT_BEDROCK_REGION};

use crate::BridgeError;

pub const ENV_MCP_URL: &str = "MCP_URL";
pub const ENV_MCP_AUTH_TOKEN: &str = "MCP_AUTH_TOKEN";
pub const ENV_MCP_SESSION_ID: &str = "MCP_SESSION_ID";
pub const ENV_AWS_REGION: &str = "AWS_REGION";
pub const ENV_AWS_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";
pub const ENV_BEDROCK_MODEL_ID: &str = "BEDROCK_MODEL_ID";
pub const ENV_BEDROCK_API_KEY: &str = "AWS_BEARER_TOKEN_BEDROCK";
pub const ENV_BEDROCK_ENDPOINT: &str = "BEDROCK_ENDPOINT";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub mcp_url: String,
    pub mcp_auth_token: Option<SecretString>,
    pub mcp_session_id: Option<String>,
    pub region: String,
    pub model_id: String,
    pub bedrock_api_key: SecretString,
    /// Overrides the regional Bedrock runtime endpoint.
    pub endpoint: Option<String>,
    pub timeout: Duration,
    pub max_rounds: u32,
}

impl BridgeConfig {
    pub fn new(mcp_url: impl Into<String>, bedrock_api_key: impl Into<String>) -> Self {
        Self {
            mcp_url: mcp_url.into(),
            mcp_auth_token: None,
            mcp_session_id: None,
            region: DEFAULT_BEDROCK_REGION.to_string(),
            model_id: DEFAULT_BEDROCK_MODEL_ID.to_string(),
            bedrock_api_key: SecretString::new(bedrock_api_key),
            endpoint: None,
            timeout: DEFAULT_TIMEOUT,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    pub fn from_env() -> Result<Self, BridgeError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`BridgeConfig::from_env`] but reads values through `lookup`.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BridgeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mcp_url = read(ENV_MCP_URL)
            .ok_or_else(|| BridgeError::config(format!("{ENV_MCP_URL} is not set")))?;
        let api_key = read(ENV_BEDROCK_API_KEY)
            .ok_or_else(|| BridgeError::config(format!("{ENV_BEDROCK_API_KEY} is not set")))?;

        let mut config = Self::new(mcp_url, api_key);
        if let Some(token) = read(ENV_MCP_AUTH_TOKEN) {
            config = config.with_mcp_auth_token(token);
        }
        if let Some(session_id) = read(ENV_MCP_SESSION_ID) {
            config = config.with_mcp_session_id(session_id);
        }
        if let Some(region) = read(ENV_AWS_REGION).or_else(|| read(ENV_AWS_DEFAULT_REGION)) {
            config = config.with_region(region);
        }
        if let Some(model_id) = read(ENV_BEDROCK_MODEL_ID) {
            config = config.with_model_id(model_id);
        }
        if let Some(endpoint) = read(ENV_BEDROCK_ENDPOINT) {
            config = config.with_endpoint(endpoint);
        }

        Ok(config)
    }

    pub fn with_mcp_auth_token(mut self, token: impl Into<String>) -> Self {
        self.mcp_auth_token = Some(SecretString::new(token));
        self
    }

    pub fn with_mcp_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.mcp_session_id = Some(session_id.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.mcp_url.trim().is_empty() {
            return Err(BridgeError::config("MCP server URL must not be empty"));
        }
        if self.bedrock_api_key.is_empty() {
            return Err(BridgeError::config("Bedrock API key must not be empty"));
        }
        if self.model_id.trim().is_empty() {
            return Err(BridgeError::config("model id must not be empty"));
        }
        if self.region.trim().is_empty() && self.endpoint.is_none() {
            return Err(BridgeError::config(
                "either a region or an explicit Bedrock endpoint is required",
            ));
        }
        if self.timeout.is_zero() {
            return Err(BridgeError::config("timeout must be greater than zero"));
        }

        Ok(())
    }
}
