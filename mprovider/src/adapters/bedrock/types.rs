//! Bedrock adapter constants and authentication types.

use std::fmt::Formatter;

use crate::{ProviderError, ProviderId, SecretString, SecureCredentialManager};

pub const DEFAULT_BEDROCK_MODEL_ID: &str = "anthropic.claude-3-haiku-20240307-v1:0";
pub const DEFAULT_BEDROCK_REGION: &str = "us-east-1";

#[derive(Clone, PartialEq, Eq)]
pub enum BedrockAuth {
    ApiKey(SecretString),
}

impl std::fmt::Debug for BedrockAuth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("BedrockAuth::ApiKey([REDACTED])"),
        }
    }
}

impl SecureCredentialManager {
    pub fn set_bedrock_api_key(&self, api_key: impl Into<String>) -> Result<(), ProviderError> {
        self.set_api_key(ProviderId::Bedrock, api_key)
    }
}

pub(crate) fn resolve_bedrock_auth(
    credentials: &SecureCredentialManager,
) -> Result<BedrockAuth, ProviderError> {
    credentials
        .with_api_key(ProviderId::Bedrock, |value| {
            BedrockAuth::ApiKey(SecretString::new(value))
        })?
        .ok_or_else(|| ProviderError::authentication("no Bedrock credentials configured"))
}
