mod provider;
mod serde_api;
mod tests;
mod transport;
mod types;

pub use provider::BedrockProvider;
pub use serde_api::{ConverseApiRequest, ConverseApiResponse};
pub use transport::{BedrockHttpTransport, ConverseTransport, bedrock_runtime_endpoint};
pub use types::{BedrockAuth, DEFAULT_BEDROCK_MODEL_ID, DEFAULT_BEDROCK_REGION};
