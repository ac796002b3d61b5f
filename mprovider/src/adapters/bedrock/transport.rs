//! Converse transport trait and reqwest-based HTTP implementation.

use reqwest::{Client, Response, StatusCode};

use crate::{ProviderError, ProviderFuture};

use super::serde_api::{ConverseApiRequest, ConverseApiResponse, extract_error_message};
use super::types::BedrockAuth;

const ERROR_TYPE_HEADER: &str = "x-amzn-errortype";

pub trait ConverseTransport: Send + Sync + std::fmt::Debug {
    fn converse<'a>(
        &'a self,
        model_id: &'a str,
        request: &'a ConverseApiRequest<'a>,
        auth: &'a BedrockAuth,
    ) -> ProviderFuture<'a, Result<ConverseApiResponse, ProviderError>>;
}

pub fn bedrock_runtime_endpoint(region: &str) -> String {
    format!("https://bedrock-runtime.{}.amazonaws.com", region.trim())
}

#[derive(Debug, Clone)]
pub struct BedrockHttpTransport {
    client: Client,
    endpoint: String,
}

impl BedrockHttpTransport {
    pub fn new(client: Client, region: &str) -> Self {
        Self {
            client,
            endpoint: bedrock_runtime_endpoint(region),
        }
    }

    /// Overrides the regional endpoint, e.g. for a VPC endpoint or a local stub.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn converse_url(&self, model_id: &str) -> String {
        format!(
            "{}/model/{}/converse",
            self.endpoint.trim_end_matches('/'),
            urlencoding::encode(model_id)
        )
    }

    fn apply_auth(
        &self,
        builder: reqwest::RequestBuilder,
        auth: &BedrockAuth,
    ) -> reqwest::RequestBuilder {
        match auth {
            BedrockAuth::ApiKey(key) => builder.bearer_auth(key.expose()),
        }
    }

    async fn parse_error(response: Response) -> ProviderError {
        let status = response.status();
        let error_type = response
            .headers()
            .get(ERROR_TYPE_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(':').next())
            .map(str::to_string);
        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body)
            .unwrap_or_else(|| format!("Converse request failed with status {status}"));

        classify_converse_error(status, error_type.as_deref(), message)
    }
}

/// Maps a failed Converse response to a provider error. The Bedrock exception
/// name wins over the status code when the service sent one.
pub(super) fn classify_converse_error(
    status: StatusCode,
    error_type: Option<&str>,
    message: String,
) -> ProviderError {
    let error = match error_type {
        Some("ThrottlingException" | "ModelNotReadyException") => {
            ProviderError::rate_limited(message)
        }
        Some("ServiceUnavailableException" | "InternalServerException") => {
            ProviderError::unavailable(message)
        }
        Some("ModelTimeoutException") => ProviderError::timeout(message),
        Some("AccessDeniedException" | "UnrecognizedClientException") => {
            ProviderError::authentication(message)
        }
        Some(
            "ValidationException" | "ResourceNotFoundException" | "ServiceQuotaExceededException",
        ) => ProviderError::invalid_request(message),
        Some("ModelErrorException") => ProviderError::other(message),
        _ => match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ProviderError::authentication(message)
            }
            StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited(message),
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                ProviderError::timeout(message)
            }
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => {
                ProviderError::invalid_request(message)
            }
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
                ProviderError::unavailable(message)
            }
            _ => ProviderError::transport(message),
        },
    };

    error.with_status(status.as_u16())
}

impl ConverseTransport for BedrockHttpTransport {
    fn converse<'a>(
        &'a self,
        model_id: &'a str,
        request: &'a ConverseApiRequest<'a>,
        auth: &'a BedrockAuth,
    ) -> ProviderFuture<'a, Result<ConverseApiResponse, ProviderError>> {
        Box::pin(async move {
            let builder = self.client.post(self.converse_url(model_id)).json(request);
            let response = self.apply_auth(builder, auth).send().await.map_err(|err| {
                if err.is_timeout() {
                    ProviderError::timeout(err.to_string())
                } else {
                    ProviderError::transport(err.to_string())
                }
            })?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            // The converse call already ran; a retry would repeat it.
            response.json::<ConverseApiResponse>().await.map_err(|err| {
                ProviderError::invalid_response(format!("undecodable Converse response: {err}"))
            })
        })
    }
}
