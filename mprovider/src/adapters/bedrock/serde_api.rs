//! Converse HTTP payload serde models and conversion helpers.
//!
//! Request payloads borrow from the caller's transcript; response payloads are owned.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    ContentBlock, Message, ModelRequest, ModelResponse, ProviderError, ProviderId, Role,
    StopReason, TokenUsage, ToolChoice, ToolConfig, ToolUse,
};

pub(crate) fn build_api_request<'a>(
    request: &'a ModelRequest<'a>,
) -> Result<ConverseApiRequest<'a>, ProviderError> {
    let messages = request
        .messages
        .iter()
        .map(ApiMessage::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    if messages.is_empty() {
        return Err(ProviderError::invalid_request(
            "Converse request requires at least one message",
        ));
    }

    let system = request
        .system
        .filter(|text| !text.trim().is_empty())
        .map(|text| vec![ApiSystemBlock { text }])
        .unwrap_or_default();

    let options = request.options;
    let inference_config = if options.is_empty() {
        None
    } else {
        Some(ApiInferenceConfig {
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            top_p: options.top_p,
        })
    };

    Ok(ConverseApiRequest {
        messages,
        system,
        tool_config: request.tool_config.map(ApiToolConfig::from),
        inference_config,
    })
}

pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<ConverseApiError>(body).ok()?;
    Some(parsed.message)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConverseApiError {
    #[serde(alias = "Message")]
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverseApiRequest<'a> {
    pub messages: Vec<ApiMessage<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub system: Vec<ApiSystemBlock<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_config: Option<ApiToolConfig<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inference_config: Option<ApiInferenceConfig>,
}

#[derive(Debug, Serialize)]
pub struct ApiSystemBlock<'a> {
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ApiMessage<'a> {
    pub role: &'static str,
    pub content: Vec<ApiContentBlock<'a>>,
}

impl<'a> TryFrom<&'a Message> for ApiMessage<'a> {
    type Error = ProviderError;

    fn try_from(value: &'a Message) -> Result<Self, Self::Error> {
        if value.content.is_empty() {
            return Err(ProviderError::invalid_request(
                "Converse message content must not be empty",
            ));
        }

        Ok(Self {
            role: value.role.as_str(),
            content: value.content.iter().map(ApiContentBlock::from).collect(),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ApiContentBlock<'a> {
    Text(&'a str),
    ToolUse(ApiToolUse<'a>),
    ToolResult(ApiToolResult<'a>),
}

impl<'a> From<&'a ContentBlock> for ApiContentBlock<'a> {
    fn from(value: &'a ContentBlock) -> Self {
        match value {
            ContentBlock::Text(text) => Self::Text(text),
            ContentBlock::ToolUse(tool_use) => Self::ToolUse(ApiToolUse {
                tool_use_id: &tool_use.id,
                name: &tool_use.name,
                input: &tool_use.input,
            }),
            ContentBlock::ToolResult(result) => Self::ToolResult(ApiToolResult {
                tool_use_id: &result.tool_use_id,
                content: vec![ApiToolResultContent {
                    text: &result.content,
                }],
                status: result.status.as_str(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiToolUse<'a> {
    pub tool_use_id: &'a str,
    pub name: &'a str,
    pub input: &'a Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiToolResult<'a> {
    pub tool_use_id: &'a str,
    pub content: Vec<ApiToolResultContent<'a>>,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ApiToolResultContent<'a> {
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiToolConfig<'a> {
    pub tools: Vec<ApiTool<'a>>,
    pub tool_choice: ApiToolChoice<'a>,
}

impl<'a> From<&'a ToolConfig> for ApiToolConfig<'a> {
    fn from(value: &'a ToolConfig) -> Self {
        let tools = value
            .tools
            .iter()
            .map(|tool| ApiTool {
                tool_spec: ApiToolSpec {
                    name: &tool.name,
                    description: Some(tool.description.as_str())
                        .filter(|description| !description.trim().is_empty()),
                    input_schema: ApiInputSchema {
                        json: &tool.input_schema,
                    },
                },
            })
            .collect();

        let tool_choice = match &value.tool_choice {
            ToolChoice::Auto => ApiToolChoice::Auto(ApiEmpty {}),
            ToolChoice::Any => ApiToolChoice::Any(ApiEmpty {}),
            ToolChoice::Tool(name) => ApiToolChoice::Tool(ApiNamedTool { name }),
        };

        Self { tools, tool_choice }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTool<'a> {
    pub tool_spec: ApiToolSpec<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiToolSpec<'a> {
    pub name: &'a str,
    /// Converse rejects an empty description, so blank ones are left out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub input_schema: ApiInputSchema<'a>,
}

#[derive(Debug, Serialize)]
pub struct ApiInputSchema<'a> {
    pub json: &'a Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ApiToolChoice<'a> {
    Auto(ApiEmpty),
    Any(ApiEmpty),
    Tool(ApiNamedTool<'a>),
}

#[derive(Debug, Serialize)]
pub struct ApiEmpty {}

#[derive(Debug, Serialize)]
pub struct ApiNamedTool<'a> {
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiInferenceConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverseApiResponse {
    #[serde(default)]
    pub output: ApiOutput,
    pub stop_reason: String,
    #[serde(default)]
    pub usage: ApiUsage,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiOutput {
    pub message: Option<ApiResponseMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ApiResponseMessage {
    pub role: String,
    #[serde(default)]
    pub content: Vec<ApiResponseBlock>,
}

/// Response blocks are matched by key; anything other than text or tool use
/// (reasoning, images, citations) is dropped during conversion.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponseBlock {
    pub text: Option<String>,
    pub tool_use: Option<ApiResponseToolUse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponseToolUse {
    pub tool_use_id: String,
    pub name: String,
    #[serde(default)]
    pub input: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiUsage {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl ConverseApiResponse {
    pub(crate) fn into_model_response(
        self,
        model: impl Into<String>,
    ) -> Result<ModelResponse, ProviderError> {
        let message = match self.output.message {
            Some(message) => {
                let role = match message.role.as_str() {
                    "assistant" => Role::Assistant,
                    "user" => Role::User,
                    other => {
                        return Err(ProviderError::transport(format!(
                            "Converse response used unknown role '{other}'"
                        )));
                    }
                };

                let content = message
                    .content
                    .into_iter()
                    .filter_map(|block| match (block.text, block.tool_use) {
                        (Some(text), _) => Some(ContentBlock::Text(text)),
                        (None, Some(tool_use)) => Some(ContentBlock::ToolUse(ToolUse::new(
                            tool_use.tool_use_id,
                            tool_use.name,
                            tool_use.input,
                        ))),
                        (None, None) => None,
                    })
                    .collect();

                Message::new(role, content)
            }
            None => Message::new(Role::Assistant, Vec::new()),
        };

        Ok(ModelResponse {
            provider: ProviderId::Bedrock,
            model: model.into(),
            message,
            stop_reason: StopReason::parse(&self.stop_reason),
            usage: TokenUsage {
                input_tokens: self.usage.input_tokens,
                output_tokens: self.usage.output_tokens,
                total_tokens: self.usage.total_tokens,
            },
        })
    }
}
