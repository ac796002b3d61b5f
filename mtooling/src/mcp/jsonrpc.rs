//! JSON-RPC 2.0 envelopes and MCP result payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ToolDescriptor, ToolError};

pub(crate) const JSONRPC_VERSION: &str = "2.0";

const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

#[derive(Debug, Serialize)]
pub(crate) struct JsonRpcRequest<'a> {
    pub jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl<'a> JsonRpcRequest<'a> {
    pub fn call(id: u64, method: &'a str, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id: Some(id),
            method,
            params: Some(params),
        }
    }

    pub fn notification(method: &'a str) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id: None,
            method,
            params: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct JsonRpcResponse {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcErrorObject>,
}

impl JsonRpcResponse {
    fn answers(&self, id: u64) -> bool {
        self.id.as_ref().and_then(Value::as_u64) == Some(id)
    }

    pub fn into_result(self) -> Result<Value, ToolError> {
        if let Some(error) = self.error {
            return Err(error.into());
        }

        self.result
            .ok_or_else(|| ToolError::protocol("JSON-RPC response has neither result nor error"))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
}

impl From<JsonRpcErrorObject> for ToolError {
    fn from(value: JsonRpcErrorObject) -> Self {
        let message = format!("{} (code {})", value.message, value.code);
        match value.code {
            METHOD_NOT_FOUND => ToolError::not_found(message),
            INVALID_PARAMS => ToolError::invalid_arguments(message),
            _ => ToolError::execution(message),
        }
    }
}

/// Picks the response for request `id` out of an HTTP body, which is either a
/// single JSON object or an event stream that may interleave server
/// notifications with the response.
pub(crate) fn parse_response_body(
    body: &str,
    event_stream: bool,
    id: u64,
) -> Result<JsonRpcResponse, ToolError> {
    if !event_stream {
        let response: JsonRpcResponse = serde_json::from_str(body)
            .map_err(|err| ToolError::protocol(format!("invalid JSON-RPC response: {err}")))?;
        if response.id.is_some() && !response.answers(id) {
            return Err(ToolError::protocol(format!(
                "JSON-RPC response id does not match request {id}"
            )));
        }
        return Ok(response);
    }

    sse_data_payloads(body)
        .iter()
        .filter_map(|payload| serde_json::from_str::<JsonRpcResponse>(payload).ok())
        .find(|response| response.answers(id))
        .ok_or_else(|| {
            ToolError::protocol(format!("event stream carried no response for request {id}"))
        })
}

/// Splits an SSE body into the `data` payload of each event. Multi-line data
/// is joined with `\n`; other fields are ignored.
pub(crate) fn sse_data_payloads(body: &str) -> Vec<String> {
    let mut payloads = Vec::new();
    let mut current = String::new();

    for line in body.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            if !current.is_empty() {
                payloads.push(std::mem::take(&mut current));
            }
            continue;
        }

        if let Some(data) = line.strip_prefix("data:") {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(data.strip_prefix(' ').unwrap_or(data));
        }
    }

    if !current.is_empty() {
        payloads.push(current);
    }

    payloads
}

pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorEnvelope {
        error: JsonRpcErrorObject,
    }

    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error.message)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListToolsResult {
    #[serde(default)]
    pub tools: Vec<ApiTool>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiTool {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub input_schema: Value,
}

impl From<ApiTool> for ToolDescriptor {
    fn from(value: ApiTool) -> Self {
        ToolDescriptor::new(
            value.name,
            value.description.unwrap_or_default(),
            value.input_schema,
        )
    }
}

/// Returns the provider's error text when a `tools/call` result is flagged
/// with `isError`.
pub(crate) fn tool_call_error(result: &Value) -> Option<String> {
    if result.get("isError").and_then(Value::as_bool) != Some(true) {
        return None;
    }

    let text = result
        .get("content")
        .and_then(Value::as_array)
        .map(|blocks| {
            blocks
                .iter()
                .filter_map(|block| block.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default();

    if text.is_empty() {
        Some("tool reported an error".to_string())
    } else {
        Some(text)
    }
}
