//! Model Context Protocol client over streamable HTTP (JSON-RPC 2.0).

mod client;
mod jsonrpc;

pub use client::{MCP_PROTOCOL_VERSION, MCP_SESSION_HEADER, McpHttpClient};
