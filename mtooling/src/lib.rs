//! Tool provider layer: catalog, name mapping, dispatch, and the MCP client.

mod catalog;
mod client;
mod dispatch;
mod error;
mod hooks;
mod types;

#[cfg(feature = "mcp-http")]
pub mod mcp;
pub mod naming;

pub mod prelude {
    pub use crate::{
        NoopToolRuntimeHooks, ToolCatalog, ToolDescriptor, ToolDispatcher, ToolError,
        ToolErrorKind, ToolExecutionContext, ToolFuture, ToolProviderClient, ToolRuntimeHooks,
    };
}

pub use catalog::{ToolCatalog, to_model_spec};
pub use client::{ToolFuture, ToolProviderClient};
pub use dispatch::{TOOL_ERROR_PREFIX, ToolDispatcher};
pub use error::{ToolError, ToolErrorKind};
pub use hooks::{NoopToolRuntimeHooks, ToolRuntimeHooks};
pub use types::{ToolDescriptor, ToolExecutionContext};
