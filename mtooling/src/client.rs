//! Tool provider client contract.
//!
//! ```rust
//! use mcommon::SessionId;
//! use mtooling::{ToolDescriptor, ToolError, ToolFuture, ToolProviderClient};
//! use serde_json::{Value, json};
//!
//! struct Echo;
//!
//! impl ToolProviderClient for Echo {
//!     fn initialize<'a>(&'a self) -> ToolFuture<'a, Result<SessionId, ToolError>> {
//!         Box::pin(async { Ok(SessionId::new("echo-session")) })
//!     }
//!
//!     fn list_tools<'a>(&'a self) -> ToolFuture<'a, Result<Vec<ToolDescriptor>, ToolError>> {
//!         Box::pin(async { Ok(vec![ToolDescriptor::new("echo", "Echoes input", json!({}))]) })
//!     }
//!
//!     fn call_tool<'a>(
//!         &'a self,
//!         _name: &'a str,
//!         input: &'a Value,
//!     ) -> ToolFuture<'a, Result<Value, ToolError>> {
//!         Box::pin(async move { Ok(input.clone()) })
//!     }
//!
//!     fn close<'a>(&'a self) -> ToolFuture<'a, Result<bool, ToolError>> {
//!         Box::pin(async { Ok(true) })
//!     }
//! }
//!
//! fn assert_client(_client: &dyn ToolProviderClient) {}
//! assert_client(&Echo);
//! ```

use mcommon::{BoxFuture, SessionId};
use serde_json::Value;

use crate::{ToolDescriptor, ToolError};

pub type ToolFuture<'a, T> = BoxFuture<'a, T>;

/// Session-scoped connection to an external tool provider.
///
/// Tool names passed to [`call_tool`](Self::call_tool) use the provider's
/// naming convention. Methods take `&self` so one client can be shared between
/// the catalog loader and the dispatcher.
pub trait ToolProviderClient: Send + Sync {
    /// Establishes a session; sessionless providers return an empty id.
    fn initialize<'a>(&'a self) -> ToolFuture<'a, Result<SessionId, ToolError>>;

    fn list_tools<'a>(&'a self) -> ToolFuture<'a, Result<Vec<ToolDescriptor>, ToolError>>;

    fn call_tool<'a>(
        &'a self,
        name: &'a str,
        input: &'a Value,
    ) -> ToolFuture<'a, Result<Value, ToolError>>;

    /// Releases the session. `Ok(false)` means there was nothing to release or
    /// the provider declined.
    fn close<'a>(&'a self) -> ToolFuture<'a, Result<bool, ToolError>>;
}
