//! Session tool catalog and descriptor-to-model-spec conversion.
//!
//! ```rust
//! use mtooling::{ToolCatalog, ToolDescriptor};
//! use serde_json::json;
//!
//! let catalog = ToolCatalog::new(vec![ToolDescriptor::new(
//!     "search-docs",
//!     "Search the documentation",
//!     json!({ "properties": { "query": { "type": "string" } } }),
//! )]);
//!
//! let config = catalog.tool_config().expect("one tool yields a config");
//! assert_eq!(config.tools[0].name, "search_docs");
//! assert_eq!(config.tools[0].input_schema["type"], "object");
//! assert!(ToolCatalog::default().tool_config().is_none());
//! ```

use mprovider::{ToolConfig, ToolSpec};
use serde_json::{Map, Value, json};

use crate::ToolDescriptor;
use crate::naming::provider_name_to_model_name;

/// Converts a provider descriptor into the model API's tool spec.
///
/// Only `type`, `properties` and `required` are forwarded, defaulting to
/// `"object"`, `{}` and `[]` when the provider leaves them out.
pub fn to_model_spec(descriptor: &ToolDescriptor) -> ToolSpec {
    let schema = descriptor.input_schema.as_object();
    let field = |key: &str, default: Value| {
        schema
            .and_then(|schema| schema.get(key))
            .cloned()
            .unwrap_or(default)
    };

    let mut input_schema = Map::new();
    input_schema.insert("type".to_string(), field("type", json!("object")));
    input_schema.insert("properties".to_string(), field("properties", json!({})));
    input_schema.insert("required".to_string(), field("required", json!([])));

    ToolSpec {
        name: provider_name_to_model_name(&descriptor.name),
        description: descriptor.description.clone(),
        input_schema: Value::Object(input_schema),
    }
}

/// Tools advertised by the provider for one session, with the model-facing
/// tool config built once up front.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolCatalog {
    descriptors: Vec<ToolDescriptor>,
    tool_config: Option<ToolConfig>,
}

impl ToolCatalog {
    pub fn new(descriptors: Vec<ToolDescriptor>) -> Self {
        let tool_config = if descriptors.is_empty() {
            None
        } else {
            Some(ToolConfig::auto(descriptors.iter().map(to_model_spec).collect()))
        };

        Self {
            descriptors,
            tool_config,
        }
    }

    /// `None` for an empty catalog: the model API rejects an empty tool list.
    pub fn tool_config(&self) -> Option<&ToolConfig> {
        self.tool_config.as_ref()
    }

    pub fn descriptors(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }

    pub fn get(&self, provider_name: &str) -> Option<&ToolDescriptor> {
        self.descriptors
            .iter()
            .find(|descriptor| descriptor.name == provider_name)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
