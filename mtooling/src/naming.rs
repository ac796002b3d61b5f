//! Tool name conversion between provider and model conventions.
//!
//! Providers name tools with `-` separators (`search-docs`); the model API
//! only accepts `[a-zA-Z0-9_]`, so tools cross the boundary as `search_docs`.
//! Both directions are plain character substitutions.
//!
//! Known constraint: a provider name that already contains `_` does not
//! survive the round trip, since every `_` the model sends back is read as a
//! provider separator.
//!
//! ```rust
//! use mtooling::naming::{model_name_to_provider_name, provider_name_to_model_name};
//!
//! assert_eq!(provider_name_to_model_name("search-docs"), "search_docs");
//! assert_eq!(model_name_to_provider_name("search_docs"), "search-docs");
//! ```

pub const PROVIDER_SEPARATOR: char = '-';
pub const MODEL_SEPARATOR: char = '_';

pub fn provider_name_to_model_name(name: &str) -> String {
    name.replace(PROVIDER_SEPARATOR, "_")
}

pub fn model_name_to_provider_name(name: &str) -> String {
    name.replace(MODEL_SEPARATOR, "-")
}
