//! Pact specification 4.0.0 interactions.
//!
//! Bodies are wrapped with their content type.

use super::common::{Headers, ProviderState, default_status, nullable};
use super::v3::Query;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Interaction type recorded for every HTTP exchange.
pub const SYNCHRONOUS_HTTP: &str = "Synchronous/HTTP";

/// Content type used when the transport did not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

fn synchronous_http() -> String {
    SYNCHRONOUS_HTTP.to_string()
}

/// A V4 interaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    /// Interaction type
    #[serde(rename = "type", default = "synchronous_http")]
    pub kind: String,
    /// Interaction description; empty until the ledger assigns one
    #[serde(default)]
    pub description: String,
    /// Provider states (preconditions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_states: Option<Vec<ProviderState>>,
    /// Expected request
    pub request: Request,
    /// Expected response
    pub response: Response,
    /// Whether the interaction is still pending verification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<bool>,
    /// Free-form fields supplied by the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

/// Body wrapped with its content type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    /// Body content
    pub content: Value,
    /// MIME type of the content
    pub content_type: String,
    /// Encoding of `content`, when not plain JSON/text
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub encoded: Option<Value>,
}

impl Body {
    /// Wrap content with a content type.
    #[must_use]
    pub fn new(content: Value, content_type: impl Into<String>) -> Self {
        Self {
            content,
            content_type: content_type.into(),
            encoded: None,
        }
    }

    /// Wrap JSON content.
    #[must_use]
    pub fn json(content: Value) -> Self {
        Self::new(content, DEFAULT_CONTENT_TYPE)
    }
}

/// HTTP request in a V4 interaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// HTTP method
    pub method: String,
    /// Request path
    pub path: String,
    /// Query parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Query>,
    /// Request headers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,
    /// Request body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
    /// Matching rules grouped by category
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub matching_rules: Option<Value>,
    /// Generators grouped by category
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub generators: Option<Value>,
}

/// HTTP response in a V4 interaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// HTTP status code
    #[serde(default = "default_status")]
    pub status: u16,
    /// Response headers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,
    /// Response body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
    /// Matching rules grouped by category
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub matching_rules: Option<Value>,
    /// Generators grouped by category
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub generators: Option<Value>,
}
