//! Pact specification 2.0.0 interactions.

use super::common::{Headers, default_status, nullable};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A V2 interaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    /// Interaction description; empty until the ledger assigns one
    #[serde(default)]
    pub description: String,
    /// Provider state (precondition)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_state: Option<String>,
    /// Expected request
    pub request: Request,
    /// Expected response
    pub response: Response,
    /// Free-form fields supplied by the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

/// HTTP request in a V2 interaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// HTTP method
    pub method: String,
    /// Request path
    pub path: String,
    /// Raw query string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Request headers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,
    /// Request body
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Matching rules keyed by JSON path
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub matching_rules: Option<Value>,
}

/// HTTP response in a V2 interaction.
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
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Matching rules keyed by JSON path
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub matching_rules: Option<Value>,
}
