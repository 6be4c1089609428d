//! Pact specification 3.0.0 interactions.
//!
//! Differs from V2 in provider states (a list with parameters), the query
//! (decoded into name/values pairs) and the presence of generators.

use super::common::{Headers, ProviderState, default_status, nullable};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Decoded query parameters.
pub type Query = BTreeMap<String, Vec<String>>;

/// A V3 interaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
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
    /// Free-form fields supplied by the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

/// HTTP request in a V3 interaction.
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
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Matching rules grouped by category
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub matching_rules: Option<Value>,
    /// Generators grouped by category
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub generators: Option<Value>,
}

/// HTTP response in a V3 interaction.
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
    /// Matching rules grouped by category
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub matching_rules: Option<Value>,
    /// Generators grouped by category
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub generators: Option<Value>,
}

/// Decode a raw query string into V3 query parameters.
#[must_use]
pub fn parse_query(raw: &str) -> Query {
    let mut query = Query::new();
    for (name, value) in url::form_urlencoded::parse(raw.trim_start_matches('?').as_bytes()) {
        query
            .entry(name.into_owned())
            .or_default()
            .push(value.into_owned());
    }
    query
}
