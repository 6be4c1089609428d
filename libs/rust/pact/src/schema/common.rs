//! Shapes shared by every specification tier.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Header map keyed by the name exactly as the transport supplied it.
pub type Headers = BTreeMap<String, HeaderValue>;

/// A header value: most transports give one string, some give a list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum HeaderValue {
    /// Single value
    Single(String),
    /// Repeated header
    Multiple(Vec<String>),
}

impl HeaderValue {
    /// First value of the header, if any.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            Self::Multiple(values) => values.first().map(String::as_str),
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

/// Look up a header by name, ignoring ASCII case.
#[must_use]
pub fn header<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .and_then(|(_, value)| value.first())
}

/// Transport-neutral request as seen by the interception layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordedRequest {
    /// HTTP method
    pub method: String,
    /// Raw path, before any base path is stripped
    pub path: String,
    /// Query string without the leading `?`
    pub query: Option<String>,
    /// Request headers
    pub headers: Option<Headers>,
    /// Request body
    pub body: Option<Value>,
}

impl RecordedRequest {
    /// Create a request with method and path.
    #[must_use]
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    /// Set the query string.
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<HeaderValue>) -> Self {
        self.headers
            .get_or_insert_with(Headers::new)
            .insert(name.into(), value.into());
        self
    }

    /// Set the body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Response decided by test code, before it is shaped for a tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Option<Headers>,
    /// Response content
    pub body: Option<Value>,
}

impl Default for MockResponse {
    fn default() -> Self {
        Self {
            status: 200,
            headers: None,
            body: None,
        }
    }
}

impl MockResponse {
    /// A 200 response carrying `content`.
    #[must_use]
    pub fn ok(content: Value) -> Self {
        Self {
            body: Some(content),
            ..Default::default()
        }
    }

    /// Set the status code.
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<HeaderValue>) -> Self {
        self.headers
            .get_or_insert_with(Headers::new)
            .insert(name.into(), value.into());
        self
    }
}

/// Provider state with optional parameters (V3 and V4).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderState {
    /// State name
    pub name: String,
    /// State parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
}

impl ProviderState {
    /// Create a state without parameters.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: None,
        }
    }
}

/// Provider states as callers usually write them: one name or a list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ProviderStates {
    /// A single state name
    Name(String),
    /// Full state list
    States(Vec<ProviderState>),
}

impl ProviderStates {
    /// Expand into a state list.
    #[must_use]
    pub fn into_states(self) -> Vec<ProviderState> {
        match self {
            Self::Name(name) => vec![ProviderState::new(name)],
            Self::States(states) => states,
        }
    }
}

/// Per-side rule maps (matching rules or generators), kept opaque.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SideRules {
    /// Rules applied to the request
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub request: Option<Value>,
    /// Rules applied to the response
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
}

/// Metadata a caller may attach to an interaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InteractionOptions {
    /// Interaction description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Provider state (V2)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_state: Option<String>,
    /// Provider states (V3/V4)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_states: Option<ProviderStates>,
    /// Matching rules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matching_rules: Option<SideRules>,
    /// Generators (V3/V4)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generators: Option<SideRules>,
    /// Free-form fields carried on the recorded interaction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl InteractionOptions {
    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the provider state.
    #[must_use]
    pub fn with_provider_state(mut self, state: impl Into<String>) -> Self {
        self.provider_state = Some(state.into());
        self
    }

    /// Set the provider states.
    #[must_use]
    pub fn with_provider_states(mut self, states: ProviderStates) -> Self {
        self.provider_states = Some(states);
        self
    }

    /// Set the matching rules.
    #[must_use]
    pub fn with_matching_rules(mut self, rules: SideRules) -> Self {
        self.matching_rules = Some(rules);
        self
    }

    /// Set the generators.
    #[must_use]
    pub fn with_generators(mut self, generators: SideRules) -> Self {
        self.generators = Some(generators);
        self
    }

    /// Add a free-form metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata
            .get_or_insert_with(Map::new)
            .insert(key.into(), value);
        self
    }

    /// States to record for the V3/V4 tiers.
    ///
    /// Falls back to the V2 `provider_state` when no list was given.
    #[must_use]
    pub fn resolved_states(&self) -> Option<Vec<ProviderState>> {
        self.provider_states
            .clone()
            .map(ProviderStates::into_states)
            .or_else(|| {
                self.provider_state
                    .clone()
                    .map(|name| vec![ProviderState::new(name)])
            })
    }

    /// State to record for the V2 tier.
    #[must_use]
    pub fn resolved_state(&self) -> Option<String> {
        self.provider_state.clone().or_else(|| {
            self.provider_states
                .clone()
                .map(ProviderStates::into_states)
                .and_then(|states| states.into_iter().next())
                .map(|state| state.name)
        })
    }
}

pub(crate) const fn default_status() -> u16 {
    200
}

/// Deserialize a present field as `Some`, keeping an explicit `null`.
///
/// Paired with `#[serde(default)]` so that only an absent field is `None`.
pub(crate) fn nullable<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}
