//! Versioned interaction schema.
//!
//! Three tiers (V2, V3, V4) share most of their structure and differ in how
//! bodies, queries and provider states are represented. [`Interaction`] is the
//! tagged union the ledger works with; only [`build_interaction`] and the
//! field accessors on [`Interaction`] look at the tier.

pub mod builder;
pub mod common;
pub mod v2;
pub mod v3;
pub mod v4;

pub use builder::build_interaction;
pub use common::{
    HeaderValue, Headers, InteractionOptions, MockResponse, ProviderState, ProviderStates,
    RecordedRequest, SideRules,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Unknown pact specification version.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported pact specification version: {0}")]
pub struct ParseVersionError(pub String);

/// Pact specification tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SpecVersion {
    /// Pact specification 2.0.0
    V2,
    /// Pact specification 3.0.0
    V3,
    /// Pact specification 4.0.0
    V4,
}

impl SpecVersion {
    /// Full version string as written into pact files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V2 => "2.0.0",
            Self::V3 => "3.0.0",
            Self::V4 => "4.0.0",
        }
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpecVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "2" | "2.0" | "2.0.0" => Ok(Self::V2),
            "3" | "3.0" | "3.0.0" => Ok(Self::V3),
            "4" | "4.0" | "4.0.0" => Ok(Self::V4),
            other => Err(ParseVersionError(other.to_string())),
        }
    }
}

impl TryFrom<String> for SpecVersion {
    type Error = ParseVersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SpecVersion> for String {
    fn from(version: SpecVersion) -> Self {
        version.as_str().to_string()
    }
}

/// One recorded request/response fact, in the shape of its tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Interaction {
    /// V2 interaction
    V2(v2::Interaction),
    /// V3 interaction
    V3(v3::Interaction),
    /// V4 interaction
    V4(v4::Interaction),
}

impl Interaction {
    /// Decode an interaction of a known tier.
    ///
    /// # Errors
    ///
    /// Returns error if `value` does not have the tier's shape.
    pub fn from_value(version: SpecVersion, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match version {
            SpecVersion::V2 => Self::V2(serde_json::from_value(value)?),
            SpecVersion::V3 => Self::V3(serde_json::from_value(value)?),
            SpecVersion::V4 => Self::V4(serde_json::from_value(value)?),
        })
    }

    /// Tier of this interaction.
    #[must_use]
    pub const fn version(&self) -> SpecVersion {
        match self {
            Self::V2(_) => SpecVersion::V2,
            Self::V3(_) => SpecVersion::V3,
            Self::V4(_) => SpecVersion::V4,
        }
    }

    /// Interaction description; empty when none was assigned.
    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::V2(i) => &i.description,
            Self::V3(i) => &i.description,
            Self::V4(i) => &i.description,
        }
    }

    /// Replace the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        let description = description.into();
        match self {
            Self::V2(i) => i.description = description,
            Self::V3(i) => i.description = description,
            Self::V4(i) => i.description = description,
        }
    }

    /// Request method.
    #[must_use]
    pub fn method(&self) -> &str {
        match self {
            Self::V2(i) => &i.request.method,
            Self::V3(i) => &i.request.method,
            Self::V4(i) => &i.request.method,
        }
    }

    /// Request path.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::V2(i) => &i.request.path,
            Self::V3(i) => &i.request.path,
            Self::V4(i) => &i.request.path,
        }
    }

    /// Mutable access to the request path and headers.
    pub fn request_target_mut(&mut self) -> (&mut String, &mut Option<Headers>) {
        match self {
            Self::V2(i) => (&mut i.request.path, &mut i.request.headers),
            Self::V3(i) => (&mut i.request.path, &mut i.request.headers),
            Self::V4(i) => (&mut i.request.path, &mut i.request.headers),
        }
    }

    /// Response status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::V2(i) => i.response.status,
            Self::V3(i) => i.response.status,
            Self::V4(i) => i.response.status,
        }
    }

    /// Response headers.
    #[must_use]
    pub const fn reply_headers(&self) -> Option<&Headers> {
        match self {
            Self::V2(i) => i.response.headers.as_ref(),
            Self::V3(i) => i.response.headers.as_ref(),
            Self::V4(i) => i.response.headers.as_ref(),
        }
    }

    /// Response content with any tier wrapping removed.
    #[must_use]
    pub fn reply_body(&self) -> Option<&Value> {
        match self {
            Self::V2(i) => i.response.body.as_ref(),
            Self::V3(i) => i.response.body.as_ref(),
            Self::V4(i) => i.response.body.as_ref().map(|body| &body.content),
        }
    }

    /// Everything except the description, as a JSON value.
    ///
    /// Object keys compare without regard to order; array order is kept.
    ///
    /// # Errors
    ///
    /// Returns error if the interaction cannot be represented as JSON.
    pub fn content(&self) -> Result<Value, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut value {
            map.remove("description");
        }
        Ok(value)
    }
}

impl From<v2::Interaction> for Interaction {
    fn from(interaction: v2::Interaction) -> Self {
        Self::V2(interaction)
    }
}

impl From<v3::Interaction> for Interaction {
    fn from(interaction: v3::Interaction) -> Self {
        Self::V3(interaction)
    }
}

impl From<v4::Interaction> for Interaction {
    fn from(interaction: v4::Interaction) -> Self {
        Self::V4(interaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_version_parsing() {
        assert_eq!("2.0.0".parse::<SpecVersion>().unwrap(), SpecVersion::V2);
        assert_eq!("3".parse::<SpecVersion>().unwrap(), SpecVersion::V3);
        assert_eq!(" 4.0 ".parse::<SpecVersion>().unwrap(), SpecVersion::V4);
        assert!("5.0.0".parse::<SpecVersion>().is_err());
    }

    #[test]
    fn test_version_serializes_as_full_string() {
        assert_eq!(serde_json::to_value(SpecVersion::V3).unwrap(), json!("3.0.0"));
        let parsed: SpecVersion = serde_json::from_value(json!("4.0.0")).unwrap();
        assert_eq!(parsed, SpecVersion::V4);
    }

    #[test]
    fn test_content_excludes_description() {
        let interaction = Interaction::from_value(
            SpecVersion::V2,
            json!({
                "description": "get todos",
                "request": { "method": "GET", "path": "/todos" },
                "response": { "status": 200, "body": [] }
            }),
        )
        .unwrap();

        let content = interaction.content().unwrap();
        assert!(content.get("description").is_none());
        assert_eq!(content["request"]["path"], json!("/todos"));
    }

    #[test]
    fn test_reply_body_unwraps_v4_content() {
        let interaction = Interaction::from_value(
            SpecVersion::V4,
            json!({
                "description": "get todos",
                "request": { "method": "GET", "path": "/todos" },
                "response": { "status": 200, "body": { "content": [1], "contentType": "application/json" } }
            }),
        )
        .unwrap();

        assert_eq!(interaction.reply_body(), Some(&json!([1])));
        assert_eq!(interaction.version(), SpecVersion::V4);
    }
}
