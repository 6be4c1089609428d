//! Pact file types.

use crate::schema::{Interaction, SpecVersion};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Serialized contract between one consumer and one provider.
///
/// Interactions are decoded in the tier named by
/// `metadata.pactSpecification.version`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawPactFile")]
pub struct PactFile {
    /// Consumer participant
    pub consumer: Participant,
    /// Provider participant
    pub provider: Participant,
    /// Recorded interactions, in recording order
    pub interactions: Vec<Interaction>,
    /// Contract metadata
    pub metadata: PactMetadata,
}

impl PactFile {
    /// Specification tier of the file.
    #[must_use]
    pub const fn version(&self) -> SpecVersion {
        self.metadata.pact_specification.version
    }

    /// Parse a pact file from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns error if the JSON is malformed or names an unknown tier.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Pretty-printed JSON representation.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Deserialize)]
struct RawPactFile {
    consumer: Participant,
    provider: Participant,
    #[serde(default)]
    interactions: Vec<Value>,
    metadata: PactMetadata,
}

impl TryFrom<RawPactFile> for PactFile {
    type Error = serde_json::Error;

    fn try_from(raw: RawPactFile) -> Result<Self, Self::Error> {
        let version = raw.metadata.pact_specification.version;
        let interactions = raw
            .interactions
            .into_iter()
            .map(|value| Interaction::from_value(version, value))
            .collect::<Result<_, _>>()?;
        Ok(Self {
            consumer: raw.consumer,
            provider: raw.provider,
            interactions,
            metadata: raw.metadata,
        })
    }
}

/// A participant in a contract (consumer or provider).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    /// Participant name
    pub name: String,
}

impl Participant {
    /// Create a new participant.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Contract metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PactMetadata {
    /// Pact specification version
    #[serde(rename = "pactSpecification")]
    pub pact_specification: PactSpecification,
    /// Library that generated the file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientInfo>,
}

impl PactMetadata {
    /// Metadata stamped with this library's name and version.
    #[must_use]
    pub fn generated(version: SpecVersion) -> Self {
        Self {
            pact_specification: PactSpecification { version },
            client: Some(ClientInfo::current()),
        }
    }
}

/// Pact specification version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PactSpecification {
    /// Specification tier
    pub version: SpecVersion,
}

/// Identity of the generating client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientInfo {
    /// Client name
    pub name: String,
    /// Client version
    pub version: String,
}

impl ClientInfo {
    /// This library.
    #[must_use]
    pub fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_interactions_decoded_in_file_tier() {
        let file: PactFile = serde_json::from_value(json!({
            "consumer": { "name": "test-consumer" },
            "provider": { "name": "todo-service" },
            "interactions": [{
                "description": "get todos",
                "request": { "method": "GET", "path": "/todos" },
                "response": { "status": 200, "body": { "content": [], "contentType": "application/json" } }
            }],
            "metadata": { "pactSpecification": { "version": "4.0.0" } }
        }))
        .unwrap();

        assert_eq!(file.version(), SpecVersion::V4);
        assert!(matches!(file.interactions[0], Interaction::V4(_)));
        assert!(file.metadata.client.is_none());
    }

    #[test]
    fn test_unknown_tier_rejected() {
        let result: Result<PactFile, _> = serde_json::from_value(json!({
            "consumer": { "name": "c" },
            "provider": { "name": "p" },
            "interactions": [],
            "metadata": { "pactSpecification": { "version": "1.0.0" } }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_serialized_file_has_all_keys() {
        let file = PactFile {
            consumer: Participant::new("test-consumer"),
            provider: Participant::new("todo-service"),
            interactions: vec![],
            metadata: PactMetadata::generated(SpecVersion::V2),
        };

        let value = serde_json::to_value(&file).unwrap();
        assert_eq!(value["consumer"]["name"], json!("test-consumer"));
        assert_eq!(value["provider"]["name"], json!("todo-service"));
        assert_eq!(value["interactions"], json!([]));
        assert_eq!(value["metadata"]["pactSpecification"]["version"], json!("2.0.0"));
        assert_eq!(value["metadata"]["client"]["name"], json!("pact-ledger"));
    }
}
