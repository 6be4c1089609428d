//! Header redaction.
//!
//! Header names are matched exactly as the transport supplied them. There is
//! no case folding: `Authorization` in `excludes` does not remove an
//! `authorization` header.

use crate::schema::Headers;
use serde::{Deserialize, Serialize};

/// Allow/deny lists applied to recorded request headers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HeadersConfig {
    /// Only these headers are kept, when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub includes: Option<Vec<String>>,
    /// These headers are always removed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excludes: Option<Vec<String>>,
}

impl HeadersConfig {
    /// Keep only the given headers.
    #[must_use]
    pub fn including<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            includes: Some(names.into_iter().map(Into::into).collect()),
            excludes: None,
        }
    }

    /// Remove the given headers.
    #[must_use]
    pub fn excluding<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            includes: None,
            excludes: Some(names.into_iter().map(Into::into).collect()),
        }
    }

    /// Add names to the deny list.
    #[must_use]
    pub fn with_excludes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes
            .get_or_insert_with(Vec::new)
            .extend(names.into_iter().map(Into::into));
        self
    }

    fn keeps(&self, name: &str) -> bool {
        let included = self
            .includes
            .as_ref()
            .is_none_or(|includes| includes.iter().any(|n| n == name));
        let excluded = self
            .excludes
            .as_ref()
            .is_some_and(|excludes| excludes.iter().any(|n| n == name));
        included && !excluded
    }
}

/// Filter `headers` through `config`.
#[must_use]
pub fn redact_headers(headers: &Headers, config: &HeadersConfig) -> Headers {
    headers
        .iter()
        .filter(|(name, _)| config.keeps(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}
