//! Ledger error types using thiserror 2.0.

use crate::config::ConfigError;
use crate::schema::{ParseVersionError, SpecVersion};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while recording, loading or persisting interactions.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The pact definition carries no specification version
    #[error(
        "The version is missing in the pact {pact}. Provide a pact specification version such as 2.0.0"
    )]
    MissingVersion {
        /// Pact name (`<consumer>-<provider>`)
        pact: String,
    },

    /// The specification version is not one of the supported tiers
    #[error(transparent)]
    UnsupportedVersion(#[from] ParseVersionError),

    /// Same description, different content, in deterministic mode
    #[error(
        "The interaction `{description}` already exists but with different content. It is recommended that the interaction stays deterministic."
    )]
    Conflict {
        /// The colliding description
        description: String,
    },

    /// The candidate was built for another tier than the ledger records
    #[error("Interaction targets pact specification {found} but the ledger records {expected}")]
    VersionMismatch {
        /// Tier of the ledger
        expected: SpecVersion,
        /// Tier of the candidate
        found: SpecVersion,
    },

    /// No ledger registered under the provider name
    #[error("No ledger registered for provider {0}")]
    UnknownProvider(String),

    /// The intercepted request cannot be recorded
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File-system error
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Affected path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    /// Check if this error is a deterministic-mode conflict.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Create a conflict error.
    #[must_use]
    pub fn conflict(description: impl Into<String>) -> Self {
        Self::Conflict {
            description: description.into(),
        }
    }

    /// Create an unknown provider error.
    #[must_use]
    pub fn unknown_provider(name: impl Into<String>) -> Self {
        Self::UnknownProvider(name.into())
    }

    /// Create an I/O error with path context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
