//! Layered pact environment configuration.
//!
//! Three layers, later ones winning: `pact.config.json` in the project root,
//! `PACT_*` environment variables, and options passed at the call site.

use crate::error::LedgerResult;
use crate::headers::HeadersConfig;
use crate::ledger::{Pact, PactDefinition};
use crate::schema::{ParseVersionError, SpecVersion};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Consumer name used when none is configured.
pub const DEFAULT_CONSUMER_NAME: &str = "my-consumer";

/// Directory pact files are written to when none is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "pacts";

/// Configuration file looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "pact.config.json";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment variable parse error
    #[error("Failed to parse environment variable {name}: {reason}")]
    ParseError {
        /// Variable name
        name: String,
        /// Parse failure
        reason: String,
    },

    /// Unknown pact specification version
    #[error(transparent)]
    UnsupportedVersion(#[from] ParseVersionError),
}

/// Per-ledger options.
///
/// Every field is optional so layers can be merged field by field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PactOptions {
    /// Prefix removed from recorded request paths
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    /// Header allow/deny lists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers_config: Option<HeadersConfig>,
    /// Suppress the warning emitted on description collisions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_conflict: Option<bool>,
    /// Fail instead of disambiguating description collisions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deterministic: Option<bool>,
    /// Directory pact files are written to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl PactOptions {
    /// Set the base path.
    #[must_use]
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    /// Set the header allow/deny lists.
    #[must_use]
    pub fn with_headers_config(mut self, config: HeadersConfig) -> Self {
        self.headers_config = Some(config);
        self
    }

    /// Set whether collision warnings are suppressed.
    #[must_use]
    pub const fn with_ignore_conflict(mut self, ignore: bool) -> Self {
        self.ignore_conflict = Some(ignore);
        self
    }

    /// Set deterministic mode.
    #[must_use]
    pub const fn with_deterministic(mut self, deterministic: bool) -> Self {
        self.deterministic = Some(deterministic);
        self
    }

    /// Set the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Overlay `overrides` on top of `self`.
    #[must_use]
    pub fn merge(&self, overrides: &Self) -> Self {
        Self {
            base_path: overrides.base_path.clone().or_else(|| self.base_path.clone()),
            headers_config: overrides
                .headers_config
                .clone()
                .or_else(|| self.headers_config.clone()),
            ignore_conflict: overrides.ignore_conflict.or(self.ignore_conflict),
            deterministic: overrides.deterministic.or(self.deterministic),
            output_dir: overrides
                .output_dir
                .clone()
                .or_else(|| self.output_dir.clone()),
        }
    }

    /// Base path, ignoring an empty one.
    #[must_use]
    pub fn base_path(&self) -> Option<&str> {
        self.base_path.as_deref().filter(|p| !p.is_empty())
    }

    /// Whether collisions fail instead of being disambiguated.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.deterministic.unwrap_or(false)
    }

    /// Whether collision warnings are suppressed.
    #[must_use]
    pub fn ignores_conflicts(&self) -> bool {
        self.ignore_conflict.unwrap_or(false)
    }

    /// Output directory, defaulting to [`DEFAULT_OUTPUT_DIR`].
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        self.output_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_OUTPUT_DIR))
    }
}

/// One configuration layer, as read from a file or the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PactEnvironmentConfig {
    /// Consumer name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumer_name: Option<String>,
    /// Pact specification version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pact_version: Option<String>,
    /// Output directory; wins over `options.outputDir` of the same layer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    /// Default ledger options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<PactOptions>,
}

impl PactEnvironmentConfig {
    /// Read a configuration file.
    ///
    /// A missing, unreadable or malformed file yields an empty layer.
    #[must_use]
    pub fn from_file(path: &Path) -> Self {
        let Ok(content) = std::fs::read(path) else {
            debug!(path = %path.display(), "No pact configuration file");
            return Self::default();
        };
        serde_json::from_slice(&content).unwrap_or_else(|err| {
            debug!(path = %path.display(), error = %err, "Ignoring invalid pact configuration file");
            Self::default()
        })
    }

    /// Read [`CONFIG_FILE_NAME`] from `project_root`.
    #[must_use]
    pub fn discover(project_root: &Path) -> Self {
        Self::from_file(&project_root.join(CONFIG_FILE_NAME))
    }

    /// Read the `PACT_*` environment variables, loading `.env` first.
    ///
    /// # Errors
    ///
    /// Returns error if a boolean variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read the `PACT_*` variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns error if a boolean variable cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let includes = parse_list(&lookup, "PACT_HEADERS_INCLUDE");
        let excludes = parse_list(&lookup, "PACT_HEADERS_EXCLUDE");
        let headers_config = (includes.is_some() || excludes.is_some())
            .then_some(HeadersConfig { includes, excludes });

        let options = PactOptions {
            base_path: lookup("PACT_BASE_PATH"),
            headers_config,
            ignore_conflict: parse_bool(&lookup, "PACT_IGNORE_CONFLICT")?,
            deterministic: parse_bool(&lookup, "PACT_DETERMINISTIC")?,
            output_dir: None,
        };

        Ok(Self {
            consumer_name: lookup("PACT_CONSUMER_NAME"),
            pact_version: lookup("PACT_SPEC_VERSION"),
            output_dir: lookup("PACT_OUTPUT_DIR").map(PathBuf::from),
            options: (options != PactOptions::default()).then_some(options),
        })
    }

    /// Overlay `overrides` on top of `self`.
    #[must_use]
    pub fn merge(self, overrides: Self) -> Self {
        let options = match (self.options, overrides.options) {
            (Some(base), Some(top)) => Some(base.merge(&top)),
            (base, top) => top.or(base),
        };
        Self {
            consumer_name: overrides.consumer_name.or(self.consumer_name),
            pact_version: overrides.pact_version.or(self.pact_version),
            output_dir: overrides.output_dir.or(self.output_dir),
            options,
        }
    }

    /// Apply defaults and validate.
    ///
    /// # Errors
    ///
    /// Returns error if the pact version is not a supported tier.
    pub fn resolve(self) -> Result<ResolvedEnvironment, ConfigError> {
        let pact_version = match self.pact_version.as_deref() {
            Some(version) => version.parse()?,
            None => SpecVersion::V2,
        };
        let mut options = self.options.unwrap_or_default();
        if let Some(output_dir) = self.output_dir {
            options.output_dir = Some(output_dir);
        }
        Ok(ResolvedEnvironment {
            consumer_name: self
                .consumer_name
                .unwrap_or_else(|| DEFAULT_CONSUMER_NAME.to_string()),
            pact_version,
            options,
        })
    }
}

/// Fully resolved environment used to provision ledgers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEnvironment {
    /// Consumer name
    pub consumer_name: String,
    /// Pact specification version
    pub pact_version: SpecVersion,
    /// Default ledger options, output directory included
    pub options: PactOptions,
}

impl Default for ResolvedEnvironment {
    fn default() -> Self {
        Self {
            consumer_name: DEFAULT_CONSUMER_NAME.to_string(),
            pact_version: SpecVersion::V2,
            options: PactOptions::default(),
        }
    }
}

impl ResolvedEnvironment {
    /// Create an environment for a consumer and version.
    #[must_use]
    pub fn new(consumer_name: impl Into<String>, pact_version: SpecVersion) -> Self {
        Self {
            consumer_name: consumer_name.into(),
            pact_version,
            options: PactOptions::default(),
        }
    }

    /// Set the default ledger options.
    #[must_use]
    pub fn with_options(mut self, options: PactOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolve the file and environment layers for `project_root`.
    ///
    /// # Errors
    ///
    /// Returns error if an environment variable is malformed or the version
    /// is unsupported.
    pub fn load(project_root: &Path) -> Result<Self, ConfigError> {
        let file = PactEnvironmentConfig::discover(project_root);
        let env = PactEnvironmentConfig::from_env()?;
        file.merge(env).resolve()
    }

    /// Build a ledger for `provider`; `call_site` options win.
    ///
    /// # Errors
    ///
    /// Returns error if the ledger cannot be constructed.
    pub fn create_pact(&self, provider: &str, call_site: &PactOptions) -> LedgerResult<Pact> {
        let definition = PactDefinition::new(&self.consumer_name, provider)
            .with_version(self.pact_version.as_str());
        Pact::new(definition, self.options.merge(call_site))
    }
}

fn parse_bool<F>(lookup: &F, name: &str) -> Result<Option<bool>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| {
            value
                .trim()
                .parse::<bool>()
                .map_err(|e| ConfigError::ParseError {
                    name: name.to_string(),
                    reason: e.to_string(),
                })
        })
        .transpose()
}

fn parse_list<F>(lookup: &F, name: &str) -> Option<Vec<String>>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).map(|v| {
        v.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let resolved = PactEnvironmentConfig::default().resolve().unwrap();
        assert_eq!(resolved.consumer_name, "my-consumer");
        assert_eq!(resolved.pact_version, SpecVersion::V2);
        assert_eq!(resolved.options.output_dir(), Path::new("pacts"));
    }

    #[test]
    fn test_env_layer_parsing() {
        let config = PactEnvironmentConfig::from_lookup(lookup_from(&[
            ("PACT_CONSUMER_NAME", "web-app"),
            ("PACT_SPEC_VERSION", "3.0.0"),
            ("PACT_BASE_PATH", "/api"),
            ("PACT_DETERMINISTIC", "true"),
            ("PACT_HEADERS_INCLUDE", "content-type, accept"),
        ]))
        .unwrap();

        assert_eq!(config.consumer_name.as_deref(), Some("web-app"));
        let options = config.options.unwrap();
        assert_eq!(options.base_path(), Some("/api"));
        assert!(options.is_deterministic());
        assert_eq!(
            options.headers_config.unwrap().includes,
            Some(vec!["content-type".to_string(), "accept".to_string()])
        );
    }

    #[test]
    fn test_env_layer_rejects_bad_bool() {
        let result =
            PactEnvironmentConfig::from_lookup(lookup_from(&[("PACT_IGNORE_CONFLICT", "yes")]));
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_empty_env_layer_has_no_options() {
        let config = PactEnvironmentConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, PactEnvironmentConfig::default());
    }

    #[test]
    fn test_env_overrides_file() {
        let file = PactEnvironmentConfig {
            consumer_name: Some("from-file".into()),
            pact_version: Some("4.0.0".into()),
            output_dir: None,
            options: Some(PactOptions::default().with_base_path("/file").with_ignore_conflict(true)),
        };
        let env = PactEnvironmentConfig {
            consumer_name: Some("from-env".into()),
            options: Some(PactOptions::default().with_base_path("/env")),
            ..Default::default()
        };

        let resolved = file.merge(env).resolve().unwrap();
        assert_eq!(resolved.consumer_name, "from-env");
        assert_eq!(resolved.pact_version, SpecVersion::V4);
        assert_eq!(resolved.options.base_path(), Some("/env"));
        assert!(resolved.options.ignores_conflicts());
    }

    #[test]
    fn test_top_level_output_dir_wins_within_layer() {
        let config = PactEnvironmentConfig {
            output_dir: Some("top".into()),
            options: Some(PactOptions::default().with_output_dir("nested")),
            ..Default::default()
        };
        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.options.output_dir(), Path::new("top"));
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let config = PactEnvironmentConfig {
            pact_version: Some("1.0.0".into()),
            ..Default::default()
        };
        assert!(matches!(config.resolve(), Err(ConfigError::UnsupportedVersion(_))));
    }

    #[test]
    fn test_call_site_overrides_environment() {
        let env = ResolvedEnvironment::new("web-app", SpecVersion::V2)
            .with_options(PactOptions::default().with_base_path("/env").with_output_dir("out"));
        let pact = env
            .create_pact("todo-service", &PactOptions::default().with_base_path("/call"))
            .unwrap();

        assert_eq!(pact.options().base_path(), Some("/call"));
        assert_eq!(pact.options().output_dir(), Path::new("out"));
        assert_eq!(pact.name(), "web-app-todo-service");
    }

    #[test]
    fn test_missing_file_is_empty_layer() {
        let config = PactEnvironmentConfig::discover(Path::new("/definitely/not/here"));
        assert_eq!(config, PactEnvironmentConfig::default());
    }
}
