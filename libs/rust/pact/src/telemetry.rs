//! Structured logging setup.
//!
//! The library only emits `tracing` events; test harnesses that want to see
//! them install a subscriber through [`init_tracing`] or [`try_init_tracing`].

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default service name attached to the subscriber.
pub const DEFAULT_SERVICE_NAME: &str = "pact-ledger";

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Service name reported with the startup event
    pub service_name: String,
    /// Log level filter, used when `RUST_LOG` is unset
    pub log_level: String,
    /// Whether to output JSON format
    pub json_output: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            log_level: "info".to_string(),
            json_output: false,
        }
    }
}

impl TracingConfig {
    /// Set the service name.
    #[must_use]
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Set the log level.
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable JSON output.
    #[must_use]
    pub const fn with_json_output(mut self) -> Self {
        self.json_output = true;
        self
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level))
    }
}

/// Install the global subscriber.
///
/// # Panics
///
/// Panics if a global subscriber is already set. Test harnesses that may
/// initialize more than once should use [`try_init_tracing`].
pub fn init_tracing(config: &TracingConfig) {
    assert!(
        try_init_tracing(config),
        "global tracing subscriber already set"
    );
}

/// Install the global subscriber unless one is already set.
///
/// Returns whether this call installed it.
pub fn try_init_tracing(config: &TracingConfig) -> bool {
    let installed = if config.json_output {
        tracing_subscriber::registry()
            .with(config.filter())
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .is_ok()
    } else {
        tracing_subscriber::registry()
            .with(config.filter())
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .is_ok()
    };
    if installed {
        tracing::debug!(service = %config.service_name, "Tracing initialized");
    }
    installed
}
