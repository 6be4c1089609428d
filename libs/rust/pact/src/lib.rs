//! Consumer-driven contract recording.
//!
//! Records the HTTP interactions a consumer's tests perform against mocked
//! providers into one ledger per provider, reconciles repeats and collisions,
//! and persists each ledger as a pact file (specification V2, V3 or V4).
//!
//! # Modules
//! - [`ledger`]: the per-provider interaction ledger and its record rules
//! - [`registry`]: one ledger per provider name
//! - [`schema`]: versioned interaction types
//! - [`interceptor`] and [`lifecycle`]: glue for mocking layers and test runs

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod contract;
pub mod error;
pub mod headers;
pub mod interceptor;
pub mod ledger;
pub mod lifecycle;
pub mod provider;
pub mod registry;
pub mod schema;
pub mod store;
pub mod telemetry;

pub use config::{ConfigError, PactEnvironmentConfig, PactOptions, ResolvedEnvironment};
pub use contract::{ClientInfo, PactFile, PactMetadata, PactSpecification, Participant};
pub use error::{LedgerError, LedgerResult};
pub use headers::{HeadersConfig, redact_headers};
pub use interceptor::{
    GraphQlOperation, InteractionTemplate, InterceptedRequest, Interceptor, MockReply, ReplyBody,
};
pub use ledger::{Pact, PactDefinition, RecordOutcome};
pub use lifecycle::TestRun;
pub use provider::{UNKNOWN_PROVIDER, infer_provider_name};
pub use registry::{ProviderRegistry, SharedPact};
pub use schema::{
    HeaderValue, Headers, Interaction, InteractionOptions, MockResponse, ParseVersionError,
    ProviderState, RecordedRequest, SpecVersion, build_interaction,
};
pub use store::{FilePactStore, PactStore, reload_pact};
pub use telemetry::{TracingConfig, init_tracing, try_init_tracing};
