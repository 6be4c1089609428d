//! Interaction ledger.
//!
//! A [`Pact`] accumulates the interactions observed for one consumer/provider
//! pair. Every candidate goes through [`Pact::record`], which normalizes it and
//! decides whether it is new, a repeat of something already recorded, or a
//! conflicting fact under an existing description:
//!
//! - new description: appended as is
//! - same description and same content: ignored
//! - same description, different content, deterministic mode: rejected
//! - same description, different content, otherwise: appended under a
//!   description suffixed with the current source and a counter
//!
//! Descriptions are compared as "same name" when equal, or when the recorded
//! one is a disambiguated form of the candidate's (`"<d> (<source>)"`,
//! `"<d> - <n>"`).

use crate::config::PactOptions;
use crate::contract::{PactFile, PactMetadata, Participant};
use crate::error::{LedgerError, LedgerResult};
use crate::headers::redact_headers;
use crate::schema::{Interaction, SpecVersion};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Identity of a ledger before it is validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PactDefinition {
    /// Consumer name
    pub consumer: String,
    /// Provider name
    pub provider: String,
    /// Pact specification version; required
    pub version: Option<String>,
}

impl PactDefinition {
    /// Create a definition without a version.
    #[must_use]
    pub fn new(consumer: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            consumer: consumer.into(),
            provider: provider.into(),
            version: None,
        }
    }

    /// Set the pact specification version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// What [`Pact::record`] did with a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Appended under its own description
    Appended {
        /// Recorded description
        description: String,
    },
    /// Already recorded with identical content
    Duplicate {
        /// Description of the candidate
        description: String,
    },
    /// Appended under a disambiguated description
    Disambiguated {
        /// Description of the candidate
        original: String,
        /// Description it was recorded under
        description: String,
    },
}

impl RecordOutcome {
    /// Description the interaction is recorded under.
    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::Appended { description }
            | Self::Duplicate { description }
            | Self::Disambiguated { description, .. } => description,
        }
    }

    /// Whether the ledger grew.
    #[must_use]
    pub const fn is_appended(&self) -> bool {
        !matches!(self, Self::Duplicate { .. })
    }
}

/// Interaction ledger for one consumer/provider pair.
#[derive(Debug, Clone)]
pub struct Pact {
    consumer: Participant,
    provider: Participant,
    version: SpecVersion,
    options: PactOptions,
    interactions: Vec<Interaction>,
    current_source: Option<String>,
}

impl Pact {
    /// Create a ledger.
    ///
    /// # Errors
    ///
    /// Returns error if the definition has no version or an unsupported one.
    pub fn new(definition: PactDefinition, options: PactOptions) -> LedgerResult<Self> {
        let version = match definition.version.as_deref().map(str::trim) {
            None | Some("") => {
                return Err(LedgerError::MissingVersion {
                    pact: format!("{}-{}", definition.consumer, definition.provider),
                });
            }
            Some(version) => version.parse()?,
        };

        Ok(Self {
            consumer: Participant::new(definition.consumer),
            provider: Participant::new(definition.provider),
            version,
            options,
            interactions: Vec::new(),
            current_source: None,
        })
    }

    /// Pact name, `<consumer>-<provider>`.
    #[must_use]
    pub fn name(&self) -> String {
        format!("{}-{}", self.consumer.name, self.provider.name)
    }

    /// Specification tier recorded by this ledger.
    #[must_use]
    pub const fn version(&self) -> SpecVersion {
        self.version
    }

    /// Consumer name.
    #[must_use]
    pub fn consumer_name(&self) -> &str {
        &self.consumer.name
    }

    /// Provider name.
    #[must_use]
    pub fn provider_name(&self) -> &str {
        &self.provider.name
    }

    /// Ledger options.
    #[must_use]
    pub const fn options(&self) -> &PactOptions {
        &self.options
    }

    /// Where the pact file lives: `<outputDir>/<consumer>-<provider>.json`.
    #[must_use]
    pub fn file_name(&self) -> PathBuf {
        self.options
            .output_dir()
            .join(format!("{}.json", self.name()))
    }

    /// Recorded interactions, in recording order.
    #[must_use]
    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    /// Number of recorded interactions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    /// Label used to disambiguate later collisions, usually the test title.
    pub fn set_current_source(&mut self, source: impl Into<String>) {
        self.current_source = Some(source.into());
    }

    /// Forget the current source.
    pub fn clear_current_source(&mut self) {
        self.current_source = None;
    }

    /// Current disambiguation label.
    #[must_use]
    pub fn current_source(&self) -> Option<&str> {
        self.current_source.as_deref()
    }

    /// Reconcile a candidate interaction into the ledger.
    ///
    /// An empty description is replaced by
    /// `"<METHOD> <PATH> returns status <STATUS>"`, computed from the path as
    /// given, before the base path is stripped.
    ///
    /// # Errors
    ///
    /// Returns error if the candidate belongs to another tier, or collides
    /// with a different interaction in deterministic mode. The ledger is left
    /// unchanged in both cases.
    pub fn record(&mut self, candidate: impl Into<Interaction>) -> LedgerResult<RecordOutcome> {
        let mut interaction = candidate.into();
        if interaction.version() != self.version {
            return Err(LedgerError::VersionMismatch {
                expected: self.version,
                found: interaction.version(),
            });
        }

        let description = match interaction.description() {
            "" => default_description(&interaction),
            given => given.to_string(),
        };
        self.normalize(&mut interaction);
        interaction.set_description(description.clone());

        let content = interaction.content()?;
        let mut same_name = self
            .interactions
            .iter()
            .filter(|existing| shares_name(existing.description(), &description))
            .peekable();

        if same_name.peek().is_none() {
            debug!(pact = %self.name(), %description, "Recording interaction");
            self.interactions.push(interaction);
            return Ok(RecordOutcome::Appended { description });
        }

        for existing in same_name {
            if existing.content()? == content {
                debug!(pact = %self.name(), %description, "Interaction already recorded");
                return Ok(RecordOutcome::Duplicate { description });
            }
        }

        if self.options.is_deterministic() {
            return Err(LedgerError::conflict(description));
        }

        let disambiguated = self.disambiguate(&description);
        if !self.options.ignores_conflicts() {
            warn!(
                pact = %self.name(),
                %description,
                recorded_as = %disambiguated,
                "Interaction already exists with different content"
            );
        }
        interaction.set_description(disambiguated.clone());
        self.interactions.push(interaction);

        Ok(RecordOutcome::Disambiguated {
            original: description,
            description: disambiguated,
        })
    }

    /// Replace every interaction with those of `pact_file`, or clear.
    ///
    /// A file of another tier is discarded.
    pub fn reset(&mut self, pact_file: Option<PactFile>) {
        self.interactions = match pact_file {
            Some(file) if file.version() == self.version => file.interactions,
            Some(file) => {
                warn!(
                    pact = %self.name(),
                    expected = %self.version,
                    found = %file.version(),
                    "Discarding pact file of another specification version"
                );
                Vec::new()
            }
            None => Vec::new(),
        };
    }

    /// Snapshot of the ledger as a pact file.
    #[must_use]
    pub fn generate_pact_file(&self) -> PactFile {
        PactFile {
            consumer: self.consumer.clone(),
            provider: self.provider.clone(),
            interactions: self.interactions.clone(),
            metadata: PactMetadata::generated(self.version),
        }
    }

    fn normalize(&self, interaction: &mut Interaction) {
        let (path, headers) = interaction.request_target_mut();
        if let Some(base_path) = self.options.base_path() {
            *path = path.replacen(base_path, "", 1);
        }
        if let (Some(headers), Some(config)) = (headers.as_mut(), &self.options.headers_config) {
            *headers = redact_headers(headers, config);
        }
    }

    fn disambiguate(&self, description: &str) -> String {
        let base = match &self.current_source {
            Some(source) => format!("{description} ({source})"),
            None => description.to_string(),
        };
        let is_taken = |candidate: &str| {
            self.interactions
                .iter()
                .any(|i| i.description() == candidate)
        };

        let uses = self
            .interactions
            .iter()
            .filter(|i| {
                i.description() == base
                    || i.description()
                        .strip_prefix(base.as_str())
                        .is_some_and(|rest| rest.starts_with(" - "))
            })
            .count();
        if uses == 0 {
            return base;
        }

        let mut n = uses;
        let mut candidate = format!("{base} - {n}");
        while is_taken(&candidate) {
            n += 1;
            candidate = format!("{base} - {n}");
        }
        candidate
    }
}

fn default_description(interaction: &Interaction) -> String {
    format!(
        "{} {} returns status {}",
        interaction.method(),
        interaction.path(),
        interaction.status()
    )
}

fn shares_name(recorded: &str, description: &str) -> bool {
    recorded
        .strip_prefix(description)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(" (") || rest.starts_with(" - "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::HeadersConfig;
    use crate::schema::{InteractionOptions, MockResponse, RecordedRequest, build_interaction};
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing::Level;
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    fn ledger(version: SpecVersion, options: PactOptions) -> Pact {
        Pact::new(
            PactDefinition::new("test-consumer", "todo-service").with_version(version.as_str()),
            options,
        )
        .unwrap()
    }

    fn candidate(description: Option<&str>, path: &str, body: serde_json::Value) -> Interaction {
        let options = InteractionOptions {
            description: description.map(String::from),
            ..Default::default()
        };
        build_interaction(
            SpecVersion::V2,
            RecordedRequest::new("GET", path),
            MockResponse::ok(body),
            &options,
        )
    }

    #[test]
    fn test_missing_version_rejected() {
        let result = Pact::new(
            PactDefinition::new("test-consumer", "todo-service"),
            PactOptions::default(),
        );
        assert!(matches!(result, Err(LedgerError::MissingVersion { .. })));
    }

    #[test]
    fn test_blank_version_rejected() {
        let result = Pact::new(
            PactDefinition::new("c", "p").with_version("  "),
            PactOptions::default(),
        );
        assert!(matches!(result, Err(LedgerError::MissingVersion { .. })));
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let result = Pact::new(
            PactDefinition::new("c", "p").with_version("1.1.0"),
            PactOptions::default(),
        );
        assert!(matches!(result, Err(LedgerError::UnsupportedVersion(_))));
    }

    #[test]
    fn test_identity_accessors() {
        let pact = ledger(SpecVersion::V3, PactOptions::default().with_output_dir("target/pacts"));
        assert_eq!(pact.name(), "test-consumer-todo-service");
        assert_eq!(pact.provider_name(), "todo-service");
        assert_eq!(pact.consumer_name(), "test-consumer");
        assert_eq!(pact.version(), SpecVersion::V3);
        assert_eq!(
            pact.file_name(),
            PathBuf::from("target/pacts/test-consumer-todo-service.json")
        );
    }

    #[test]
    fn test_default_description_uses_raw_path() {
        let mut pact = ledger(SpecVersion::V2, PactOptions::default().with_base_path("/todo-service"));
        let outcome = pact
            .record(candidate(None, "/todo-service/todos", json!([])))
            .unwrap();

        assert_eq!(outcome.description(), "GET /todo-service/todos returns status 200");
        assert_eq!(pact.interactions()[0].path(), "/todos");
        assert_eq!(pact.generate_pact_file().interactions.len(), 1);
    }

    #[test]
    fn test_base_path_is_plain_string_removal() {
        let mut pact = ledger(SpecVersion::V2, PactOptions::default().with_base_path("base"));
        pact.record(candidate(Some("a"), "base/v1/todo", json!(null))).unwrap();
        assert_eq!(pact.interactions()[0].path(), "/v1/todo");
    }

    #[test]
    fn test_headers_redacted_on_record() {
        let config = HeadersConfig::including(["content-type"]).with_excludes(["Authorization"]);
        let mut pact = ledger(SpecVersion::V2, PactOptions::default().with_headers_config(config));
        let interaction = build_interaction(
            SpecVersion::V2,
            RecordedRequest::new("POST", "/todos")
                .with_header("content-type", "application/json")
                .with_header("Authorization", "Bearer xxx"),
            MockResponse::default(),
            &InteractionOptions::default(),
        );

        pact.record(interaction).unwrap();
        let Interaction::V2(recorded) = &pact.interactions()[0] else {
            panic!("expected a V2 interaction");
        };
        let headers = recorded.request.headers.as_ref().unwrap();
        assert_eq!(headers.keys().collect::<Vec<_>>(), vec!["content-type"]);
    }

    #[test]
    fn test_exact_repeat_is_ignored() {
        let mut pact = ledger(SpecVersion::V2, PactOptions::default());
        let first = pact.record(candidate(Some("list"), "/todos", json!([]))).unwrap();
        let second = pact.record(candidate(Some("list"), "/todos", json!([]))).unwrap();

        assert!(first.is_appended());
        assert_eq!(second, RecordOutcome::Duplicate { description: "list".into() });
        assert_eq!(pact.len(), 1);
    }

    #[test]
    fn test_deterministic_conflict_leaves_ledger_unchanged() {
        let mut pact = ledger(SpecVersion::V2, PactOptions::default().with_deterministic(true));
        pact.record(candidate(Some("list"), "/todos", json!([]))).unwrap();
        let err = pact
            .record(candidate(Some("list"), "/todos", json!([{ "id": 1 }])))
            .unwrap_err();

        assert!(err.is_conflict());
        assert!(err.to_string().contains("list"));
        assert_eq!(pact.len(), 1);
        assert_eq!(pact.interactions()[0].reply_body(), Some(&json!([])));
    }

    #[test]
    fn test_collisions_disambiguated_by_source_then_counter() {
        let mut pact = ledger(SpecVersion::V2, PactOptions::default());
        pact.record(candidate(Some("list"), "/todos", json!([]))).unwrap();
        pact.set_current_source("shows todos");
        let second = pact
            .record(candidate(Some("list"), "/todos", json!([1])))
            .unwrap();
        let third = pact
            .record(candidate(Some("list"), "/todos", json!([2])))
            .unwrap();

        assert_eq!(second.description(), "list (shows todos)");
        assert_eq!(third.description(), "list (shows todos) - 1");
        let descriptions: Vec<_> = pact.interactions().iter().map(Interaction::description).collect();
        assert_eq!(descriptions, vec!["list", "list (shows todos)", "list (shows todos) - 1"]);
    }

    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn warnings_while(record: impl FnOnce()) -> usize {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(Arc::clone(&count)));
        tracing::subscriber::with_default(subscriber, record);
        count.load(Ordering::SeqCst)
    }

    #[test]
    fn test_collision_warns_unless_ignored() {
        for (ignore, expected) in [(false, 1), (true, 0)] {
            let mut pact = ledger(
                SpecVersion::V2,
                PactOptions::default().with_ignore_conflict(ignore),
            );
            let warnings = warnings_while(|| {
                pact.record(candidate(Some("list"), "/todos", json!([]))).unwrap();
                pact.record(candidate(Some("list"), "/todos", json!([]))).unwrap();
                let outcome = pact.record(candidate(Some("list"), "/todos", json!([1]))).unwrap();
                assert_eq!(outcome.description(), "list - 1");
            });
            assert_eq!(warnings, expected, "ignore_conflict = {ignore}");
        }
    }

    #[test]
    fn test_collision_without_source_gets_counter() {
        let mut pact = ledger(SpecVersion::V2, PactOptions::default().with_ignore_conflict(true));
        pact.record(candidate(Some("list"), "/todos", json!([]))).unwrap();
        let second = pact.record(candidate(Some("list"), "/todos", json!([1]))).unwrap();
        assert_eq!(second.description(), "list - 1");
    }

    #[test]
    fn test_repeat_of_disambiguated_interaction_is_ignored() {
        let mut pact = ledger(SpecVersion::V2, PactOptions::default());
        pact.record(candidate(Some("list"), "/todos", json!([]))).unwrap();
        pact.set_current_source("other test");
        pact.record(candidate(Some("list"), "/todos", json!([1]))).unwrap();
        let again = pact.record(candidate(Some("list"), "/todos", json!([1]))).unwrap();

        assert!(!again.is_appended());
        assert_eq!(pact.len(), 2);
    }

    #[test]
    fn test_prefix_sharing_descriptions_are_distinct() {
        let mut pact = ledger(SpecVersion::V2, PactOptions::default().with_deterministic(true));
        pact.record(candidate(Some("get todos"), "/todos", json!([]))).unwrap();
        pact.record(candidate(Some("get todo"), "/todos/1", json!({}))).unwrap();
        assert_eq!(pact.len(), 2);
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let mut pact = ledger(SpecVersion::V4, PactOptions::default());
        let err = pact.record(candidate(Some("x"), "/x", json!(1))).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::VersionMismatch { expected: SpecVersion::V4, found: SpecVersion::V2 }
        ));
        assert!(pact.is_empty());
    }

    #[test]
    fn test_generate_pact_file_is_pure() {
        let mut pact = ledger(SpecVersion::V2, PactOptions::default());
        pact.record(candidate(Some("list"), "/todos", json!([]))).unwrap();
        assert_eq!(pact.generate_pact_file(), pact.generate_pact_file());
        assert_eq!(pact.len(), 1);
    }

    #[test]
    fn test_reset_roundtrip_and_clear() {
        let mut pact = ledger(SpecVersion::V2, PactOptions::default());
        pact.record(candidate(Some("a"), "/a", json!(1))).unwrap();
        pact.record(candidate(Some("b"), "/b", json!(2))).unwrap();
        let file = pact.generate_pact_file();

        pact.reset(Some(file.clone()));
        assert_eq!(pact.generate_pact_file().interactions, file.interactions);

        pact.reset(None);
        assert!(pact.is_empty());
    }

    #[test]
    fn test_reset_discards_other_tier() {
        let mut v2 = ledger(SpecVersion::V2, PactOptions::default());
        v2.record(candidate(Some("a"), "/a", json!(1))).unwrap();
        let mut v3 = ledger(SpecVersion::V3, PactOptions::default());

        v3.reset(Some(v2.generate_pact_file()));
        assert!(v3.is_empty());
    }

    #[test]
    fn test_object_key_order_does_not_conflict() {
        let mut pact = ledger(SpecVersion::V2, PactOptions::default().with_deterministic(true));
        let first: serde_json::Value = serde_json::from_str(r#"{"a":1,"b":2}"#).unwrap();
        let second: serde_json::Value = serde_json::from_str(r#"{"b":2,"a":1}"#).unwrap();
        pact.record(candidate(Some("obj"), "/o", first)).unwrap();
        let outcome = pact.record(candidate(Some("obj"), "/o", second)).unwrap();
        assert!(!outcome.is_appended());
    }
}
