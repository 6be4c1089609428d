//! Pact file persistence.

use crate::contract::PactFile;
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::Pact;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Storage for serialized pact files.
pub trait PactStore: Send + Sync {
    /// Read the pact file at `path`.
    ///
    /// Absence or any read/parse failure yields `None`.
    fn read(&self, path: &Path) -> Option<PactFile>;

    /// Serialize `pact` and store it at [`Pact::file_name`].
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written.
    fn write(&self, pact: &Pact) -> LedgerResult<PathBuf>;

    /// Remove the stored file of `pact`. Returns whether one existed.
    ///
    /// # Errors
    ///
    /// Returns error if an existing file cannot be removed.
    fn delete(&self, pact: &Pact) -> LedgerResult<bool>;
}

/// File-system store writing pretty-printed JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilePactStore;

impl PactStore for FilePactStore {
    fn read(&self, path: &Path) -> Option<PactFile> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No previous pact file");
                return None;
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Cannot read pact file");
                return None;
            }
        };
        PactFile::from_slice(&bytes)
            .inspect_err(|err| {
                warn!(path = %path.display(), error = %err, "Ignoring invalid pact file");
            })
            .ok()
    }

    fn write(&self, pact: &Pact) -> LedgerResult<PathBuf> {
        let path = pact.file_name();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| LedgerError::io(dir, e))?;
        }
        let content = pact.generate_pact_file().to_json_pretty()?;
        fs::write(&path, content).map_err(|e| LedgerError::io(&path, e))?;
        info!(
            pact = %pact.name(),
            path = %path.display(),
            interactions = pact.len(),
            "Pact file written"
        );
        Ok(path)
    }

    fn delete(&self, pact: &Pact) -> LedgerResult<bool> {
        let path = pact.file_name();
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(LedgerError::io(path, err)),
        }
    }
}

impl<S: PactStore + ?Sized> PactStore for Arc<S> {
    fn read(&self, path: &Path) -> Option<PactFile> {
        (**self).read(path)
    }

    fn write(&self, pact: &Pact) -> LedgerResult<PathBuf> {
        (**self).write(pact)
    }

    fn delete(&self, pact: &Pact) -> LedgerResult<bool> {
        (**self).delete(pact)
    }
}

/// Reset `pact` from its stored file. Returns the number of interactions loaded.
pub fn reload_pact<S: PactStore + ?Sized>(store: &S, pact: &mut Pact) -> usize {
    pact.reset(store.read(&pact.file_name()));
    pact.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PactOptions;
    use crate::ledger::{PactDefinition, RecordOutcome};
    use crate::schema::{
        InteractionOptions, MockResponse, RecordedRequest, SpecVersion, build_interaction,
    };
    use serde_json::json;

    fn pact_in(dir: &Path, version: SpecVersion) -> Pact {
        Pact::new(
            PactDefinition::new("test-consumer", "todo-service").with_version(version.as_str()),
            PactOptions::default().with_output_dir(dir.join("nested/pacts")),
        )
        .unwrap()
    }

    fn record_todo(pact: &mut Pact) {
        let interaction = build_interaction(
            pact.version(),
            RecordedRequest::new("GET", "/todos"),
            MockResponse::ok(json!([{ "id": 1, "title": "write tests" }])),
            &InteractionOptions::default(),
        );
        pact.record(interaction).unwrap();
    }

    #[test]
    fn test_write_creates_directories_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let mut pact = pact_in(dir.path(), SpecVersion::V3);
        record_todo(&mut pact);

        let path = FilePactStore.write(&pact).unwrap();
        assert!(path.ends_with("nested/pacts/test-consumer-todo-service.json"));

        let mut reloaded = pact_in(dir.path(), SpecVersion::V3);
        assert_eq!(reload_pact(&FilePactStore, &mut reloaded), 1);
        assert_eq!(reloaded.interactions(), pact.interactions());
    }

    #[test]
    fn test_missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FilePactStore.read(&dir.path().join("absent.json")).is_none());
    }

    #[test]
    fn test_invalid_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(FilePactStore.read(&path).is_none());
    }

    #[test]
    fn test_delete_reports_existence() {
        let dir = tempfile::tempdir().unwrap();
        let mut pact = pact_in(dir.path(), SpecVersion::V2);
        record_todo(&mut pact);

        assert!(!FilePactStore.delete(&pact).unwrap());
        FilePactStore.write(&pact).unwrap();
        assert!(FilePactStore.delete(&pact).unwrap());
        assert!(!pact.file_name().exists());
    }

    #[test]
    fn test_null_body_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let deterministic = |dir: &Path| {
            Pact::new(
                PactDefinition::new("test-consumer", "todo-service").with_version("2.0.0"),
                PactOptions::default()
                    .with_output_dir(dir)
                    .with_deterministic(true),
            )
            .unwrap()
        };
        let delete_todo = || {
            build_interaction(
                SpecVersion::V2,
                RecordedRequest::new("DELETE", "/todos/1"),
                MockResponse::ok(json!(null)),
                &InteractionOptions::default().with_description("delete todo"),
            )
        };

        let mut pact = deterministic(dir.path());
        pact.record(delete_todo()).unwrap();
        FilePactStore.write(&pact).unwrap();
        let written: serde_json::Value =
            serde_json::from_slice(&fs::read(pact.file_name()).unwrap()).unwrap();
        assert!(written["interactions"][0]["response"]["body"].is_null());
        assert!(written["interactions"][0]["response"].get("body").is_some());

        let mut reloaded = deterministic(dir.path());
        assert_eq!(reload_pact(&FilePactStore, &mut reloaded), 1);
        assert_eq!(reloaded.interactions(), pact.interactions());
        let outcome = reloaded.record(delete_todo()).unwrap();
        assert_eq!(
            outcome,
            RecordOutcome::Duplicate {
                description: "delete todo".into()
            }
        );
        assert_eq!(reloaded.len(), 1);
    }
}
