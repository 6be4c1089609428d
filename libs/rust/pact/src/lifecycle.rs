//! Test-run lifecycle.
//!
//! A [`TestRun`] ties the registry, the interceptor and a store together:
//! ledgers are reloaded from their persisted file when first used, tagged
//! with the running test's title, and written back when the run finishes.

use crate::config::{PactOptions, ResolvedEnvironment};
use crate::error::LedgerResult;
use crate::interceptor::Interceptor;
use crate::registry::{ProviderRegistry, SharedPact};
use crate::store::{FilePactStore, PactStore, reload_pact};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// One test run over a shared registry.
#[derive(Debug)]
pub struct TestRun<S: PactStore = FilePactStore> {
    registry: Arc<ProviderRegistry>,
    interceptor: Interceptor,
    store: Arc<S>,
    current_test: Arc<Mutex<Option<String>>>,
}

impl<S: PactStore + 'static> TestRun<S> {
    /// Start a run provisioning ledgers from `environment`.
    #[must_use]
    pub fn start(environment: ResolvedEnvironment, store: S) -> Self {
        let store = Arc::new(store);
        let current_test: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));

        let registry = ProviderRegistry::new(environment).with_initializer({
            let store = Arc::clone(&store);
            let current_test = Arc::clone(&current_test);
            move |pact| {
                let loaded = reload_pact(store.as_ref(), pact);
                if let Some(title) = current_test.lock().as_deref() {
                    pact.set_current_source(title);
                }
                debug!(pact = %pact.name(), loaded, "Ledger provisioned");
            }
        });
        let registry = Arc::new(registry);
        info!(
            consumer = %registry.environment().consumer_name,
            version = %registry.environment().pact_version,
            "Test run started"
        );

        Self {
            interceptor: Interceptor::new(Arc::clone(&registry)),
            registry,
            store,
            current_test,
        }
    }

    /// Registry of this run.
    #[must_use]
    pub const fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// Interceptor recording into this run's registry.
    #[must_use]
    pub const fn interceptor(&self) -> &Interceptor {
        &self.interceptor
    }

    /// Store ledgers are reloaded from and written to.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Ledger for `name`, created and reloaded on first use.
    ///
    /// # Errors
    ///
    /// Returns error if a new ledger cannot be constructed.
    pub fn provider(&self, name: &str) -> LedgerResult<SharedPact> {
        self.registry.get_or_create(name)
    }

    /// Like [`Self::provider`], with call-site options for a new ledger.
    ///
    /// # Errors
    ///
    /// Returns error if a new ledger cannot be constructed.
    pub fn provider_with(&self, name: &str, options: &PactOptions) -> LedgerResult<SharedPact> {
        self.registry.get_or_create_with(name, options)
    }

    /// Mark `title` as the running test on every ledger, present and future.
    pub fn enter_test(&self, title: impl Into<String>) {
        let title = title.into();
        *self.current_test.lock() = Some(title.clone());
        for pact in self.registry.all() {
            pact.lock().set_current_source(title.as_str());
        }
    }

    /// Title of the running test.
    #[must_use]
    pub fn current_test(&self) -> Option<String> {
        self.current_test.lock().clone()
    }

    /// Flush deferred recordings, write every ledger and clear the registry.
    ///
    /// Returns the written paths, ordered by provider name.
    ///
    /// # Errors
    ///
    /// Returns error on the first ledger that cannot be written; the
    /// registry is left untouched in that case.
    pub async fn finish(self) -> LedgerResult<Vec<PathBuf>> {
        let flushed = self.interceptor.flush().await;
        let written = self
            .registry
            .all()
            .iter()
            .map(|pact| self.store.write(&pact.lock()))
            .collect::<LedgerResult<Vec<_>>>()?;

        self.registry.clear();
        info!(pacts = written.len(), flushed, "Test run finished");
        Ok(written)
    }
}
