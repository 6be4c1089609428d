//! Provider registry.
//!
//! Holds at most one ledger per provider name for its lifetime. The registry
//! is an explicitly owned value: whoever drives a test run creates it and
//! clears it when the run ends.

use crate::config::{PactOptions, ResolvedEnvironment};
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::Pact;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Ledger shared between the registry and its callers.
pub type SharedPact = Arc<Mutex<Pact>>;

type Initializer = Box<dyn Fn(&mut Pact) + Send + Sync>;

/// Keyed store of one ledger per provider name.
pub struct ProviderRegistry {
    environment: ResolvedEnvironment,
    pacts: Mutex<BTreeMap<String, SharedPact>>,
    initializer: Option<Initializer>,
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("environment", &self.environment)
            .field("providers", &self.pacts.lock().keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl ProviderRegistry {
    /// Create an empty registry provisioning ledgers from `environment`.
    #[must_use]
    pub fn new(environment: ResolvedEnvironment) -> Self {
        Self {
            environment,
            pacts: Mutex::new(BTreeMap::new()),
            initializer: None,
        }
    }

    /// Run `init` on every ledger this registry creates.
    #[must_use]
    pub fn with_initializer<F>(mut self, init: F) -> Self
    where
        F: Fn(&mut Pact) + Send + Sync + 'static,
    {
        self.initializer = Some(Box::new(init));
        self
    }

    /// Environment ledgers are provisioned from.
    #[must_use]
    pub const fn environment(&self) -> &ResolvedEnvironment {
        &self.environment
    }

    /// Register a ledger under `name`, replacing any previous one.
    pub fn register(&self, name: impl Into<String>, pact: Pact) -> SharedPact {
        let shared = Arc::new(Mutex::new(pact));
        self.pacts.lock().insert(name.into(), Arc::clone(&shared));
        shared
    }

    /// Ledger registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<SharedPact> {
        self.pacts.lock().get(name).cloned()
    }

    /// Ledger registered under `name`, or an error.
    ///
    /// # Errors
    ///
    /// Returns error if no ledger is registered under `name`.
    pub fn require(&self, name: &str) -> LedgerResult<SharedPact> {
        self.get(name)
            .ok_or_else(|| LedgerError::unknown_provider(name))
    }

    /// Existing ledger for `name`, or a new one from the environment.
    ///
    /// # Errors
    ///
    /// Returns error if a new ledger cannot be constructed.
    pub fn get_or_create(&self, name: &str) -> LedgerResult<SharedPact> {
        self.get_or_create_with(name, &PactOptions::default())
    }

    /// Like [`Self::get_or_create`], with call-site options for a new ledger.
    ///
    /// Options are ignored when the ledger already exists. A new ledger is
    /// built and initialized without holding the registry lock, so the
    /// initializer may itself use the registry. When two callers race on the
    /// same name, the first ledger inserted wins.
    ///
    /// # Errors
    ///
    /// Returns error if a new ledger cannot be constructed.
    pub fn get_or_create_with(&self, name: &str, options: &PactOptions) -> LedgerResult<SharedPact> {
        if let Some(existing) = self.get(name) {
            return Ok(existing);
        }

        let mut pact = self.environment.create_pact(name, options)?;
        if let Some(init) = &self.initializer {
            init(&mut pact);
        }
        let mut pacts = self.pacts.lock();
        let shared = pacts
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(pact)));
        Ok(Arc::clone(shared))
    }

    /// Every ledger, ordered by provider name.
    #[must_use]
    pub fn all(&self) -> Vec<SharedPact> {
        self.pacts.lock().values().cloned().collect()
    }

    /// Number of ledgers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pacts.lock().len()
    }

    /// Whether no ledger exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pacts.lock().is_empty()
    }

    /// Reset every ledger and forget them all.
    pub fn clear(&self) {
        let pacts = std::mem::take(&mut *self.pacts.lock());
        for pact in pacts.values() {
            pact.lock().reset(None);
        }
    }
}
