//! Shared per-suite test context.
//!
//! The runner builds one `TestContext` per top-level suite and hands every
//! case a clone of it. Clones are cheap handles over shared interior state,
//! so a handle stored into `contracts` by one case is visible to the sibling
//! cases that run after it — and to nothing outside the suite.

use std::any::Any;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::accounts::AccountSet;
use crate::environment::Environment;
use crate::error::FixtureError;
use crate::fixture::{FixtureCache, FixtureKey};
use crate::types::Identity;

/// Insertion-ordered, type-erased map of named contract handles.
///
/// Starts empty at suite setup; populated only by cases running within that
/// suite. Lookups are typed: `get::<T>` returns `None` when the name is
/// absent or was stored at a different type.
#[derive(Clone, Default)]
pub struct ContractRegistry {
    inner: Arc<RwLock<IndexMap<String, Arc<dyn Any + Send + Sync>>>>,
}

impl ContractRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `handle` under `name`, replacing any previous entry.
    pub fn insert<T: Send + Sync + 'static>(&self, name: impl Into<String>, handle: T) {
        self.inner.write().insert(name.into(), Arc::new(handle));
    }

    /// Fetch the handle stored under `name`, if present and of type `T`.
    pub fn get<T: Send + Sync + 'static>(&self, name: &str) -> Option<Arc<T>> {
        let guard = self.inner.read();
        let handle = guard.get(name)?.clone();
        drop(guard);
        handle.downcast::<T>().ok()
    }

    /// Whether a handle is stored under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.inner.read().contains_key(name)
    }

    /// Registered names, in insertion order.
    pub fn names(&self) -> Vec<String> {
        self.inner.read().keys().cloned().collect()
    }

    /// Number of registered handles.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

/// Per-suite execution context handed to every case.
///
/// Carries the provisioned signers, the suite's contract registry, and the
/// process-wide fixture cache. Cloning shares all three.
pub struct TestContext<E> {
    signers: Arc<AccountSet>,
    contracts: ContractRegistry,
    fixtures: Arc<FixtureCache<E>>,
}

impl<E> Clone for TestContext<E> {
    fn clone(&self) -> Self {
        Self {
            signers: self.signers.clone(),
            contracts: self.contracts.clone(),
            fixtures: self.fixtures.clone(),
        }
    }
}

impl<E: Environment> TestContext<E> {
    /// Build a fresh context with an empty contract registry.
    pub fn new(signers: AccountSet, fixtures: Arc<FixtureCache<E>>) -> Self {
        Self {
            signers: Arc::new(signers),
            contracts: ContractRegistry::new(),
            fixtures,
        }
    }

    /// The suite's provisioned signers.
    pub fn signers(&self) -> &AccountSet {
        &self.signers
    }

    /// Shorthand for the deployer identity.
    pub fn deployer(&self) -> &Identity {
        &self.signers.deployer
    }

    /// Shorthand for the non-deployer identity pool.
    pub fn accounts(&self) -> &[Identity] {
        &self.signers.accounts
    }

    /// The suite's contract registry.
    pub fn contracts(&self) -> &ContractRegistry {
        &self.contracts
    }

    /// The environment behind the fixture cache.
    pub fn env(&self) -> &Arc<E> {
        self.fixtures.env()
    }

    /// Load a fixture through the process-wide cache. See
    /// [`FixtureCache::load`] for the memoization and rollback contract.
    pub async fn load_fixture<T, F, Fut>(&self, factory: F) -> Result<Arc<T>, FixtureError>
    where
        T: Send + Sync + 'static,
        F: FnOnce(Arc<E>) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = anyhow::Result<T>> + Send,
    {
        self.fixtures.load(factory).await
    }

    /// Load a fixture under an explicit key.
    pub async fn load_fixture_keyed<T, F, Fut>(
        &self,
        key: FixtureKey,
        factory: F,
    ) -> Result<Arc<T>, FixtureError>
    where
        T: Send + Sync + 'static,
        F: FnOnce(Arc<E>) -> Fut + Send,
        Fut: std::future::Future<Output = anyhow::Result<T>> + Send,
    {
        self.fixtures.load_keyed(key, factory).await
    }
}
