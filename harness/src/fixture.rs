//! Memoizing fixture cache with snapshot-backed replay.
//!
//! A fixture is an expensive async setup routine (typically "deploy a bundle
//! of contracts"). The cache runs each distinct fixture at most once per
//! process, captures an environment snapshot immediately after the first
//! successful run, and on every replay rolls the environment back to that
//! snapshot before handing out the cached result. Tests that share a fixture
//! therefore always observe the same starting state, no matter what earlier
//! cases mutated.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::environment::Environment;
use crate::error::FixtureError;
use crate::types::SnapshotToken;

/// Identity of a fixture factory.
///
/// The cache keys entries by factory identity, not by behavior: two
/// syntactically identical closures are distinct keys, while the same
/// function item passed twice is one key. [`FixtureKey::of`] derives the key
/// from the factory's type, which gives exactly that equivalence. Callers
/// that need to share an entry across differently-typed factories can opt
/// into an explicit [`FixtureKey::named`] key instead.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FixtureKey {
    repr: KeyRepr,
    label: &'static str,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum KeyRepr {
    Factory(TypeId),
    Named(&'static str),
}

impl FixtureKey {
    /// Key derived from the factory's type identity.
    pub fn of<F: 'static>() -> Self {
        Self {
            repr: KeyRepr::Factory(TypeId::of::<F>()),
            label: std::any::type_name::<F>(),
        }
    }

    /// Explicit caller-chosen key.
    pub const fn named(name: &'static str) -> Self {
        Self {
            repr: KeyRepr::Named(name),
            label: name,
        }
    }
}

impl fmt::Display for FixtureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fixture `{}`", self.label)
    }
}

type Stored = (Arc<dyn Any + Send + Sync>, SnapshotToken);

/// One cache entry. The tokio mutex is the per-key serialization point:
/// concurrent callers for the same key queue here, so a factory can never
/// run twice for one key.
#[derive(Default)]
struct Entry {
    slot: tokio::sync::Mutex<Option<Stored>>,
}

/// Process-wide fixture cache bound to one environment.
///
/// Deliberately suite-spanning: a fixture loaded in one suite and requested
/// again elsewhere (same factory identity) hits the cache. That is the
/// performance trade-off the harness is built around.
pub struct FixtureCache<E> {
    env: Arc<E>,
    entries: Mutex<HashMap<FixtureKey, Arc<Entry>>>,
}

impl<E: Environment> FixtureCache<E> {
    /// Create a cache bound to `env`.
    pub fn new(env: Arc<E>) -> Self {
        Self {
            env,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The environment this cache snapshots and restores.
    pub fn env(&self) -> &Arc<E> {
        &self.env
    }

    /// Load a fixture, keyed by the factory's type identity.
    ///
    /// First call per key: runs the factory, checkpoints the environment
    /// after success, caches `(result, token)`. A factory failure is
    /// propagated and *not* cached, so a later call re-attempts the setup.
    ///
    /// Later calls: restore the environment to the cached snapshot, take a
    /// fresh checkpoint to re-arm the entry (EVM-style backends consume a
    /// snapshot on revert), and return the cached result without re-running
    /// the factory. A failed restore invalidates the entry and surfaces
    /// [`FixtureError::Restore`]; the next call starts from scratch.
    pub async fn load<T, F, Fut>(&self, factory: F) -> Result<Arc<T>, FixtureError>
    where
        T: Send + Sync + 'static,
        F: FnOnce(Arc<E>) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send,
    {
        self.load_keyed(FixtureKey::of::<F>(), factory).await
    }

    /// Load a fixture under an explicit key. Same contract as [`load`](Self::load).
    pub async fn load_keyed<T, F, Fut>(
        &self,
        key: FixtureKey,
        factory: F,
    ) -> Result<Arc<T>, FixtureError>
    where
        T: Send + Sync + 'static,
        F: FnOnce(Arc<E>) -> Fut + Send,
        Fut: Future<Output = anyhow::Result<T>> + Send,
    {
        // Entry map lock is never held across an await point.
        let entry = self.entries.lock().entry(key).or_default().clone();
        let mut slot = entry.slot.lock().await;

        let cached = slot.as_ref().map(|(value, token)| (value.clone(), *token));
        if let Some((value, token)) = cached {
            match self.env.restore(token).await {
                Ok(()) => {
                    let fresh = self.env.checkpoint().await?;
                    *slot = Some((value.clone(), fresh));
                    debug!(%key, %token, "fixture replayed from snapshot");
                    value
                        .downcast::<T>()
                        .map_err(|_| FixtureError::TypeMismatch { key })
                }
                Err(err) => {
                    *slot = None;
                    warn!(%key, %token, error = %err, "snapshot restore failed; entry invalidated");
                    Err(FixtureError::Restore(err))
                }
            }
        } else {
            debug!(%key, "fixture miss; running factory");
            let value = factory(self.env.clone())
                .await
                .map_err(FixtureError::Factory)?;
            let value = Arc::new(value);
            let token = self.env.checkpoint().await?;
            *slot = Some((value.clone() as Arc<dyn Any + Send + Sync>, token));
            debug!(%key, %token, "fixture cached");
            Ok(value)
        }
    }

    /// Drop the entry for `key`, forcing the next load to re-run its factory.
    pub fn invalidate(&self, key: FixtureKey) -> bool {
        self.entries.lock().remove(&key).is_some()
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
