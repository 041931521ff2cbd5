//! Error taxonomy for the harness.
//!
//! Environment-level failures get structured variants; fixture factory
//! failures stay as `anyhow` payloads since factories are caller-supplied
//! test code.

use thiserror::Error;

use crate::fixture::FixtureKey;
use crate::types::SnapshotToken;

/// Failure while talking to the ambient execution environment.
#[derive(Debug, Error)]
pub enum EnvironmentError {
    /// The environment exposes no signing identities; fatal for the run,
    /// since no `AccountSet` can be constructed.
    #[error("environment exposes no signing identities")]
    NoIdentities,

    /// Any other backend-specific failure.
    #[error("environment backend failure: {0}")]
    Backend(String),
}

/// Failure while restoring a state snapshot.
#[derive(Debug, Error)]
pub enum RestoreError {
    /// The token does not name a snapshot known to the environment.
    #[error("unknown {0}")]
    UnknownSnapshot(SnapshotToken),

    /// Backend-specific restore failure; state may be torn, so the cache
    /// entry that held the token must not be served again.
    #[error("snapshot restore failed: {0}")]
    Backend(String),
}

/// Failure surfaced by [`FixtureCache::load`](crate::FixtureCache::load).
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The fixture factory itself failed. Not cached: the next call with the
    /// same key re-attempts the factory.
    #[error("fixture factory failed")]
    Factory(#[source] anyhow::Error),

    /// Checkpointing or identity enumeration failed.
    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    /// Restoring the cached snapshot failed; the entry has been invalidated
    /// so the next call re-runs the factory from scratch.
    #[error(transparent)]
    Restore(#[from] RestoreError),

    /// The key already holds a result of a different type. Only reachable
    /// when reusing an explicit key via `load_keyed` at two types.
    #[error("fixture {key} was cached with a different result type")]
    TypeMismatch {
        /// The offending key.
        key: FixtureKey,
    },
}
