//! The environment seam.
//!
//! Everything the harness needs from the ambient execution environment is
//! behind one injectable trait: an ordered pool of signing identities plus a
//! transactional checkpoint primitive. Production-grade chain backends and
//! in-memory test doubles both fit behind it.

use async_trait::async_trait;

use crate::error::{EnvironmentError, RestoreError};
use crate::types::{Identity, SnapshotToken};

/// Ambient execution environment: identity provider + snapshotting backend.
///
/// # Contract
///
/// - `identities` returns the full pool in a stable order; the harness
///   never reorders it.
/// - `restore(token)` must be exact: reads after a successful restore
///   observe state identical to the moment `checkpoint` minted `token`.
/// - Tokens stay valid for the lifetime of the environment unless a restore
///   of that token fails, in which case callers discard it.
#[async_trait]
pub trait Environment: Send + Sync + 'static {
    /// The ordered list of available signing identities.
    async fn identities(&self) -> Result<Vec<Identity>, EnvironmentError>;

    /// Capture the current mutable state, returning a token that can be
    /// handed back to [`restore`](Self::restore).
    async fn checkpoint(&self) -> Result<SnapshotToken, EnvironmentError>;

    /// Roll mutable state back to the capture named by `token`.
    async fn restore(&self, token: SnapshotToken) -> Result<(), RestoreError>;
}
