//! # Testbed Memchain
//!
//! In-memory chain environment for the `testbed-harness` test harness.
//!
//! Provides deterministic, seed-derived identities, balance transfers,
//! contract deployment with key/value storage, clock-driven block
//! timestamps, and exact full-state snapshot/restore. Implements the
//! harness's `Environment` trait, so it can back fixture caching and
//! account provisioning end to end without any external node.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use testbed_memchain::MemoryChainBuilder;
//!
//! let chain = Arc::new(
//!     MemoryChainBuilder::new()
//!         .with_identity_count(5)
//!         .with_seed(42)
//!         .build(),
//! );
//! let report = Runner::new(chain).register(suite).run().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Clock abstractions for deterministic block timestamps.
pub mod clock;

mod builder;
mod chain;
mod state;

pub use builder::{MemoryChainBuilder, SEED_ENV};
pub use chain::{ChainError, ContractHandle, MemoryChain};
pub use clock::{Clock, PausedClock, SystemClock};
pub use state::AccountState;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
