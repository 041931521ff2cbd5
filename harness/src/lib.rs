//! # Testbed Harness
//!
//! Fixture-scoped test-context harness for chain-style test suites.
//!
//! The harness wires three things together:
//!
//! - **Account provisioning** — splits the environment's ordered identity
//!   pool into one deployer plus an accounts pool ([`provision_accounts`]).
//! - **Fixture cache** — runs each deploy fixture at most once per process,
//!   snapshots environment state after the first success, and rolls back to
//!   that snapshot on every replay ([`FixtureCache`]).
//! - **Suite execution** — a declarative tree of suites and cases; every
//!   suite gets a fresh [`TestContext`] from its setup hook before the first
//!   case runs ([`Suite`], [`Runner`]).
//!
//! The execution environment (identity provider + snapshotting backend) is
//! injected behind the [`Environment`] trait; `testbed-memchain` provides an
//! in-memory implementation.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use testbed_harness::prelude::*;
//!
//! async fn deploy_token(env: Arc<MemoryChain>) -> anyhow::Result<TokenBundle> {
//!     // deploy, seed initial balances...
//!     # unimplemented!()
//! }
//!
//! let report = Runner::new(env)
//!     .register(
//!         Suite::new("token unit tests")
//!             .case("mints to an account", |cx| async move {
//!                 let bundle = cx.load_fixture(deploy_token).await?;
//!                 // assertions against a pristine post-deploy state,
//!                 // regardless of what earlier cases mutated
//!                 Ok(())
//!             }),
//!     )
//!     .run()
//!     .await?;
//! assert!(report.passed());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod accounts;
pub mod artifacts;
pub mod context;
pub mod environment;
pub mod error;
pub mod fixture;
pub mod report;
pub mod runner;
pub mod suite;
pub mod types;

// Convenient re-exports for common usage
pub mod prelude;

pub use accounts::{provision_accounts, AccountSet};
pub use context::{ContractRegistry, TestContext};
pub use environment::Environment;
pub use error::{EnvironmentError, FixtureError, RestoreError};
pub use fixture::{FixtureCache, FixtureKey};
pub use report::{CaseOutcome, CaseStatus, RunReport, SuiteReport};
pub use runner::Runner;
pub use suite::Suite;
pub use types::{Address, Identity, SnapshotToken, ADDRESS_LEN};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
