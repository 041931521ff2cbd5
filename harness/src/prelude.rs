//! One-stop imports for suite modules.
//!
//! ```rust,ignore
//! use testbed_harness::prelude::*;
//! ```

pub use std::sync::Arc;

pub use anyhow::{Context as _, Result};

pub use crate::accounts::{provision_accounts, AccountSet};
pub use crate::context::{ContractRegistry, TestContext};
pub use crate::environment::Environment;
pub use crate::error::{EnvironmentError, FixtureError, RestoreError};
pub use crate::fixture::{FixtureCache, FixtureKey};
pub use crate::report::{CaseStatus, RunReport};
pub use crate::runner::Runner;
pub use crate::suite::Suite;
pub use crate::types::{Address, Identity, SnapshotToken};
