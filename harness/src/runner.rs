//! Suite execution.
//!
//! The runner owns the environment handle and one process-wide
//! [`FixtureCache`]. For each registered suite it runs the setup hook
//! (provision accounts, build a fresh [`TestContext`]) to completion before
//! the first case, then executes cases sequentially in declaration order.
//! A failing case is recorded and its siblings still run; a failing setup
//! hook aborts the whole run.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};

use crate::accounts::provision_accounts;
use crate::artifacts::{ArtifactWriter, CaseArtifact};
use crate::context::TestContext;
use crate::environment::Environment;
use crate::error::EnvironmentError;
use crate::fixture::FixtureCache;
use crate::report::{CaseOutcome, CaseStatus, RunReport, SuiteReport};
use crate::suite::Suite;

/// Executes registered suites against one environment.
///
/// # Example
///
/// ```rust,ignore
/// let report = Runner::new(env)
///     .register(token_suite())
///     .register(timelock_suite())
///     .run()
///     .await?;
/// assert!(report.passed());
/// ```
pub struct Runner<E> {
    env: Arc<E>,
    fixtures: Arc<FixtureCache<E>>,
    suites: Vec<Suite<E>>,
    artifacts: Option<ArtifactWriter>,
    seed: Option<u64>,
}

impl<E: Environment> Runner<E> {
    /// Runner over `env` with an empty suite tree.
    pub fn new(env: Arc<E>) -> Self {
        let fixtures = Arc::new(FixtureCache::new(env.clone()));
        Self {
            env,
            fixtures,
            suites: Vec::new(),
            artifacts: None,
            seed: None,
        }
    }

    /// Register a suite. Suites execute in registration order.
    pub fn register(mut self, suite: Suite<E>) -> Self {
        self.suites.push(suite);
        self
    }

    /// Write a JSON artifact into `dir` for every failed case.
    pub fn with_artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts = Some(ArtifactWriter::new(dir));
        self
    }

    /// Record the environment's seed in failure artifacts, so a failed case
    /// can be replayed against an identically-provisioned environment.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The process-wide fixture cache shared by all suites in this run.
    pub fn fixtures(&self) -> &Arc<FixtureCache<E>> {
        &self.fixtures
    }

    /// Execute all registered suites.
    ///
    /// # Errors
    ///
    /// Only account provisioning failures abort the run; case failures are
    /// recorded in the returned [`RunReport`].
    pub async fn run(&self) -> Result<RunReport, EnvironmentError> {
        let mut suites = Vec::with_capacity(self.suites.len());

        for suite in &self.suites {
            info!(suite = %suite.name(), cases = suite.len(), "suite setup");

            // Setup hook: completes fully before the first case. Each suite
            // gets its own context; only the fixture cache spans suites.
            let signers = provision_accounts(self.env.as_ref()).await?;
            let cx = TestContext::new(signers, self.fixtures.clone());

            let mut cases = Vec::with_capacity(suite.len());
            for case in &suite.cases {
                info!(suite = %suite.name(), case = %case.name, "running case");
                let start = Instant::now();
                let result = (case.body)(cx.clone()).await;
                let duration_ms = start.elapsed().as_millis() as u64;

                let status = match result {
                    Ok(()) => CaseStatus::Passed,
                    Err(err) => {
                        let reason = format!("{err:#}");
                        error!(suite = %suite.name(), case = %case.name, %reason, "case failed");
                        self.record_failure(suite.name(), &case.name, &reason, duration_ms)
                            .await;
                        CaseStatus::Failed { reason }
                    }
                };

                cases.push(CaseOutcome {
                    name: case.name.clone(),
                    status,
                    duration_ms,
                });
            }

            suites.push(SuiteReport {
                name: suite.name().to_string(),
                cases,
            });
        }

        let report = RunReport { suites };
        info!(
            total = report.total_cases(),
            failed = report.failures().len(),
            "run finished"
        );
        Ok(report)
    }

    async fn record_failure(&self, suite: &str, case: &str, reason: &str, duration_ms: u64) {
        let Some(writer) = &self.artifacts else {
            return;
        };
        let artifact = CaseArtifact::new(suite, case, reason, self.seed, duration_ms);
        match writer.write(&artifact).await {
            Ok(path) => info!(path = %path.display(), "failure artifact written"),
            Err(err) => warn!(error = %format!("{err:#}"), "failed to write artifact"),
        }
    }
}
