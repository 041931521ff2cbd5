//! Run reports: what executed, what passed, how long it took.

use serde::Serialize;

/// Outcome status of one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CaseStatus {
    /// The case body returned `Ok`.
    Passed,
    /// The case body returned an error.
    Failed {
        /// Rendered error chain.
        reason: String,
    },
}

/// Result of one executed case.
#[derive(Debug, Clone, Serialize)]
pub struct CaseOutcome {
    /// Case name as declared.
    pub name: String,
    /// Pass/fail status.
    #[serde(flatten)]
    pub status: CaseStatus,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl CaseOutcome {
    /// Whether the case passed.
    pub fn passed(&self) -> bool {
        matches!(self.status, CaseStatus::Passed)
    }
}

/// Results of one suite, cases in declaration order.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    /// Suite name as declared.
    pub name: String,
    /// Per-case outcomes.
    pub cases: Vec<CaseOutcome>,
}

impl SuiteReport {
    /// Whether every case in the suite passed.
    pub fn passed(&self) -> bool {
        self.cases.iter().all(CaseOutcome::passed)
    }
}

/// Results of a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Per-suite reports, in registration order.
    pub suites: Vec<SuiteReport>,
}

impl RunReport {
    /// Whether every case in every suite passed.
    pub fn passed(&self) -> bool {
        self.suites.iter().all(SuiteReport::passed)
    }

    /// Total number of executed cases.
    pub fn total_cases(&self) -> usize {
        self.suites.iter().map(|s| s.cases.len()).sum()
    }

    /// Failed cases as `(suite, case, reason)` triples.
    pub fn failures(&self) -> Vec<(&str, &str, &str)> {
        let mut out = Vec::new();
        for suite in &self.suites {
            for case in &suite.cases {
                if let CaseStatus::Failed { reason } = &case.status {
                    out.push((suite.name.as_str(), case.name.as_str(), reason.as_str()));
                }
            }
        }
        out
    }
}
