//! Failure artifact collection.
//!
//! When a case fails, the runner can drop a small JSON artifact into a
//! caller-supplied directory: enough metadata (names, rendered error,
//! timestamp, seed if known) to reproduce the failure later.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Metadata captured for one failed case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseArtifact {
    /// Suite the case belongs to.
    pub suite: String,
    /// Case name as declared.
    pub case: String,
    /// Rendered error chain.
    pub failure: String,
    /// RFC 3339 timestamp of the failure.
    pub timestamp: String,
    /// Environment seed, when the caller provided one for replay.
    pub seed: Option<u64>,
    /// Case duration in milliseconds.
    pub duration_ms: u64,
}

impl CaseArtifact {
    /// Build an artifact stamped with the current time.
    pub fn new(
        suite: impl Into<String>,
        case: impl Into<String>,
        failure: impl Into<String>,
        seed: Option<u64>,
        duration_ms: u64,
    ) -> Self {
        Self {
            suite: suite.into(),
            case: case.into(),
            failure: failure.into(),
            timestamp: Utc::now().to_rfc3339(),
            seed,
            duration_ms,
        }
    }
}

/// Writes [`CaseArtifact`]s as pretty-printed JSON files.
pub struct ArtifactWriter {
    dir: PathBuf,
}

impl ArtifactWriter {
    /// Writer rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory artifacts land in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write one artifact, returning the path it landed at.
    pub async fn write(&self, artifact: &CaseArtifact) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("creating artifact dir {}", self.dir.display()))?;

        let file_name = format!(
            "{}__{}.json",
            sanitize(&artifact.suite),
            sanitize(&artifact.case)
        );
        let path = self.dir.join(file_name);

        let json = serde_json::to_vec_pretty(artifact).context("serializing artifact")?;
        fs::write(&path, json)
            .await
            .with_context(|| format!("writing artifact {}", path.display()))?;

        Ok(path)
    }
}

/// Keep file names portable: alphanumerics and dashes only.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_separators() {
        assert_eq!(sanitize("token unit tests"), "token-unit-tests");
        assert_eq!(sanitize("a/b\\c"), "a-b-c");
    }

    #[tokio::test]
    async fn write_produces_readable_json() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path());

        let artifact = CaseArtifact::new(
            "token unit tests",
            "mints to account",
            "balance mismatch",
            Some(0xfeed),
            12,
        );
        let path = writer.write(&artifact).await.unwrap();

        let raw = tokio::fs::read(&path).await.unwrap();
        let back: CaseArtifact = serde_json::from_slice(&raw).unwrap();
        assert_eq!(back.suite, "token unit tests");
        assert_eq!(back.case, "mints to account");
        assert_eq!(back.failure, "balance mismatch");
        assert_eq!(back.seed, Some(0xfeed));
    }
}
