//! Mock implementations of testing traits.
//!
//! These mocks provide controllable test doubles for external dependencies,
//! enabling deterministic scans without a git executable.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::{BeaconError, Result};
use crate::git::RepoHistory;

/// In-memory git output, keyed by project directory name.
///
/// Projects without a configured entry behave like directories that are not
/// git repositories: every query fails.
///
/// # Example
///
/// ```rust,ignore
/// let history = MockRepoHistory::new()
///     .with_file_history("alpha", "COMMIT\u{1f}abc\u{1f}2024-01-01T00:00:00Z\n+- [ ] task\n")
///     .with_origin("alpha", "git@github.com:acme/alpha.git");
/// ```
#[derive(Debug, Default)]
pub struct MockRepoHistory {
    file_histories: HashMap<String, String>,
    commit_logs: HashMap<String, String>,
    origins: HashMap<String, String>,
    history_failures: HashMap<String, String>,
    history_calls: AtomicU32,
    in_flight: AtomicU32,
    max_in_flight: AtomicU32,
}

impl MockRepoHistory {
    /// Create a mock with no repositories.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the backlog history returned for a project.
    #[must_use]
    pub fn with_file_history(mut self, project: &str, history: &str) -> Self {
        self.file_histories
            .insert(project.to_string(), history.to_string());
        self
    }

    /// Set the raw recent-commit log returned for a project.
    #[must_use]
    pub fn with_commit_log(mut self, project: &str, log: &str) -> Self {
        self.commit_logs.insert(project.to_string(), log.to_string());
        self
    }

    /// Set the origin URL returned for a project.
    #[must_use]
    pub fn with_origin(mut self, project: &str, url: &str) -> Self {
        self.origins.insert(project.to_string(), url.to_string());
        self
    }

    /// Make the history query for a project fail with a non-git error.
    #[must_use]
    pub fn with_history_failure(mut self, project: &str, message: &str) -> Self {
        self.history_failures
            .insert(project.to_string(), message.to_string());
        self
    }

    /// Highest number of history queries that were running at the same time.
    pub fn max_concurrent_history_calls(&self) -> u32 {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Number of history queries served so far.
    pub fn history_calls(&self) -> u32 {
        self.history_calls.load(Ordering::SeqCst)
    }

    fn project_name(project_dir: &Path) -> String {
        project_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn lookup(map: &HashMap<String, String>, project_dir: &Path, op: &str) -> Result<String> {
        let name = Self::project_name(project_dir);
        map.get(&name)
            .cloned()
            .ok_or_else(|| BeaconError::git(op, format!("not a git repository: {name}")))
    }
}

#[async_trait]
impl RepoHistory for MockRepoHistory {
    async fn file_history(&self, project_dir: &Path, _rel_path: &str) -> Result<String> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        // Give other scans a chance to overlap with this one.
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(message) = self.history_failures.get(&Self::project_name(project_dir)) {
            return Err(anyhow::anyhow!("{message}").into());
        }
        Self::lookup(&self.file_histories, project_dir, "log -p --follow")
    }

    async fn commit_log(&self, project_dir: &Path, _limit: u32) -> Result<String> {
        Self::lookup(&self.commit_logs, project_dir, "log")
    }

    async fn origin_url(&self, project_dir: &Path) -> Result<String> {
        Self::lookup(&self.origins, project_dir, "remote get-url")
    }
}
