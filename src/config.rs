//! Scan configuration.
//!
//! Settings live in an optional `.beacon.json` at the scan root. Every key is
//! optional and falls back to the defaults below.
//!
//! ```json
//! {
//!   "backlogPaths": [".claude/BACKLOG.md", "content/BACKLOG.md"],
//!   "historyTimeoutMs": 10000,
//!   "recentCommitLimit": 20
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{BeaconError, Result};

/// Name of the settings file looked up in the scan root.
pub const SETTINGS_FILE: &str = ".beacon.json";

fn default_backlog_paths() -> Vec<String> {
    vec![
        ".claude/BACKLOG.md".to_string(),
        "content/BACKLOG.md".to_string(),
    ]
}

fn default_snapshot_paths() -> Vec<String> {
    vec![
        ".claude/SNAPSHOT.md".to_string(),
        "content/SNAPSHOT.md".to_string(),
    ]
}

fn default_readme_path() -> String {
    "README.md".to_string()
}

fn default_history_timeout_ms() -> u64 {
    10_000
}

fn default_log_timeout_ms() -> u64 {
    5_000
}

fn default_remote_timeout_ms() -> u64 {
    3_000
}

fn default_max_history_bytes() -> usize {
    5 * 1024 * 1024
}

fn default_recent_commit_limit() -> u32 {
    20
}

fn default_scan_concurrency() -> usize {
    8
}

/// Where to find project artifacts and how long git may take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanConfig {
    /// Backlog candidates relative to a project, first existing wins.
    #[serde(default = "default_backlog_paths")]
    pub backlog_paths: Vec<String>,

    /// Snapshot candidates relative to a project, first existing wins.
    #[serde(default = "default_snapshot_paths")]
    pub snapshot_paths: Vec<String>,

    #[serde(default = "default_readme_path")]
    pub readme_path: String,

    /// Budget for the backlog history query.
    #[serde(default = "default_history_timeout_ms")]
    pub history_timeout_ms: u64,

    /// Budget for the recent-commit query.
    #[serde(default = "default_log_timeout_ms")]
    pub log_timeout_ms: u64,

    /// Budget for the origin remote lookup.
    #[serde(default = "default_remote_timeout_ms")]
    pub remote_timeout_ms: u64,

    /// History output above this size is discarded.
    #[serde(default = "default_max_history_bytes")]
    pub max_history_bytes: usize,

    #[serde(default = "default_recent_commit_limit")]
    pub recent_commit_limit: u32,

    /// Projects scanned at once. Each runs up to three git children.
    #[serde(default = "default_scan_concurrency")]
    pub scan_concurrency: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            backlog_paths: default_backlog_paths(),
            snapshot_paths: default_snapshot_paths(),
            readme_path: default_readme_path(),
            history_timeout_ms: default_history_timeout_ms(),
            log_timeout_ms: default_log_timeout_ms(),
            remote_timeout_ms: default_remote_timeout_ms(),
            max_history_bytes: default_max_history_bytes(),
            recent_commit_limit: default_recent_commit_limit(),
            scan_concurrency: default_scan_concurrency(),
        }
    }
}

impl ScanConfig {
    /// Load configuration from a scan root, or defaults if there is no file.
    ///
    /// # Errors
    ///
    /// Returns [`BeaconError::Config`] if the file exists but cannot be read
    /// or parsed.
    pub fn load(root: &Path) -> Result<Self> {
        let path = Self::settings_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .map_err(|e| BeaconError::config_with_path(e.to_string(), path.clone()))?;
        serde_json::from_str(&content)
            .map_err(|e| BeaconError::config_with_path(e.to_string(), path))
    }

    /// Get the settings file path for a scan root
    pub fn settings_path(root: &Path) -> PathBuf {
        root.join(SETTINGS_FILE)
    }

    pub fn history_timeout(&self) -> Duration {
        Duration::from_millis(self.history_timeout_ms)
    }

    pub fn log_timeout(&self) -> Duration {
        Duration::from_millis(self.log_timeout_ms)
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }

    /// Effective fan-out; zero is treated as one.
    pub fn scan_concurrency(&self) -> usize {
        self.scan_concurrency.max(1)
    }

    /// Label for a missing artifact listing its candidates,
    /// e.g. `.claude/BACKLOG.md (or content/BACKLOG.md)`.
    #[must_use]
    pub fn missing_label(candidates: &[String]) -> String {
        match candidates {
            [] => String::new(),
            [only] => only.clone(),
            [first, rest @ ..] => format!("{first} (or {})", rest.join(", ")),
        }
    }
}
