//! Git boundary: history, recent commits and the origin remote.
//!
//! The parsers in this crate only consume git's text output. [`RepoHistory`]
//! abstracts where that text comes from so the scanner can run against
//! [`crate::testing::MockRepoHistory`] in tests and [`GitCli`] in production.
//!
//! Every [`GitCli`] query is bounded by a timeout and an output size; the
//! child process is killed when either is exceeded.

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::debug;

use crate::config::ScanConfig;
use crate::error::{BeaconError, Result};
use crate::timing::{history_format_arg, FIELD_SEPARATOR};

/// Output cap for queries other than the backlog history.
const SMALL_OUTPUT_LIMIT: usize = 256 * 1024;

// ============================================================================
// Repository History Trait
// ============================================================================

/// Source of raw git output for one project directory.
#[async_trait]
pub trait RepoHistory: Send + Sync {
    /// Newest-first `git log -p --follow` of one file, each commit opened by
    /// a [`crate::timing::COMMIT_MARKER`] line.
    ///
    /// # Errors
    ///
    /// Returns an error if git is unavailable, fails, times out or produces
    /// too much output.
    async fn file_history(&self, project_dir: &Path, rel_path: &str) -> Result<String>;

    /// The last `limit` commits as `hash<US>date<US>subject` lines.
    ///
    /// # Errors
    ///
    /// Returns an error if git is unavailable, fails or times out.
    async fn commit_log(&self, project_dir: &Path, limit: u32) -> Result<String>;

    /// URL of the `origin` remote.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no origin or git fails.
    async fn origin_url(&self, project_dir: &Path) -> Result<String>;
}

// ============================================================================
// Git CLI
// ============================================================================

/// [`RepoHistory`] backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    history_timeout: Duration,
    log_timeout: Duration,
    remote_timeout: Duration,
    max_history_bytes: usize,
}

impl GitCli {
    #[must_use]
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            history_timeout: config.history_timeout(),
            log_timeout: config.log_timeout(),
            remote_timeout: config.remote_timeout(),
            max_history_bytes: config.max_history_bytes,
        }
    }

    /// Check whether a `git` executable is on `PATH`.
    #[must_use]
    pub fn is_available() -> bool {
        which::which("git").is_ok()
    }

    async fn run(
        &self,
        operation: &str,
        project_dir: &Path,
        args: &[&str],
        timeout: Duration,
        limit: usize,
    ) -> Result<String> {
        if !Self::is_available() {
            return Err(BeaconError::GitUnavailable);
        }
        debug!(dir = %project_dir.display(), operation, "Running git");

        let mut child = Command::new("git")
            .args(args)
            .current_dir(project_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| BeaconError::git(operation, e.to_string()))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| BeaconError::git(operation, "stdout was not captured"))?;

        let collect = async {
            let mut buf = Vec::new();
            (&mut stdout)
                .take((limit as u64).saturating_add(1))
                .read_to_end(&mut buf)
                .await?;
            if buf.len() > limit {
                return Ok::<_, std::io::Error>((buf, None));
            }
            let status = child.wait().await?;
            Ok((buf, Some(status)))
        };

        // Dropping `child` on any early return kills the process.
        let (buf, status) = tokio::time::timeout(timeout, collect)
            .await
            .map_err(|_| BeaconError::GitTimeout {
                operation: operation.to_string(),
                timeout,
            })?
            .map_err(|e| BeaconError::git(operation, e.to_string()))?;

        match status {
            None => Err(BeaconError::GitOutputTooLarge {
                operation: operation.to_string(),
                limit,
            }),
            Some(status) if !status.success() => {
                Err(BeaconError::git(operation, format!("git exited with {status}")))
            }
            Some(_) => Ok(String::from_utf8_lossy(&buf).into_owned()),
        }
    }
}

#[async_trait]
impl RepoHistory for GitCli {
    async fn file_history(&self, project_dir: &Path, rel_path: &str) -> Result<String> {
        let format = history_format_arg();
        self.run(
            "log -p --follow",
            project_dir,
            &["log", &format, "-p", "--follow", "--", rel_path],
            self.history_timeout,
            self.max_history_bytes,
        )
        .await
    }

    async fn commit_log(&self, project_dir: &Path, limit: u32) -> Result<String> {
        let count = format!("-{limit}");
        let format = format!("--format=%h{FIELD_SEPARATOR}%as{FIELD_SEPARATOR}%s");
        self.run(
            "log",
            project_dir,
            &["log", &count, &format],
            self.log_timeout,
            SMALL_OUTPUT_LIMIT,
        )
        .await
    }

    async fn origin_url(&self, project_dir: &Path) -> Result<String> {
        self.run(
            "remote get-url",
            project_dir,
            &["remote", "get-url", "origin"],
            self.remote_timeout,
            SMALL_OUTPUT_LIMIT,
        )
        .await
    }
}

// ============================================================================
// Output Parsing
// ============================================================================

/// One entry of the recent-commit list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    pub hash: String,
    pub date: String,
    pub subject: String,
}

/// Parse `hash<US>date<US>subject` lines; missing fields become empty.
#[must_use]
pub fn parse_commit_log(output: &str) -> Vec<CommitSummary> {
    output
        .trim()
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| {
            let mut fields = line.split(FIELD_SEPARATOR).map(str::trim);
            let mut next = || fields.next().unwrap_or_default().to_string();
            CommitSummary {
                hash: next(),
                date: next(),
                subject: next(),
            }
        })
        .collect()
}

/// Owner and name of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubRepo {
    pub owner: String,
    pub repo: String,
}

fn github_remote_res() -> &'static [Regex; 2] {
    static RES: OnceLock<[Regex; 2]> = OnceLock::new();
    RES.get_or_init(|| {
        [
            Regex::new(r"github\.com[:/]([^/]+)/([^/.]+)(?:\.git)?$")
                .expect("github remote pattern is valid"),
            Regex::new(r"github\.com[:/]([^/]+)/(.+?)(?:\.git)?$")
                .expect("github remote pattern is valid"),
        ]
    })
}

/// Parse an HTTPS or SSH GitHub remote URL.
///
/// # Example
///
/// ```
/// use beacon::git::parse_github_remote;
///
/// let repo = parse_github_remote("git@github.com:acme/widgets.git").unwrap();
/// assert_eq!((repo.owner.as_str(), repo.repo.as_str()), ("acme", "widgets"));
/// assert!(parse_github_remote("https://gitlab.com/acme/widgets").is_none());
/// ```
#[must_use]
pub fn parse_github_remote(url: &str) -> Option<GithubRepo> {
    let url = url.trim();
    github_remote_res().iter().find_map(|re| {
        let caps = re.captures(url)?;
        Some(GithubRepo {
            owner: caps[1].to_string(),
            repo: caps[2].to_string(),
        })
    })
}
