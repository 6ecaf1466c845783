//! Project discovery and summary assembly.
//!
//! # Architecture
//!
//! ```text
//! scan_projects(root)
//!   └── for each top-level directory (bounded fan-out)
//!         scan_project(dir)
//!           ├── discover artifacts     backlog / snapshot / README
//!           ├── parse_backlog          metrics + current task
//!           ├── parse_epics            epics + tasks
//!           ├── load_timings           git history -> TimingMap -> tasks
//!           ├── commit log + origin    recent_commits / github_repo
//!           └── classify_status
//! ```
//!
//! Git is best-effort: a degradable failure there leaves the corresponding
//! field empty. An unreadable root or artifact file fails the scan.

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::backlog::{apply_timings, parse_backlog, parse_epics, Epic, Metrics};
use crate::config::ScanConfig;
use crate::error::{BeaconError, Result};
use crate::git::{parse_commit_log, parse_github_remote, CommitSummary, GithubRepo, RepoHistory};
use crate::readme::parse_readme;
use crate::status::{classify_status, ProjectStatus};
use crate::timing::{reconstruct_timings, TimingMap};

// ============================================================================
// Project Summary
// ============================================================================

/// Everything the dashboard shows for one project.
///
/// Built from scratch on every scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    /// Directory name
    pub id: String,
    pub folder: PathBuf,
    pub status: ProjectStatus,
    /// `None` when the project has no backlog
    pub metrics: Option<Metrics>,
    pub current_task: String,
    pub title: String,
    pub description: String,
    pub missing_files: Vec<String>,
    pub epics: Vec<Epic>,
    pub recent_commits: Vec<CommitSummary>,
    pub github_repo: Option<GithubRepo>,
}

impl ProjectSummary {
    /// Dashboard ordering: status priority, then title, then directory name.
    fn display_order(&self, other: &Self) -> Ordering {
        self.status
            .priority()
            .cmp(&other.status.priority())
            .then_with(|| self.title.to_lowercase().cmp(&other.title.to_lowercase()))
            .then_with(|| self.title.cmp(&other.title))
            .then_with(|| self.id.cmp(&other.id))
    }
}

// ============================================================================
// Artifact Discovery
// ============================================================================

/// Artifacts found in a project directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectArtifacts {
    /// Backlog path relative to the project
    pub backlog: Option<String>,
    /// Snapshot path relative to the project
    pub snapshot: Option<String>,
    pub has_readme: bool,
}

impl ProjectArtifacts {
    /// Probe a directory for the configured artifact candidates.
    #[must_use]
    pub fn discover(project_dir: &Path, config: &ScanConfig) -> Self {
        let first_existing = |candidates: &[String]| {
            candidates
                .iter()
                .find(|rel| project_dir.join(rel.as_str()).is_file())
                .cloned()
        };
        Self {
            backlog: first_existing(config.backlog_paths.as_slice()),
            snapshot: first_existing(config.snapshot_paths.as_slice()),
            has_readme: project_dir.join(&config.readme_path).is_file(),
        }
    }

    /// A directory is a project if it has at least one artifact.
    #[must_use]
    pub fn is_project(&self) -> bool {
        self.backlog.is_some() || self.snapshot.is_some() || self.has_readme
    }

    /// Labels for absent artifacts, in backlog/snapshot/README order.
    #[must_use]
    pub fn missing_files(&self, config: &ScanConfig) -> Vec<String> {
        let mut missing = Vec::new();
        if self.backlog.is_none() {
            missing.push(ScanConfig::missing_label(&config.backlog_paths));
        }
        if self.snapshot.is_none() {
            missing.push(ScanConfig::missing_label(&config.snapshot_paths));
        }
        if !self.has_readme {
            missing.push(config.readme_path.clone());
        }
        missing
    }
}

// ============================================================================
// Scanning
// ============================================================================

fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Reconstruct task timing from the backlog's git history.
///
/// Returns an empty map when there is no backlog or the history query fails
/// in a degradable way.
///
/// # Errors
///
/// Returns the history error if it is not [degradable](BeaconError::is_degradable).
pub async fn load_timings(
    project_dir: &Path,
    backlog: Option<&str>,
    history: &dyn RepoHistory,
) -> Result<TimingMap> {
    let Some(rel_path) = backlog else {
        return Ok(TimingMap::new());
    };
    match history.file_history(project_dir, rel_path).await {
        Ok(text) => Ok(reconstruct_timings(&text)),
        Err(e) if e.is_degradable() => {
            warn!(dir = %project_dir.display(), error = %e, "Backlog history unavailable");
            Ok(TimingMap::new())
        }
        Err(e) => Err(e),
    }
}

async fn load_recent_commits(
    project_dir: &Path,
    limit: u32,
    history: &dyn RepoHistory,
) -> Result<Vec<CommitSummary>> {
    match history.commit_log(project_dir, limit).await {
        Ok(text) => Ok(parse_commit_log(&text)),
        Err(e) if e.is_degradable() => {
            debug!(dir = %project_dir.display(), error = %e, "No commit log");
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

async fn load_github_repo(
    project_dir: &Path,
    history: &dyn RepoHistory,
) -> Result<Option<GithubRepo>> {
    match history.origin_url(project_dir).await {
        Ok(url) => Ok(parse_github_remote(&url)),
        Err(e) if e.is_degradable() => {
            debug!(dir = %project_dir.display(), error = %e, "No origin remote");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Summarize one directory, or `None` if it holds no project artifacts.
///
/// # Errors
///
/// Returns an error if an existing backlog or README cannot be read, or if
/// the history boundary fails with a non-degradable error.
pub async fn scan_project(
    project_dir: &Path,
    config: &ScanConfig,
    history: &dyn RepoHistory,
) -> Result<Option<ProjectSummary>> {
    let artifacts = ProjectArtifacts::discover(project_dir, config);
    if !artifacts.is_project() {
        return Ok(None);
    }

    let id = project_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let missing_files = artifacts.missing_files(config);

    let (metrics, current_task, mut epics) = match &artifacts.backlog {
        Some(rel) => {
            let text = read_text(&project_dir.join(rel))?;
            let progress = parse_backlog(&text);
            (Some(progress.metrics), progress.current_task, parse_epics(&text))
        }
        None => (None, String::new(), Vec::new()),
    };

    let readme = if artifacts.has_readme {
        parse_readme(&read_text(&project_dir.join(&config.readme_path))?)
    } else {
        Default::default()
    };
    let title = if readme.title.is_empty() {
        id.clone()
    } else {
        readme.title
    };

    let status = classify_status(&epics, metrics.as_ref(), &missing_files);

    let timings = load_timings(project_dir, artifacts.backlog.as_deref(), history).await?;
    apply_timings(&mut epics, &timings);

    let recent_commits =
        load_recent_commits(project_dir, config.recent_commit_limit, history).await?;
    let github_repo = load_github_repo(project_dir, history).await?;

    Ok(Some(ProjectSummary {
        id,
        folder: project_dir.to_path_buf(),
        status,
        metrics,
        current_task,
        title,
        description: readme.description,
        missing_files,
        epics,
        recent_commits,
        github_repo,
    }))
}

/// List the immediate subdirectories of `root`, sorted by name.
fn project_dirs(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_dir())
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// Scan every project directly under `root`.
///
/// Projects are scanned independently, at most
/// [`ScanConfig::scan_concurrency`] at a time, then sorted for display:
/// blocked, needs work, in progress, complete, each by title.
///
/// # Errors
///
/// Returns [`BeaconError::MissingDirectory`] if `root` is not a directory, or
/// the first artifact read error.
pub async fn scan_projects(
    root: &Path,
    config: Arc<ScanConfig>,
    history: Arc<dyn RepoHistory>,
) -> Result<Vec<ProjectSummary>> {
    if !root.is_dir() {
        return Err(BeaconError::MissingDirectory {
            path: root.to_path_buf(),
        });
    }

    let limit = config.scan_concurrency();
    let results: Vec<_> = stream::iter(project_dirs(root))
        .map(|dir| {
            let config = Arc::clone(&config);
            let history = Arc::clone(&history);
            tokio::spawn(async move { scan_project(&dir, &config, history.as_ref()).await })
        })
        .buffer_unordered(limit)
        .collect()
        .await;

    let mut summaries = Vec::new();
    for joined in results {
        let scanned = joined.map_err(|e| anyhow::anyhow!("Project scan panicked: {e}"))?;
        if let Some(summary) = scanned? {
            summaries.push(summary);
        }
    }
    summaries.sort_by(ProjectSummary::display_order);

    info!(root = %root.display(), projects = summaries.len(), "Scan complete");
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backlog::TaskStatus;
    use crate::testing::{MockRepoHistory, TestFixture};

    const HISTORY: &str = "COMMIT\u{1f}c2\u{1f}2024-03-02T12:00:00Z\n\
        diff --git a/.claude/BACKLOG.md b/.claude/BACKLOG.md\n\
        +++ b/.claude/BACKLOG.md\n\
        +- [x] Write parser [actual:30h]\n\
        COMMIT\u{1f}c1\u{1f}2024-03-01T06:00:00Z\n\
        +++ b/.claude/BACKLOG.md\n\
        +- [ ] write parser [est:1d]\n";

    async fn scan(fixture: &TestFixture, history: MockRepoHistory) -> Vec<ProjectSummary> {
        scan_projects(
            fixture.root(),
            Arc::new(ScanConfig::default()),
            Arc::new(history),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_missing_root_is_error() {
        let err = scan_projects(
            Path::new("/definitely/not/here"),
            Arc::new(ScanConfig::default()),
            Arc::new(MockRepoHistory::new()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BeaconError::MissingDirectory { .. }));
    }

    #[tokio::test]
    async fn test_directories_without_artifacts_are_skipped() {
        let fixture = TestFixture::new()
            .with_project("empty")
            .write("notes", "docs/readme.txt", "x");
        std::fs::write(fixture.root().join("README.md"), "# root file").unwrap();

        assert!(scan(&fixture, MockRepoHistory::new()).await.is_empty());
    }

    #[tokio::test]
    async fn test_complete_project_with_timings() {
        let fixture = TestFixture::complete_project("alpha");
        let history = MockRepoHistory::new()
            .with_file_history("alpha", HISTORY)
            .with_commit_log("alpha", "abc1234\u{1f}2024-03-02\u{1f}Finish parser\n")
            .with_origin("alpha", "https://github.com/acme/alpha.git");

        let summaries = scan(&fixture, history).await;
        assert_eq!(summaries.len(), 1);
        let alpha = &summaries[0];

        assert_eq!(alpha.id, "alpha");
        assert_eq!(alpha.title, "Complete Project");
        assert_eq!(alpha.description, "Everything shipped.");
        assert_eq!(alpha.status, ProjectStatus::Complete);
        assert!(alpha.missing_files.is_empty());
        assert_eq!(alpha.metrics.unwrap().progress_percent, 100);
        assert_eq!(alpha.current_task, "Nothing left");
        assert_eq!(alpha.recent_commits[0].subject, "Finish parser");
        assert_eq!(alpha.github_repo.as_ref().unwrap().owner, "acme");

        let tasks = &alpha.epics[0].tasks;
        assert!(tasks[0].timing.is_none());
        let timing = tasks[1].timing.as_ref().unwrap();
        assert_eq!(timing.elapsed_hours, Some(30));
    }

    #[tokio::test]
    async fn test_git_failures_degrade_to_empty_fields() {
        let fixture = TestFixture::complete_project("beta");
        let summaries = scan(&fixture, MockRepoHistory::new()).await;

        let beta = &summaries[0];
        assert!(beta.recent_commits.is_empty());
        assert!(beta.github_repo.is_none());
        assert!(beta.epics[0].tasks.iter().all(|t| t.timing.is_none()));
        assert_eq!(beta.status, ProjectStatus::Complete);
    }

    #[tokio::test]
    async fn test_readme_only_project_needs_work() {
        let fixture = TestFixture::new().with_readme("gamma", "No heading here\n");
        let history = MockRepoHistory::new();
        let summaries = scan(&fixture, history).await;

        let gamma = &summaries[0];
        assert_eq!(gamma.title, "gamma");
        assert_eq!(gamma.description, "No heading here");
        assert_eq!(gamma.metrics, None);
        assert_eq!(gamma.status, ProjectStatus::NeedsWork);
        assert_eq!(
            gamma.missing_files,
            vec![
                ".claude/BACKLOG.md (or content/BACKLOG.md)".to_string(),
                ".claude/SNAPSHOT.md (or content/SNAPSHOT.md)".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_content_backlog_fallback_is_used() {
        let fixture = TestFixture::new()
            .write("delta", "content/BACKLOG.md", "# B\n# E\n- [ ] open\n")
            .write("delta", "content/SNAPSHOT.md", "snap")
            .with_readme("delta", "# Delta\n");
        let history = MockRepoHistory::new();
        let summaries = scan(&fixture, history).await;

        let delta = &summaries[0];
        assert_eq!(delta.status, ProjectStatus::InProgress);
        assert_eq!(delta.epics[0].tasks[0].status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn test_history_not_queried_without_backlog() {
        let fixture = TestFixture::new().with_readme("eps", "# Eps\n");
        let history = Arc::new(MockRepoHistory::new());
        let config = Arc::new(ScanConfig::default());

        scan_projects(fixture.root(), config, Arc::clone(&history) as Arc<dyn RepoHistory>)
            .await
            .unwrap();
        assert_eq!(history.history_calls(), 0);
    }

    #[tokio::test]
    async fn test_non_git_history_error_fails_scan() {
        let fixture = TestFixture::complete_project("alpha");
        let history = MockRepoHistory::new().with_history_failure("alpha", "pipe closed");

        let err = scan_projects(
            fixture.root(),
            Arc::new(ScanConfig::default()),
            Arc::new(history),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BeaconError::Other(_)));
        assert!(err.to_string().contains("pipe closed"));
    }

    #[tokio::test]
    async fn test_load_timings_propagates_non_degradable_error() {
        let fixture = TestFixture::complete_project("alpha");
        let history = MockRepoHistory::new().with_history_failure("alpha", "boom");

        let result = load_timings(
            &fixture.project_path("alpha"),
            Some(".claude/BACKLOG.md"),
            &history,
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_scan_fan_out_is_bounded() {
        let mut fixture = TestFixture::new();
        for i in 0..6 {
            fixture = fixture.with_backlog(&format!("p{i}"), "# B\n# E\n- [ ] open\n");
        }
        let history = Arc::new(MockRepoHistory::new());
        let mut config = ScanConfig::default();
        config.scan_concurrency = 2;

        let summaries = scan_projects(
            fixture.root(),
            Arc::new(config),
            Arc::clone(&history) as Arc<dyn RepoHistory>,
        )
        .await
        .unwrap();
        assert_eq!(summaries.len(), 6);
        assert_eq!(history.history_calls(), 6);
        assert!(history.max_concurrent_history_calls() <= 2);
        assert!(history.max_concurrent_history_calls() >= 1);
    }

    #[tokio::test]
    async fn test_equal_titles_sort_by_directory() {
        let fixture = TestFixture::new()
            .with_readme("b-dir", "# Same\n")
            .with_readme("a-dir", "# Same\n");

        let summaries = scan(&fixture, MockRepoHistory::new()).await;
        let ids: Vec<&str> = summaries.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a-dir", "b-dir"]);
    }

    #[tokio::test]
    async fn test_projects_sorted_by_status_then_title() {
        let fixture = TestFixture::complete_project("zeta")
            .with_backlog("blocked", "# B\n# E\n- [!] waiting on vendor\n")
            .with_readme("blocked", "# Yak\n")
            .with_backlog("busy-b", "# B\n# E\n- [ ] open\n")
            .with_snapshot("busy-b")
            .with_readme("busy-b", "# beta\n")
            .with_backlog("busy-a", "# B\n# E\n- [ ] open\n")
            .with_snapshot("busy-a")
            .with_readme("busy-a", "# Alpha\n")
            .with_readme("bare", "# Bare\n");

        let summaries = scan(&fixture, MockRepoHistory::new()).await;
        let order: Vec<(&str, ProjectStatus)> = summaries
            .iter()
            .map(|s| (s.id.as_str(), s.status))
            .collect();
        assert_eq!(
            order,
            vec![
                ("blocked", ProjectStatus::Blocked),
                ("bare", ProjectStatus::NeedsWork),
                ("busy-a", ProjectStatus::InProgress),
                ("busy-b", ProjectStatus::InProgress),
                ("zeta", ProjectStatus::Complete),
            ]
        );
    }
}
