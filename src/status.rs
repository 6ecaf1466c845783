//! Coarse project status derived from parsed backlog facts.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::backlog::{Epic, Metrics};

/// Dashboard status of a project, ordered by display priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[serde(rename = "blocked")]
    Blocked,
    #[serde(rename = "needs work")]
    NeedsWork,
    #[serde(rename = "in progress")]
    InProgress,
    #[serde(rename = "complete")]
    Complete,
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectStatus::Blocked => write!(f, "blocked"),
            ProjectStatus::NeedsWork => write!(f, "needs work"),
            ProjectStatus::InProgress => write!(f, "in progress"),
            ProjectStatus::Complete => write!(f, "complete"),
        }
    }
}

impl ProjectStatus {
    /// Sort rank, lower first.
    #[must_use]
    pub fn priority(&self) -> u8 {
        match self {
            ProjectStatus::Blocked => 0,
            ProjectStatus::NeedsWork => 1,
            ProjectStatus::InProgress => 2,
            ProjectStatus::Complete => 3,
        }
    }
}

/// Classify a project. First match wins:
///
/// 1. any task in any epic is blocked
/// 2. an expected artifact (backlog, snapshot, README) is missing
/// 3. the backlog still has pending tasks
/// 4. otherwise complete
///
/// `metrics` is `None` when the project has no backlog.
///
/// # Example
///
/// ```
/// use beacon::backlog::{parse_backlog, parse_epics};
/// use beacon::status::{classify_status, ProjectStatus};
///
/// let doc = "# T\n# Epic\n- [x] a\n- [ ] b\n";
/// let metrics = parse_backlog(doc).metrics;
/// let status = classify_status(&parse_epics(doc), Some(&metrics), &[]);
/// assert_eq!(status, ProjectStatus::InProgress);
/// ```
#[must_use]
pub fn classify_status(
    epics: &[Epic],
    metrics: Option<&Metrics>,
    missing_files: &[String],
) -> ProjectStatus {
    if epics.iter().any(Epic::has_blockers) {
        ProjectStatus::Blocked
    } else if !missing_files.is_empty() {
        ProjectStatus::NeedsWork
    } else if metrics.is_some_and(Metrics::has_open_tasks) {
        ProjectStatus::InProgress
    } else {
        ProjectStatus::Complete
    }
}
