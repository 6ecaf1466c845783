//! Backlog document parsing.
//!
//! A backlog is a loosely structured markdown file: the first `#` heading is
//! the document title, every later `#` heading opens an epic, and checkbox
//! list items are tasks:
//!
//! ```text
//! # Project Backlog          <- title, not an epic
//! # Epic: Parser             <- epic
//! - [x] tokenize input       <- done
//! - [!] handle unicode       <- blocked
//! - [ ] error recovery       <- pending
//! ## Current                 <- sub-heading, closes the epic
//! - error recovery           <- current task pointer
//! ```
//!
//! Two independent passes read the same text: [`parse_epics`] builds the
//! epic/task tree and [`parse_backlog`] computes document-wide progress.

mod epics;
mod line;
mod progress;

pub use epics::parse_epics;
pub use line::{classify_line, document_lines, heading_text, parse_checkbox, LineKind};
pub use progress::{parse_backlog, BacklogProgress, Metrics};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::timing::{normalize_task_key, TaskTiming, TimingMap};

// ============================================================================
// Task Status
// ============================================================================

/// Checkbox state of a task line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// `[x]` or `[X]`
    Done,
    /// `[!]`
    Blocked,
    /// `[ ]`
    Pending,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Done => write!(f, "done"),
            TaskStatus::Blocked => write!(f, "blocked"),
            TaskStatus::Pending => write!(f, "pending"),
        }
    }
}

// ============================================================================
// Task and Epic
// ============================================================================

/// One checkbox line attributed to an epic.
///
/// Identity across edits and history is the normalized text, see
/// [`normalize_task_key`]. Timing is attached after parsing by
/// [`Epic::apply_timings`] and stays `None` when history had no match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub status: TaskStatus,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<TaskTiming>,
}

impl Task {
    /// Create an untimed task.
    #[must_use]
    pub fn new(status: TaskStatus, text: impl Into<String>) -> Self {
        Self {
            status,
            text: text.into(),
            timing: None,
        }
    }

    /// Key used to correlate this task with its history.
    #[must_use]
    pub fn key(&self) -> String {
        normalize_task_key(&self.text)
    }

    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.status == TaskStatus::Blocked
    }
}

/// A top-level grouping of tasks, in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Epic {
    pub title: String,
    pub tasks: Vec<Task>,
}

impl Epic {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            tasks: Vec::new(),
        }
    }

    /// Whether any task in this epic is blocked.
    ///
    /// An epic without tasks is never blocked.
    #[must_use]
    pub fn has_blockers(&self) -> bool {
        self.tasks.iter().any(Task::is_blocked)
    }

    /// Copy matching timing records onto this epic's tasks.
    ///
    /// Tasks are matched by normalized text. Tasks without an entry keep
    /// `timing == None`.
    pub fn apply_timings(&mut self, timings: &TimingMap) {
        for task in &mut self.tasks {
            if let Some(timing) = timings.get(&task.key()) {
                task.timing = Some(timing.clone());
            }
        }
    }
}

/// Join a timing map into every task of every epic.
pub fn apply_timings(epics: &mut [Epic], timings: &TimingMap) {
    for epic in epics {
        epic.apply_timings(timings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn ts(s: &str) -> chrono::DateTime<chrono::FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn test_task_status_serializes_lowercase() {
        let json = serde_json::to_string(&TaskStatus::Blocked).unwrap();
        assert_eq!(json, "\"blocked\"");
    }

    #[test]
    fn test_untimed_task_omits_timing_fields() {
        let task = Task::new(TaskStatus::Pending, "write docs");
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["text"], "write docs");
        assert!(json.get("timing").is_none());
    }

    #[test]
    fn test_apply_timings_matches_normalized_text() {
        let mut epic = Epic::new("Parser");
        epic.tasks
            .push(Task::new(TaskStatus::Done, "Fix Bug [actual:3h]"));
        epic.tasks.push(Task::new(TaskStatus::Pending, "unrelated"));

        let mut timings = TimingMap::new();
        timings.insert(
            "fix bug".to_string(),
            TaskTiming::from_bounds(
                Some(ts("2024-01-01T00:00:00Z")),
                Some(ts("2024-01-01T05:00:00Z")),
            ),
        );

        epic.apply_timings(&timings);

        let timed = epic.tasks[0].timing.as_ref().unwrap();
        assert_eq!(timed.elapsed_hours, Some(5));
        assert!(epic.tasks[1].timing.is_none());
    }

    #[test]
    fn test_timed_task_serializes_null_elapsed() {
        let mut task = Task::new(TaskStatus::Pending, "open");
        task.timing = Some(TaskTiming::from_bounds(Some(ts("2024-01-01T00:00:00Z")), None));
        let json = serde_json::to_value(&task).unwrap();
        let started = json["timing"]["started_at"].as_str().unwrap();
        assert_eq!(ts(started), ts("2024-01-01T00:00:00Z"));
        assert!(json["timing"]["completed_at"].is_null());
        assert!(json["timing"]["elapsed_hours"].is_null());
    }

    #[test]
    fn test_empty_epic_has_no_blockers() {
        assert!(!Epic::new("Later").has_blockers());
    }
}
