//! Document-wide progress and the current-task pointer.

use serde::{Deserialize, Serialize};

use super::line::{document_lines, parse_checkbox};
use super::TaskStatus;

/// Checkbox counts across the whole document.
///
/// Blocked tasks count toward neither `done` nor `left`, so
/// `progress_percent` only reflects done versus pending work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub done: u32,
    pub left: u32,
    pub progress_percent: u8,
}

impl Metrics {
    /// Build metrics from counts, rounding the percentage half-up.
    ///
    /// # Example
    ///
    /// ```
    /// use beacon::backlog::Metrics;
    ///
    /// assert_eq!(Metrics::from_counts(1, 2).progress_percent, 33);
    /// assert_eq!(Metrics::from_counts(2, 1).progress_percent, 67);
    /// assert_eq!(Metrics::from_counts(0, 0).progress_percent, 0);
    /// ```
    #[must_use]
    pub fn from_counts(done: u32, left: u32) -> Self {
        let total = u64::from(done) + u64::from(left);
        let progress_percent = if total == 0 {
            0
        } else {
            // integer half-up rounding of done * 100 / total
            ((u64::from(done) * 200 + total) / (total * 2)) as u8
        };
        Self {
            done,
            left,
            progress_percent,
        }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.done + self.left
    }

    #[must_use]
    pub fn has_open_tasks(&self) -> bool {
        self.left > 0
    }
}

/// Result of [`parse_backlog`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacklogProgress {
    pub metrics: Metrics,
    pub current_task: String,
}

/// Count done/pending checkboxes and extract the current task.
///
/// The current task is the first non-blank line under a `## Current`
/// heading (any level of two or more `#`, case-insensitive), with a leading
/// `-` or `*` marker removed. It stays empty if the next sub-heading comes
/// first.
///
/// # Example
///
/// ```
/// use beacon::backlog::parse_backlog;
///
/// let progress = parse_backlog("# T\n- [x] a\n- [ ] b\n## Current\n\n- b\n");
/// assert_eq!(progress.metrics.progress_percent, 50);
/// assert_eq!(progress.current_task, "b");
/// ```
#[must_use]
pub fn parse_backlog(text: &str) -> BacklogProgress {
    let lines: Vec<&str> = document_lines(text).collect();

    let (done, left) = lines
        .iter()
        .filter_map(|line| parse_checkbox(line))
        .fold((0u32, 0u32), |(done, left), (status, _)| match status {
            TaskStatus::Done => (done + 1, left),
            TaskStatus::Pending => (done, left + 1),
            TaskStatus::Blocked => (done, left),
        });

    BacklogProgress {
        metrics: Metrics::from_counts(done, left),
        current_task: find_current_task(&lines).unwrap_or_default(),
    }
}

fn is_current_heading(line: &str) -> bool {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix("##") else {
        return false;
    };
    rest.trim_start_matches('#')
        .trim()
        .eq_ignore_ascii_case("current")
}

fn find_current_task(lines: &[&str]) -> Option<String> {
    let start = lines.iter().position(|line| is_current_heading(line))?;
    let first = lines[start + 1..]
        .iter()
        .map(|line| line.trim())
        .find(|line| !line.is_empty())?;
    if first.starts_with("##") {
        return None;
    }
    let unmarked = first
        .strip_prefix(['-', '*'])
        .map_or(first, str::trim_start);
    Some(unmarked.trim().to_string())
}
