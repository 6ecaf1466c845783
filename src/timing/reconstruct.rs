//! Replay of newest-first backlog history into per-task timing.

use chrono::{DateTime, FixedOffset};
use std::collections::BTreeMap;

use super::{normalize_task_key, TaskTiming, TimingMap};
use crate::backlog::{parse_checkbox, TaskStatus};

/// Prefix of the line that opens each commit in the history stream.
pub const COMMIT_MARKER: &str = "COMMIT\u{1f}";

/// Separator between marker fields; never appears in hashes or dates.
pub const FIELD_SEPARATOR: char = '\u{1f}';

/// `--format` argument producing `COMMIT<US>hash<US>author-date` lines.
#[must_use]
pub fn history_format_arg() -> String {
    format!("--format={COMMIT_MARKER}%H{FIELD_SEPARATOR}%aI")
}

/// Parse a commit marker line into its author date.
///
/// Returns `None` for lines that are not markers. A marker with a missing or
/// unparseable date yields `Some(None)`: the commit is recognised but its
/// added lines are ignored.
#[must_use]
pub fn parse_commit_marker(line: &str) -> Option<Option<DateTime<FixedOffset>>> {
    let rest = line.strip_prefix(COMMIT_MARKER)?;
    let date = rest
        .split(FIELD_SEPARATOR)
        .nth(1)
        .map(str::trim)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok());
    Some(date)
}

#[derive(Debug, Default)]
struct Bounds {
    started_at: Option<DateTime<FixedOffset>>,
    completed_at: Option<DateTime<FixedOffset>>,
}

/// Fold state for one pass over the history stream.
#[derive(Debug, Default)]
struct HistoryScan {
    commit_time: Option<DateTime<FixedOffset>>,
    bounds: BTreeMap<String, Bounds>,
}

impl HistoryScan {
    fn step(mut self, line: &str) -> Self {
        if let Some(date) = parse_commit_marker(line) {
            self.commit_time = date;
            return self;
        }
        let Some(time) = self.commit_time else {
            return self;
        };
        if line.starts_with("+++") {
            return self;
        }
        let Some(added) = line.strip_prefix('+') else {
            return self;
        };
        let Some((status, text)) = parse_checkbox(added.trim_start()) else {
            return self;
        };

        match status {
            TaskStatus::Pending => {
                // Newest-first: every later overwrite comes from an older
                // commit, so the last write is the oldest pending add.
                let entry = self.bounds.entry(normalize_task_key(text)).or_default();
                entry.started_at = Some(time);
            }
            TaskStatus::Done => {
                // Newest-first: the first write is the newest done add.
                let entry = self.bounds.entry(normalize_task_key(text)).or_default();
                entry.completed_at.get_or_insert(time);
            }
            TaskStatus::Blocked => {}
        }
        self
    }

    fn finish(self) -> TimingMap {
        self.bounds
            .into_iter()
            .map(|(key, b)| (key, TaskTiming::from_bounds(b.started_at, b.completed_at)))
            .collect()
    }
}

/// Reconstruct per-task timing from a backlog's `git log -p` output.
///
/// The input must be newest-commit-first, with each commit introduced by a
/// [`COMMIT_MARKER`] line (see [`history_format_arg`]). Only added lines
/// (`+` prefix, excluding `+++` file headers) that hold a pending or done
/// checkbox contribute:
///
/// - `started_at` is overwritten on every pending match, ending on the
///   oldest commit that introduced the task as pending.
/// - `completed_at` is set once, on the first done match, which is the
///   newest commit showing the task as done.
///
/// Lines before the first marker are ignored.
///
/// # Example
///
/// ```
/// use beacon::timing::reconstruct_timings;
///
/// let history = "COMMIT\u{1f}b2\u{1f}2024-01-02T00:00:00Z\n\
///                +- [x] Parse input [actual:20h]\n\
///                COMMIT\u{1f}a1\u{1f}2024-01-01T00:00:00Z\n\
///                +- [ ] parse input [est:1d]\n";
/// let timings = reconstruct_timings(history);
/// assert_eq!(timings["parse input"].elapsed_hours, Some(24));
/// ```
#[must_use]
pub fn reconstruct_timings(history: &str) -> TimingMap {
    history
        .lines()
        .fold(HistoryScan::default(), HistoryScan::step)
        .finish()
}
