//! Task timing recovered from version-control history.
//!
//! A backlog file records only whether a task is done, not when it was added
//! or finished. Replaying the file's git history recovers both:
//!
//! - [`normalize_task_key`] gives each task a text-derived identity that
//!   survives estimate annotations and casing edits.
//! - [`reconstruct_timings`] folds over a newest-first `git log -p` stream and
//!   records, per key, the oldest commit that added the task as pending and
//!   the newest commit that added it as done.
//!
//! Timing is best-effort. A missing history yields an empty [`TimingMap`].

mod key;
mod reconstruct;

pub use key::normalize_task_key;
pub use reconstruct::{
    history_format_arg, parse_commit_marker, reconstruct_timings, COMMIT_MARKER, FIELD_SEPARATOR,
};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Timing map keyed by normalized task text.
pub type TimingMap = BTreeMap<String, TaskTiming>;

/// When a task was first added as pending and last marked done.
///
/// `elapsed_hours` is `Some` exactly when both timestamps are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTiming {
    pub started_at: Option<DateTime<FixedOffset>>,
    pub completed_at: Option<DateTime<FixedOffset>>,
    pub elapsed_hours: Option<i64>,
}

impl TaskTiming {
    /// Build a record from its bounds, deriving `elapsed_hours`.
    ///
    /// Elapsed time is the absolute difference rounded to whole hours, so a
    /// completion recorded before the start still yields a positive value.
    #[must_use]
    pub fn from_bounds(
        started_at: Option<DateTime<FixedOffset>>,
        completed_at: Option<DateTime<FixedOffset>>,
    ) -> Self {
        let elapsed_hours = match (started_at, completed_at) {
            (Some(start), Some(end)) => Some(hours_between(start, end)),
            _ => None,
        };
        Self {
            started_at,
            completed_at,
            elapsed_hours,
        }
    }
}

fn hours_between(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> i64 {
    let millis = (end - start).num_milliseconds().unsigned_abs();
    (millis as f64 / 3_600_000.0).round() as i64
}
