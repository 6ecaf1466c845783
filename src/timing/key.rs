//! Task identity across edits.

use regex::Regex;
use std::sync::OnceLock;

fn estimate_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\[est:[^\]]+\]").expect("estimate pattern is valid"))
}

fn actual_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\[actual:[^\]]+\]").expect("actual pattern is valid"))
}

/// Canonical key for a task's text.
///
/// Drops `[est:...]` and `[actual:...]` annotations, trims and lower-cases,
/// so a task keeps its identity when estimates are filled in or its casing
/// changes. Larger rewrites of the text produce a different key and lose
/// their history link.
///
/// # Example
///
/// ```
/// use beacon::timing::normalize_task_key;
///
/// assert_eq!(normalize_task_key("Fix bug [est:2h]"), "fix bug");
/// assert_eq!(normalize_task_key("Fix Bug [actual:3h]"), "fix bug");
/// ```
#[must_use]
pub fn normalize_task_key(text: &str) -> String {
    let without_estimate = estimate_re().replace_all(text, "");
    let without_actual = actual_re().replace_all(&without_estimate, "");
    without_actual.trim().to_lowercase()
}
