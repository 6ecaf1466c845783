//! Single-line classification for backlog markdown.
//!
//! Only headings and checkbox list items carry meaning; every other line is
//! inert. Classification is stateless and works on one line at a time.

use regex::Regex;
use std::sync::OnceLock;

use super::TaskStatus;

// ============================================================================
// Patterns
// ============================================================================

fn top_heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // `#` followed by whitespace can never be followed by a second `#`
    RE.get_or_init(|| Regex::new(r"^#\s+").expect("top-level heading pattern is valid"))
}

fn checkbox_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[-*]\s+\[([xX! ])\]\s+(.+)$").expect("checkbox pattern is valid")
    })
}

// ============================================================================
// Line Kind
// ============================================================================

/// What a single backlog line means to the parsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `# Heading` (exactly one `#`), carrying the heading text
    TopHeading(&'a str),
    /// `## Heading` or deeper
    SubHeading,
    /// A checkbox list item with its status and untrimmed text
    Task(TaskStatus, &'a str),
    /// Anything else
    Text,
}

/// Classify a single line.
///
/// Checkbox marks are tested in the order done (`[x]`/`[X]`), blocked
/// (`[!]`), pending (`[ ]`), so a line yields at most one status.
///
/// # Example
///
/// ```
/// use beacon::backlog::{classify_line, LineKind, TaskStatus};
///
/// assert_eq!(classify_line("# Roadmap"), LineKind::TopHeading("Roadmap"));
/// assert_eq!(classify_line("### Notes"), LineKind::SubHeading);
/// assert_eq!(
///     classify_line("- [X] ship it"),
///     LineKind::Task(TaskStatus::Done, "ship it")
/// );
/// assert_eq!(classify_line("plain prose"), LineKind::Text);
/// ```
#[must_use]
pub fn classify_line(line: &str) -> LineKind<'_> {
    if top_heading_re().is_match(line) {
        return LineKind::TopHeading(heading_text(line));
    }
    if line.starts_with("##") {
        return LineKind::SubHeading;
    }
    match parse_checkbox(line) {
        Some((status, text)) => LineKind::Task(status, text),
        None => LineKind::Text,
    }
}

/// Match a checkbox list item, returning its status and captured text.
#[must_use]
pub fn parse_checkbox(line: &str) -> Option<(TaskStatus, &str)> {
    let caps = checkbox_re().captures(line)?;
    let status = match &caps[1] {
        "x" | "X" => TaskStatus::Done,
        "!" => TaskStatus::Blocked,
        _ => TaskStatus::Pending,
    };
    let text = caps.get(2).map_or("", |m| m.as_str());
    Some((status, text))
}

/// Strip the leading `#` run and surrounding whitespace from a heading.
///
/// Inline formatting such as `**bold**` is kept as-is.
#[must_use]
pub fn heading_text(line: &str) -> &str {
    line.trim_start_matches('#').trim()
}

/// Split a document into lines, dropping a single leading byte-order mark.
///
/// Handles both `\n` and `\r\n` endings.
pub fn document_lines(text: &str) -> impl Iterator<Item = &str> {
    text.strip_prefix('\u{feff}').unwrap_or(text).lines()
}
