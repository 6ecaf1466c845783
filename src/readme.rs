//! README title and description extraction.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#\s+(.+)$").expect("title pattern is valid"))
}

/// Title and first paragraph of a project README.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadmeInfo {
    pub title: String,
    pub description: String,
}

/// Extract the title and the first paragraph from README markdown.
///
/// The title is the first `# ` heading. The description is the first run of
/// non-blank lines, joined with spaces; when a title exists, heading lines
/// ahead of that run are skipped.
///
/// # Example
///
/// ```
/// use beacon::readme::parse_readme;
///
/// let info = parse_readme("# Beacon\n\nProject status\nfrom backlogs.\n\nMore.\n");
/// assert_eq!(info.title, "Beacon");
/// assert_eq!(info.description, "Project status from backlogs.");
/// ```
#[must_use]
pub fn parse_readme(text: &str) -> ReadmeInfo {
    let title = text
        .lines()
        .find_map(|line| title_re().captures(line))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    let paragraph: Vec<&str> = text
        .lines()
        .skip_while(|line| line.trim().is_empty() || (!title.is_empty() && line.starts_with('#')))
        .map(str::trim)
        .take_while(|line| !line.is_empty())
        .collect();

    ReadmeInfo {
        title,
        description: paragraph.join(" ").trim().to_string(),
    }
}
