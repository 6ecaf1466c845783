//! Epic/task tree construction.

use super::line::{classify_line, document_lines, LineKind};
use super::{Epic, Task};

/// Scan state threaded through the line fold.
///
/// `current` indexes the epic receiving tasks; sub-headings reset it to
/// `None` so tasks beneath them are dropped.
#[derive(Debug, Default)]
struct EpicScan {
    epics: Vec<Epic>,
    current: Option<usize>,
    seen_title: bool,
}

impl EpicScan {
    fn step(mut self, line: &str) -> Self {
        match classify_line(line) {
            LineKind::TopHeading(_) if !self.seen_title => {
                self.seen_title = true;
            }
            LineKind::TopHeading(title) => {
                self.epics.push(Epic::new(title));
                self.current = Some(self.epics.len() - 1);
            }
            LineKind::SubHeading => {
                self.current = None;
            }
            LineKind::Task(status, text) => {
                if let Some(epic) = self.current.and_then(|idx| self.epics.get_mut(idx)) {
                    epic.tasks.push(Task::new(status, text.trim()));
                }
            }
            LineKind::Text => {}
        }
        self
    }
}

/// Parse a backlog document into epics, in document order.
///
/// The first top-level heading is the document title and never becomes an
/// epic. Checkboxes outside an epic (before the second top-level heading or
/// under a `##` sub-heading) are dropped.
///
/// # Example
///
/// ```
/// use beacon::backlog::{parse_epics, TaskStatus};
///
/// let epics = parse_epics("# Backlog\n# Parser\n- [x] lexer\n- [ ] grammar\n");
/// assert_eq!(epics.len(), 1);
/// assert_eq!(epics[0].title, "Parser");
/// assert_eq!(epics[0].tasks[1].status, TaskStatus::Pending);
/// ```
#[must_use]
pub fn parse_epics(text: &str) -> Vec<Epic> {
    document_lines(text)
        .fold(EpicScan::default(), EpicScan::step)
        .epics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backlog::TaskStatus;

    #[test]
    fn test_empty_document_has_no_epics() {
        assert!(parse_epics("").is_empty());
    }

    #[test]
    fn test_title_only_document_has_no_epics() {
        assert!(parse_epics("# Title\n- [ ] orphan\nsome prose\n").is_empty());
    }

    #[test]
    fn test_epics_and_task_order() {
        let doc = "# Title\n# Epic A\n- [x] done task\n- [ ] pending task\n- [!] blocked task\n# Epic B\n* [X] shipped\n";
        let epics = parse_epics(doc);

        assert_eq!(epics.len(), 2);
        assert_eq!(epics[0].title, "Epic A");
        let statuses: Vec<TaskStatus> = epics[0].tasks.iter().map(|t| t.status).collect();
        assert_eq!(
            statuses,
            vec![TaskStatus::Done, TaskStatus::Pending, TaskStatus::Blocked]
        );
        assert_eq!(epics[0].tasks[2].text, "blocked task");
        assert_eq!(epics[1].title, "Epic B");
        assert_eq!(epics[1].tasks[0].text, "shipped");
    }

    #[test]
    fn test_checkbox_before_first_epic_is_dropped() {
        let doc = "- [x] before title\n# Title\n- [ ] before epic\n# Epic\n- [ ] inside\n";
        let epics = parse_epics(doc);
        assert_eq!(epics.len(), 1);
        assert_eq!(epics[0].tasks.len(), 1);
        assert_eq!(epics[0].tasks[0].text, "inside");
    }

    #[test]
    fn test_sub_heading_closes_current_epic() {
        let doc = "# Title\n# Epic\n- [ ] kept\n## Notes\n- [ ] dropped\n# Next\n- [ ] kept too\n";
        let epics = parse_epics(doc);
        assert_eq!(epics[0].tasks.len(), 1);
        assert_eq!(epics[1].tasks.len(), 1);
        assert_eq!(epics[1].tasks[0].text, "kept too");
    }

    #[test]
    fn test_epic_without_tasks_is_kept() {
        let epics = parse_epics("# Title\n# Someday\n\nnothing here yet\n");
        assert_eq!(epics.len(), 1);
        assert!(epics[0].tasks.is_empty());
        assert!(!epics[0].has_blockers());
    }

    #[test]
    fn test_task_text_is_trimmed() {
        let epics = parse_epics("# T\r\n# E\r\n- [ ]   padded text   \r\n");
        assert_eq!(epics[0].tasks[0].text, "padded text");
    }

    #[test]
    fn test_bom_prefixed_title_is_recognized() {
        let epics = parse_epics("\u{feff}# Title\n# Epic\n- [x] a\n");
        assert_eq!(epics.len(), 1);
        assert_eq!(epics[0].title, "Epic");
    }

    #[test]
    fn test_heading_formatting_is_retained() {
        let epics = parse_epics("# T\n#  *Phase 2* `core`\n");
        assert_eq!(epics[0].title, "*Phase 2* `core`");
    }
}
