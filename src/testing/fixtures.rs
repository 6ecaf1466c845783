//! Test fixtures for creating reproducible scan roots.
//!
//! Provides temporary directory trees holding several projects with
//! backlog, snapshot and README artifacts.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary scan root. Cleaned up when dropped.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new()
///     .with_project("alpha")
///     .with_backlog("alpha", "# Backlog\n# Epic\n- [ ] task\n");
/// assert!(fixture.project_path("alpha").is_dir());
/// ```
pub struct TestFixture {
    temp_dir: TempDir,
}

impl TestFixture {
    /// Create an empty scan root.
    ///
    /// # Panics
    ///
    /// Panics if temporary directory creation fails.
    #[must_use]
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Create a root with one fully documented project whose backlog is
    /// entirely done.
    #[must_use]
    pub fn complete_project(name: &str) -> Self {
        Self::new()
            .with_backlog(name, Self::done_backlog_content())
            .with_snapshot(name)
            .with_readme(name, "# Complete Project\n\nEverything shipped.\n")
    }

    /// Create an empty project directory.
    #[must_use]
    pub fn with_project(self, name: &str) -> Self {
        std::fs::create_dir_all(self.project_path(name)).expect("Failed to create project dir");
        self
    }

    /// Write `.claude/BACKLOG.md` for a project.
    #[must_use]
    pub fn with_backlog(self, name: &str, content: &str) -> Self {
        self.write(name, ".claude/BACKLOG.md", content)
    }

    /// Write `.claude/SNAPSHOT.md` for a project.
    #[must_use]
    pub fn with_snapshot(self, name: &str) -> Self {
        self.write(name, ".claude/SNAPSHOT.md", "# Snapshot\n")
    }

    /// Write `README.md` for a project.
    #[must_use]
    pub fn with_readme(self, name: &str, content: &str) -> Self {
        self.write(name, "README.md", content)
    }

    /// Write an arbitrary file relative to a project.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    #[must_use]
    pub fn write(self, name: &str, rel_path: &str, content: &str) -> Self {
        let path = self.project_path(name).join(rel_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(&path, content).expect("Failed to write fixture file");
        self
    }

    /// Root of the scan.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Directory of one project.
    #[must_use]
    pub fn project_path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    fn done_backlog_content() -> &'static str {
        r#"# Backlog

# Foundations
- [x] Set up repository
- [x] Write parser [est:2h] [actual:3h]

## Current
Nothing left
"#
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
