//! Beacon - live status for backlog-driven projects
//!
//! Reads each project's free-form backlog markdown and its git history and
//! produces a structured summary: progress, current task, epics with their
//! tasks, blockers, and when each task was started and finished.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`backlog`] - Line classification, epic parsing and progress metrics
//! - [`timing`] - Task-key normalization and history-based timing reconstruction
//! - [`status`] - Coarse project status classification
//! - [`readme`] - README title/description extraction
//! - [`git`] - Bounded git queries behind the [`git::RepoHistory`] trait
//! - [`scan`] - Project discovery and summary assembly
//! - [`config`] - Scan configuration loading
//! - [`error`] - Custom error types and handling
//! - [`testing`] - Test doubles for the git boundary
//!
//! # Example
//!
//! ```
//! use beacon::backlog::{parse_backlog, parse_epics};
//! use beacon::status::{classify_status, ProjectStatus};
//!
//! let doc = "# Backlog\n# Launch\n- [x] landing page\n- [!] payment provider\n";
//! let epics = parse_epics(doc);
//! let progress = parse_backlog(doc);
//!
//! assert_eq!(progress.metrics.progress_percent, 100);
//! assert_eq!(
//!     classify_status(&epics, Some(&progress.metrics), &[]),
//!     ProjectStatus::Blocked
//! );
//! ```

pub mod backlog;
pub mod config;
pub mod error;
pub mod git;
pub mod readme;
pub mod scan;
pub mod status;
pub mod testing;
pub mod timing;

// Re-export commonly used types
pub use error::{BeaconError, Result};

pub use backlog::{parse_backlog, parse_epics, BacklogProgress, Epic, Metrics, Task, TaskStatus};
pub use config::ScanConfig;
pub use git::{GitCli, RepoHistory};
pub use scan::{scan_project, scan_projects, ProjectSummary};
pub use status::{classify_status, ProjectStatus};
pub use timing::{normalize_task_key, reconstruct_timings, TaskTiming, TimingMap};
