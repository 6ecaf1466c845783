//! Testing infrastructure for Beacon.
//!
//! - **Mocks**: [`MockRepoHistory`] serves canned git output so scans run
//!   without a git executable.
//! - **Fixtures**: temporary scan roots with project artifacts (test-only).
//!
//! # Example
//!
//! ```rust,ignore
//! use beacon::testing::{MockRepoHistory, TestFixture};
//!
//! let fixture = TestFixture::complete_project("alpha");
//! let history = MockRepoHistory::new().with_commit_log("alpha", "abc\u{1f}2024-01-01\u{1f}init\n");
//! ```

#[cfg(test)]
pub mod fixtures;
pub mod mocks;

#[cfg(test)]
pub use fixtures::*;
pub use mocks::*;
