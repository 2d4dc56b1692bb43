use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

use colored::Colorize;
use serde::Serialize;

/// A single style violation: a stable short code plus a human-readable
/// message. Issues carry no position on their own; they are anchored to a
/// line by the [`Diagnostic`] that wraps them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub code: &'static str,
    pub message: String,
}

impl Issue {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.code, self.message)
    }
}

/// An issue anchored to a line of a specific file. This is the unit the
/// emitters consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub filename: PathBuf,
    pub row: usize,
    pub issue: Issue,
}

impl Diagnostic {
    pub fn new(filename: &Path, row: usize, issue: Issue) -> Self {
        Self { filename: filename.to_path_buf(), row, issue }
    }

    /// Ordering key for the global report: file first, then line. Within a
    /// line the emission order produced by the checkers must be kept, so
    /// callers sort with a stable sort on this key.
    pub fn sort_key(&self) -> (&Path, usize) {
        (self.filename.as_path(), self.row)
    }
}

impl PartialOrd for Diagnostic {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Diagnostic {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then_with(|| self.issue.code.cmp(other.issue.code))
            .then_with(|| self.issue.message.cmp(&other.issue.message))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: Line {}: {} {}",
            self.filename.display().to_string().white().bold(),
            self.row,
            self.issue.code.red().bold(),
            self.issue.message
        )
    }
}
