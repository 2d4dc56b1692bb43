use std::path::PathBuf;

use thiserror::Error;

/// The source text of a file is not valid Python. Analysis of that file is
/// abandoned entirely: line-level checks without a valid tree would
/// misattribute tree issues, so the policy is all-or-nothing per file.
#[derive(Debug, Error)]
#[error("Failed to parse {}: {source}", .filename.display())]
pub struct ParseError {
    pub filename: PathBuf,
    #[source]
    pub source: rustpython_parser::ParseError,
}
