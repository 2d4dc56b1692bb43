//! Core functionality for the pepper Python style checker
//!
//! This crate provides the core linting functionality including:
//! - Per-line lexical checks (line length, indentation, comments, ...)
//! - AST-based naming and default-argument checks
//! - Diagnostic generation and reporting
//! - File discovery and batch processing

pub mod args;
pub mod check;
pub mod check_ast;
pub mod config;
pub mod diagnostic;
pub mod discovery;
pub mod emitter;
pub mod error;
pub mod line;
pub mod logging;
pub mod output_format;
pub mod utils;

// Re-export commonly used types for convenience
pub use check::check;
pub use check_ast::{AstChecker, LineIssueIndex};
pub use config::{Config, build_config};
pub use diagnostic::{Diagnostic, Issue};
pub use discovery::discover_python_file_paths;
pub use line::SourceLine;
