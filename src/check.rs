use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use rayon::prelude::*;
use rustpython_parser::{Parse, ast};
use tracing::debug;

use crate::check_ast::AstChecker;
use crate::config::Config;
use crate::diagnostic::Diagnostic;
use crate::error::ParseError;
use crate::line::SourceLine;
use crate::utils::find_new_lines;

/// Check every file in the config, in parallel. Files are independent, so
/// each one gets its own buffer, tree, and issue index; the only shared
/// resource is the output, which is why each file's report comes back as
/// one value instead of being streamed.
///
/// A failure on one file (unreadable, syntax error) never aborts the
/// others: it comes back as that file's `Err` entry.
pub fn check(config: Config) -> Vec<(String, Result<Vec<Diagnostic>, anyhow::Error>)> {
    let config = Arc::new(config);

    config
        .paths
        .par_iter()
        .map(|file| {
            let res = check_path(file, Arc::clone(&config));
            (file.display().to_string(), res)
        })
        .collect()
}

pub fn check_path(path: &PathBuf, _config: Arc<Config>) -> Result<Vec<Diagnostic>, anyhow::Error> {
    debug!("checking {}", path.display());

    // The handle is released as soon as the contents are in memory; the
    // text and the tree built from it outlive it.
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    get_checks(&contents, path)
        .with_context(|| format!("Failed to get checks for file: {}", path.display()))
}

/// Takes the Python code as a string, parses it, and obtains a (possibly
/// empty) vector of `Diagnostic`s.
///
/// Protocol, in strict order: parse the whole text (a syntax error aborts
/// the file, no partial report); run the tree walk to build the line→issues
/// index; then scan the text line by line, emitting each line's lexical
/// issues followed by the tree issues recorded for that line. Blank lines
/// emit nothing and only feed the blank-line counter.
pub fn get_checks(contents: &str, file: &Path) -> Result<Vec<Diagnostic>> {
    let suite = ast::Suite::parse(contents, &file.to_string_lossy()).map_err(|source| {
        ParseError { filename: file.to_path_buf(), source }
    })?;

    let loc_new_lines = find_new_lines(contents);
    let mut ast_checker = AstChecker::new(&loc_new_lines);
    ast_checker.check_suite(&suite);
    let mut line_issues = ast_checker.into_line_issues();

    let mut diagnostics: Vec<Diagnostic> = vec![];
    let mut blank_lines_before = 0_usize;

    for (i, raw) in contents.lines().enumerate() {
        let index = i + 1;

        if raw.is_empty() {
            blank_lines_before += 1;
            continue;
        }

        let line = SourceLine::new(raw, index, blank_lines_before);
        for issue in line.issues() {
            diagnostics.push(Diagnostic::new(file, index, issue));
        }
        if let Some(tree_issues) = line_issues.remove(&index) {
            for issue in tree_issues {
                diagnostics.push(Diagnostic::new(file, index, issue));
            }
        }
        blank_lines_before = 0;
    }

    Ok(diagnostics)
}
