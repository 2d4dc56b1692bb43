use colored::Colorize;

use pepper::args::CliArgs;
use pepper::check::check;
use pepper::config::build_config;
use pepper::diagnostic::Diagnostic;
use pepper::discovery::discover_python_file_paths;
use pepper::emitter::{ConciseEmitter, Emitter, JsonEmitter};
use pepper::error::ParseError;
use pepper::logging::init_logging;
use pepper::output_format::OutputFormat;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use std::time::Instant;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<ExitCode> {
    let args = CliArgs::parse();

    init_logging(args.log_level.unwrap_or_default());

    let start = if args.with_timing {
        Some(Instant::now())
    } else {
        None
    };

    let paths = discover_python_file_paths(&args.files);

    if paths.is_empty() {
        println!(
            "{}: {}",
            "Warning".yellow().bold(),
            "No Python files found under the given path(s).".white().bold()
        );
        return Ok(ExitCode::from(0));
    }

    let config = build_config(paths);

    let file_results = check(config);

    let mut all_errors = Vec::new();
    let mut all_diagnostics = Vec::new();

    for (path, result) in file_results {
        match result {
            Ok(diagnostics) => {
                if !diagnostics.is_empty() {
                    all_diagnostics.push((path, diagnostics));
                }
            }
            Err(e) => {
                all_errors.push((path, e));
            }
        }
    }

    // Flatten all diagnostics into a single vector and sort globally. The
    // sort must be stable on (file, line) so that the per-line emission
    // order produced by the checkers survives.
    let mut all_diagnostics_flat: Vec<&Diagnostic> = all_diagnostics
        .iter()
        .flat_map(|(_path, diagnostics)| diagnostics.iter())
        .collect();

    all_diagnostics_flat.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    let mut stdout = std::io::stdout();

    // First, print all per-file failures (parse errors, unreadable files).
    // They go to stderr in every output format, so a JSON report stays
    // machine-readable.
    for (_path, err) in &all_errors {
        if let Some(parse_error) = err.downcast_ref::<ParseError>() {
            eprintln!("{}: {}", "Error".red().bold(), parse_error);
        } else {
            eprintln!("{}: {}", "Error".red().bold(), err);
        }
    }

    if args.output_format == OutputFormat::Json {
        JsonEmitter.emit(&mut stdout, &all_diagnostics_flat)?;
        return Ok(exit_code(&all_errors, &all_diagnostics_flat));
    }

    // Then, print all diagnostics
    ConciseEmitter.emit(&mut stdout, &all_diagnostics_flat)?;

    let total_diagnostics = all_diagnostics_flat.len();
    if total_diagnostics > 1 {
        println!("\nFound {total_diagnostics} errors.");
    } else if total_diagnostics == 1 {
        println!("\nFound 1 error.");
    } else if all_errors.is_empty() {
        println!("All checks passed!");
    }

    if let Some(start) = start {
        let duration = start.elapsed();
        println!("\nChecked files in: {duration:?}");
    }

    Ok(exit_code(&all_errors, &all_diagnostics_flat))
}

fn exit_code(errors: &[(String, anyhow::Error)], diagnostics: &[&Diagnostic]) -> ExitCode {
    if errors.is_empty() && diagnostics.is_empty() {
        ExitCode::from(0)
    } else {
        ExitCode::from(1)
    }
}
