use clap::{Parser, arg};

use crate::logging::LogLevel;
use crate::output_format::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    name = "pepper",
    about = "pepper: a PEP 8 style checker for Python code",
    after_help = "For more information on a reported issue, see the rule table in the README."
)]
pub struct CliArgs {
    #[arg(
        default_value = ".",
        help = "Files or directories to check, for example `pepper src/`."
    )]
    pub files: Vec<String>,
    #[arg(
        long,
        value_enum,
        default_value_t = OutputFormat::default(),
        help = "Output serialization format for violations."
    )]
    pub output_format: OutputFormat,
    #[arg(
        short,
        long,
        default_value = "false",
        help = "Show the time taken by the analysis."
    )]
    pub with_timing: bool,
    #[arg(
        long,
        help = "The log level. One of: `error`, `warn`, `info`, `debug`, or `trace`. Defaults to `warn`."
    )]
    pub log_level: Option<LogLevel>,
}
