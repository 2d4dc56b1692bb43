use std::path::PathBuf;

/// Everything a batch check needs to know. One per invocation; wrapped in
/// an `Arc` by `check()` for the parallel fan-out.
#[derive(Debug, Clone)]
pub struct Config {
    /// The files to analyze, already expanded and sorted by discovery.
    pub paths: Vec<PathBuf>,
}

pub fn build_config(paths: Vec<PathBuf>) -> Config {
    Config { paths }
}
