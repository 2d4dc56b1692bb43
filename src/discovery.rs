use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

/// Expand the user-provided paths into the list of Python files to check.
///
/// A path to a file is passed through as-is. A directory is walked
/// recursively (respecting ignore files, like the rest of the walk) and
/// filtered to the `.py` extension. The result is sorted so that a batch
/// run is deterministic regardless of walk order.
pub fn discover_python_file_paths(paths: &[String]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = vec![];

    for path in paths {
        let path = Path::new(path);
        if path.is_file() {
            result.push(path.to_path_buf());
            continue;
        }

        for entry in WalkBuilder::new(path).build().flatten() {
            if entry.file_type().is_some_and(|t| t.is_file())
                && has_python_extension(entry.path())
            {
                result.push(entry.into_path());
            }
        }
    }

    result.sort();
    result
}

pub fn has_python_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "py")
}
