use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default output directory, relative to the working directory.
pub const OUTPUTS_DIR: &str = "outputs";
/// File extension of persisted model checkpoints.
pub const MODEL_EXTENSION: &str = "bin";
/// File extension of the rendered training-curve report.
pub const CURVE_EXTENSION: &str = "txt";

/// Standard checkpoint path for a task inside `dir`.
pub fn model_path(task_name: &str, dir: &Path) -> PathBuf {
    dir.join(format!("{}.{}", task_name, MODEL_EXTENSION))
}

/// Standard training-curve path for a task inside `dir`.
pub fn curve_path(task_name: &str, dir: &Path) -> PathBuf {
    dir.join(format!("{}.{}", task_name, CURVE_EXTENSION))
}

/// Resolve the model and curve paths for a run.
///
/// A user-supplied path with a file extension is taken as the model file
/// itself, with the curve written next to it; a path without an extension
/// is treated as an output directory; with no path at all the convention
/// is `outputs/<task>.bin` and `outputs/<task>.txt`.
pub fn resolve_task_paths(task_name: &str, output: Option<&Path>) -> (PathBuf, PathBuf) {
    if let Some(path) = output {
        if path.extension().is_some() {
            return (path.to_path_buf(), path.with_extension(CURVE_EXTENSION));
        }
        return (model_path(task_name, path), curve_path(task_name, path));
    }
    let dir = Path::new(OUTPUTS_DIR);
    (model_path(task_name, dir), curve_path(task_name, dir))
}

/// Create the parent directory of a file path if it does not exist yet.
pub fn ensure_parent(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
