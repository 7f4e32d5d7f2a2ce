//! Manifest discovery and environment-driven settings.

use std::env;
use std::path::{Path, PathBuf};

use crate::error::CokeError;

/// Environment variable naming the alternate runtime for `--nodejs`.
pub const RUNTIME_ENV: &str = "COCO_RUNTIME";

/// Environment variable naming the shell that runs task bodies.
pub const SHELL_ENV: &str = "COKE_SHELL";

const DEFAULT_RUNTIME: &str = "node";

/// Find `filename` in `start_dir` or the nearest ancestor that has it.
///
/// # Errors
///
/// Returns `CokeError::ManifestNotFound` once the filesystem root is passed
/// without a match.
pub fn locate_manifest(start_dir: &Path, filename: &str) -> Result<PathBuf, CokeError> {
    manifest_root(start_dir, filename).map(|dir| dir.join(filename))
}

/// The directory the upward search for `filename` stopped in. `filename`
/// may itself contain directories, e.g. `ci/Cokefile`.
///
/// # Errors
///
/// Same as [`locate_manifest`].
pub fn manifest_root(start_dir: &Path, filename: &str) -> Result<PathBuf, CokeError> {
    let mut current_dir = Some(start_dir);
    while let Some(dir) = current_dir {
        let candidate = dir.join(filename);
        if candidate.is_file() {
            log::debug!("found {}", candidate.display());
            return Ok(dir.to_path_buf());
        }
        current_dir = dir.parent();
    }
    Err(CokeError::ManifestNotFound(filename.to_string()))
}

/// Resolve the alternate runtime program on `PATH`.
///
/// # Errors
///
/// Returns `Err` if the configured program cannot be found.
pub fn get_runtime_program() -> Result<PathBuf, which::Error> {
    let name = env::var(RUNTIME_ENV).unwrap_or_else(|_| DEFAULT_RUNTIME.to_string());
    which::which(name)
}

/// The shell and its script flag used for task bodies.
#[must_use]
pub fn get_task_shell() -> (String, &'static str) {
    if let Ok(shell) = env::var(SHELL_ENV)
        && !shell.trim().is_empty()
    {
        let flag = if is_powershell(&shell) { "-Command" } else { "-c" };
        return (shell, flag);
    }

    if cfg!(windows) {
        if which::which("pwsh").is_ok() {
            ("pwsh".to_string(), "-Command")
        } else {
            ("powershell".to_string(), "-Command")
        }
    } else {
        ("sh".to_string(), "-c")
    }
}

fn is_powershell(shell: &str) -> bool {
    let name = Path::new(shell)
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    name == "pwsh" || name == "powershell"
}
