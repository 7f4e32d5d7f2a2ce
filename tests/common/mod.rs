//! Common test helpers shared across integration tests

#![allow(clippy::unwrap_used)]
#![allow(dead_code)] // Not all helpers are used by every test file

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Path of the built `coco` binary
pub fn coco_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_coco"))
}

/// Path of the built `coke` binary
pub fn coke_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_coke"))
}

/// Helper to create a temporary directory for tests
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::TempDir::new().unwrap()
}

/// Helper to create a Cokefile in a directory
pub fn create_cokefile(dir: &Path, content: &str) {
    fs::write(dir.join("Cokefile"), content).unwrap();
}

/// Helper to write a file, creating parent directories
pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Command isolated from the caller's shell and logging settings
pub fn test_command(binary: &Path) -> Command {
    let mut cmd = Command::new(binary);
    cmd.env_remove("COKE_SHELL").env_remove("RUST_LOG");
    cmd
}

/// Package version for testing --version flag
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
