//! Error types shared by the compiler driver and the task runner.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

use crate::coke::manifest::ManifestError;

pub type Result<T> = std::result::Result<T, CocoError>;

/// Failures raised while carrying a compilation unit through the pipeline.
#[derive(Error, Debug)]
pub enum CocoError {
    #[error("SyntaxError: {message} on line {line}")]
    Syntax { line: usize, message: String },

    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("ReferenceError: {0} is not defined")]
    Reference(String),

    #[error("Can't find: {}", .0.display())]
    NotFound(PathBuf),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl CocoError {
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        CocoError::Syntax {
            line,
            message: message.into(),
        }
    }

    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        CocoError::Parse {
            line,
            message: message.into(),
        }
    }

    /// Syntax-class failures are shown verbatim; everything else gets a trace.
    #[must_use]
    pub fn is_syntax(&self) -> bool {
        matches!(self, CocoError::Syntax { .. }) || self.to_string().starts_with("Parse error ")
    }
}

/// Failures of the task runner.
#[derive(Error, Debug)]
pub enum CokeError {
    #[error("no \"{0}\"")]
    ManifestNotFound(String),

    #[error("{0} requires a FILE argument")]
    MissingManifestArg(String),

    #[error("{0}")]
    Manifest(#[from] Box<ManifestError>),

    #[error("no such task: \"{0}\"")]
    NoSuchTask(String),

    #[error("task \"{task}\" failed: {status}")]
    TaskFailed { task: String, status: ExitStatus },

    #[error("{0}")]
    Options(#[from] clap::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
