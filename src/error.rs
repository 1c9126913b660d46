use std::fmt;
use std::path::PathBuf;

use crate::assign::AssignmentFileError;
use crate::lms::DocumentError;

/// Failures that stop a run before the output is written. Per-entry and
/// per-channel problems are never raised this way; they end up in the
/// pass reports instead.
#[derive(Debug)]
pub enum SpreadError {
    Io(std::io::Error),
    Settings { path: PathBuf, message: String },
    Document { path: PathBuf, source: DocumentError },
    Assignments(AssignmentFileError),
}

impl fmt::Display for SpreadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpreadError::Io(e) => write!(f, "I/O error: {e}"),
            SpreadError::Settings { path, message } => {
                write!(f, "invalid settings file {}: {message}", path.display())
            }
            SpreadError::Document { path, source } => {
                write!(f, "sequence {}: {source}", path.display())
            }
            SpreadError::Assignments(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SpreadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SpreadError::Io(e) => Some(e),
            SpreadError::Document { source, .. } => Some(source),
            SpreadError::Assignments(e) => Some(e),
            SpreadError::Settings { .. } => None,
        }
    }
}

impl From<std::io::Error> for SpreadError {
    fn from(e: std::io::Error) -> Self {
        SpreadError::Io(e)
    }
}

impl From<AssignmentFileError> for SpreadError {
    fn from(e: AssignmentFileError) -> Self {
        SpreadError::Assignments(e)
    }
}
