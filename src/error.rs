//! Crate error type

use crate::conllu::{ParseError, ReadError};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from loading a corpus or writing a report
///
/// Failures to resolve a particle's head are not errors; the matcher drops
/// those candidates silently.
#[derive(Debug, Error)]
pub enum EzafeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to open file {}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Failed to parse in-memory CoNLL-U text")]
    InvalidText(#[from] ParseError),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl EzafeError {
    /// Attach the file path to a whole-file read failure
    pub(crate) fn from_read(path: &Path, err: ReadError) -> Self {
        match err {
            ReadError::Open(source) => EzafeError::FileOpen {
                path: path.to_path_buf(),
                source,
            },
            ReadError::Parse(source) => EzafeError::Parse {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}
