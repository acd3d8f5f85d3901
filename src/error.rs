//! Error types for the compression pipeline.
//!
//! [`TaskError`] describes the failure of a single file and never crosses the
//! worker boundary except through its result slot. [`TzipError`] is a
//! run-level failure returned from [`crate::pipeline::compress_directory`].

use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TzipError>;

/// Failure of one task (one input file).
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("cannot read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} is {size} bytes, larger than the {limit}-byte buffer", .path.display())]
    TooLarge { path: PathBuf, size: u64, limit: usize },
    #[error("cannot compress {}", .path.display())]
    Codec {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot allocate {bytes} bytes for {}", .path.display())]
    OutOfMemory { path: PathBuf, bytes: usize },
    #[error("result slot was already consumed")]
    AlreadyTaken,
}

/// Invalid [`crate::config::Config`] value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("worker count must be between 1 and {max}, got {got}")]
    NbWorkers { got: usize, max: usize },
    #[error("queue capacity must be at least 1")]
    QueueCapacity,
    #[error("maximum file size must be between 1 and {max} bytes, got {got}")]
    MaxFileSize { got: usize, max: usize },
    #[error("compression level must be between 0 and {max}, got {got}")]
    Level { got: u32, max: u32 },
}

/// Malformed archive encountered while reading records back.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("record {index}: truncated length field")]
    TruncatedHeader { index: usize },
    #[error("record {index}: expected {expected} payload bytes, found {found}")]
    TruncatedPayload {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("record {index}: cannot inflate payload")]
    Inflate {
        index: usize,
        #[source]
        source: io::Error,
    },
    #[error("archive I/O error")]
    Io(#[from] io::Error),
}

/// Run-level failure.
#[derive(Debug, Error)]
pub enum TzipError {
    #[error("cannot open directory {}", .path.display())]
    Enumeration {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid configuration")]
    Config(#[from] ConfigError),
    #[error("cannot write archive {}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("task {index} failed")]
    TaskFailed {
        index: usize,
        #[source]
        source: TaskError,
    },
    #[error("cannot start worker pool: {0}")]
    Pool(String),
}

impl TzipError {
    pub(crate) fn output(path: impl Into<PathBuf>, source: io::Error) -> Self {
        TzipError::Output {
            path: path.into(),
            source,
        }
    }
}

/// Displays an error followed by its `source()` chain, `: `-separated.
///
/// Messages above never repeat their cause, so this is how a cause reaches
/// the user outside of `anyhow`'s `{:#}`.
pub struct Chain<'a>(pub &'a (dyn StdError + 'static));

impl fmt::Display for Chain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;
        let mut cause = self.0.source();
        while let Some(err) = cause {
            write!(f, ": {}", err)?;
            cause = err.source();
        }
        Ok(())
    }
}
