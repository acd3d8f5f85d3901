// tzip — parallel, order-preserving text directory compressor

pub mod display;
pub mod config;
pub mod error;
pub mod util;
pub mod codec;
pub mod archive;
pub mod report;
pub mod pipeline;
pub mod cli;

pub const TZIP_VERSION_STRING: &str = env!("CARGO_PKG_VERSION");

// ── Top-level re-exports ──────────────────────────────────────────────────────
pub use codec::{Codec, ZlibCodec};
pub use config::{Config, FailurePolicy};
pub use error::{ArchiveError, ConfigError, Result, TaskError, TzipError};
pub use pipeline::{compress_directory, compress_files, Outcome};
pub use report::CompressionReport;
pub use util::file_list::{scan_text_files, FileList};
