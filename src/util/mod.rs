//! Filesystem helpers used around the pipeline.
//!
//! - [`file_list`]: sorted `*.txt` enumeration of the input directory
//! - [`file_io`]  : bounded whole-file reads into a reusable buffer

pub mod file_io;
pub mod file_list;

pub use file_io::read_bounded;
pub use file_list::{scan_text_files, FileList};
