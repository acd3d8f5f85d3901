//! Input enumeration: the sorted list of `*.txt` files in one directory.
//!
//! The directory is listed with [`walkdir`] at depth 1 only. Symlinks are not
//! followed (`follow_links(false)`), so a symlink entry reports a symlink
//! `file_type()` and is excluded along with directories and other non-regular
//! entries.
//!
//! Names are sorted by their raw encoded bytes, which makes the archive record
//! order independent of locale and of the order the OS returns entries in.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::TEXT_SUFFIX;
use crate::error::{Result, TzipError};

/// Immutable, sorted list of input files. Index `i` is task `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileList {
    dir: PathBuf,
    names: Vec<OsString>,
}

impl FileList {
    /// Builds a list from explicit names; they are sorted here.
    pub fn new(dir: impl Into<PathBuf>, mut names: Vec<OsString>) -> Self {
        names.sort();
        FileList {
            dir: dir.into(),
            names,
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, index: usize) -> Option<&OsStr> {
        self.names.get(index).map(OsString::as_os_str)
    }

    /// Full path of task `index`.
    pub fn path(&self, index: usize) -> Option<PathBuf> {
        self.name(index).map(|name| self.dir.join(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &OsStr> {
        self.names.iter().map(OsString::as_os_str)
    }
}

/// Case-sensitive `.txt` suffix test on the raw file name.
pub fn is_text_file_name(name: &OsStr) -> bool {
    name.as_encoded_bytes().ends_with(TEXT_SUFFIX.as_bytes())
}

/// Lists the regular `*.txt` files directly inside `dir`, sorted.
///
/// Any failure to open or read the directory is an
/// [`TzipError::Enumeration`]; an empty result is not an error.
pub fn scan_text_files(dir: &Path) -> Result<FileList> {
    let enumeration = |source: io::Error| TzipError::Enumeration {
        path: dir.to_path_buf(),
        source,
    };

    let meta = fs::metadata(dir).map_err(enumeration)?;
    if !meta.is_dir() {
        return Err(enumeration(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a directory",
        )));
    }

    let mut names = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            enumeration(
                e.io_error()
                    .map(|io| io::Error::new(io.kind(), io.to_string()))
                    .unwrap_or_else(|| io::Error::other(e.to_string())),
            )
        })?;
        if entry.file_type().is_file() && is_text_file_name(entry.file_name()) {
            names.push(entry.file_name().to_os_string());
        }
    }
    Ok(FileList::new(dir, names))
}
