//! Bounded whole-file reads.
//!
//! Input files are loaded in one piece into a caller-owned buffer that is
//! reused from task to task. A file larger than the buffer bound is rejected
//! with [`TaskError::TooLarge`]; it is never silently truncated.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::error::TaskError;

/// Reads all of `path` into `buf` (cleared first) and returns its length.
///
/// A file of exactly `limit` bytes is accepted. The size is checked against
/// the file metadata first and again while reading, so a file that grows
/// between the two is still rejected.
pub fn read_bounded(path: &Path, limit: usize, buf: &mut Vec<u8>) -> Result<usize, TaskError> {
    let read_err = |source: io::Error| TaskError::Read {
        path: path.to_path_buf(),
        source,
    };
    let too_large = |size: u64| TaskError::TooLarge {
        path: path.to_path_buf(),
        size,
        limit,
    };

    let file = File::open(path).map_err(read_err)?;
    let size = file.metadata().map_err(read_err)?.len();
    if size > limit as u64 {
        return Err(too_large(size));
    }

    buf.clear();
    // One spare byte lets the read detect growth past the limit.
    let wanted = size as usize + 1;
    buf.try_reserve_exact(wanted.min(limit + 1))
        .map_err(|_| TaskError::OutOfMemory {
            path: path.to_path_buf(),
            bytes: wanted,
        })?;

    let read = file
        .take(limit as u64 + 1)
        .read_to_end(buf)
        .map_err(read_err)?;
    if read > limit {
        return Err(too_large(read as u64));
    }
    Ok(read)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn reads_whole_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, b"world").unwrap();
        let mut buf = Vec::new();
        assert_eq!(read_bounded(&path, 1024, &mut buf).unwrap(), 5);
        assert_eq!(buf, b"world");
    }

    #[test]
    fn buffer_is_cleared_between_reads() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, b"longer content").unwrap();
        fs::write(&b, b"hi").unwrap();
        let mut buf = Vec::new();
        read_bounded(&a, 1024, &mut buf).unwrap();
        read_bounded(&b, 1024, &mut buf).unwrap();
        assert_eq!(buf, b"hi");
    }

    #[test]
    fn exact_limit_is_accepted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("exact.txt");
        fs::write(&path, vec![b'x'; 64]).unwrap();
        let mut buf = Vec::new();
        assert_eq!(read_bounded(&path, 64, &mut buf).unwrap(), 64);
        assert_eq!(buf.len(), 64);
    }

    #[test]
    fn one_byte_over_limit_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("over.txt");
        fs::write(&path, vec![b'x'; 65]).unwrap();
        let mut buf = Vec::new();
        match read_bounded(&path, 64, &mut buf) {
            Err(TaskError::TooLarge { size, limit, .. }) => {
                assert_eq!(size, 65);
                assert_eq!(limit, 64);
            }
            other => panic!("expected TooLarge, got {:?}", other),
        }
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = TempDir::new().unwrap();
        let mut buf = Vec::new();
        assert!(matches!(
            read_bounded(&dir.path().join("gone.txt"), 64, &mut buf),
            Err(TaskError::Read { .. })
        ));
    }
}
