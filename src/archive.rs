//! On-disk archive format.
//!
//! An archive is a plain concatenation of records, one per archived file, in
//! sorted filename order:
//!
//! ```text
//! +----------------+---------------------------+
//! | len: u32 (LE)  | len bytes of zlib stream  |
//! +----------------+---------------------------+
//! ```
//!
//! There is no global header, no filename and no extra checksum; record `i`
//! maps to the `i`-th archived file.

use std::fs::File;
use std::io::{self, BufReader, ErrorKind, Read, Write};
use std::path::Path;

use crate::codec::decompress_record;
use crate::error::ArchiveError;

/// Size of the length field that precedes every payload.
pub const RECORD_HEADER_SIZE: usize = 4;

/// Appends one length-prefixed record to `out`.
pub fn write_record<W: Write + ?Sized>(out: &mut W, payload: &[u8]) -> io::Result<()> {
    let len = u32::try_from(payload.len()).map_err(|_| {
        io::Error::new(
            ErrorKind::InvalidInput,
            format!("record payload of {} bytes exceeds u32 length field", payload.len()),
        )
    })?;
    out.write_all(&len.to_le_bytes())?;
    out.write_all(payload)
}

/// Iterator over the raw payloads of an archive.
pub struct ArchiveReader<R> {
    inner: R,
    index: usize,
    done: bool,
}

impl<R: Read> ArchiveReader<R> {
    pub fn new(inner: R) -> Self {
        ArchiveReader {
            inner,
            index: 0,
            done: false,
        }
    }

    /// Reads the next payload; `Ok(None)` at a clean end of archive.
    pub fn next_record(&mut self) -> Result<Option<Vec<u8>>, ArchiveError> {
        if self.done {
            return Ok(None);
        }
        let index = self.index;

        let mut header = [0u8; RECORD_HEADER_SIZE];
        let got = read_full(&mut self.inner, &mut header)?;
        if got == 0 {
            self.done = true;
            return Ok(None);
        }
        if got < RECORD_HEADER_SIZE {
            self.done = true;
            return Err(ArchiveError::TruncatedHeader { index });
        }

        let expected = u32::from_le_bytes(header) as usize;
        let mut payload = Vec::new();
        let found = (&mut self.inner)
            .take(expected as u64)
            .read_to_end(&mut payload)?;
        if found < expected {
            self.done = true;
            return Err(ArchiveError::TruncatedPayload {
                index,
                expected,
                found,
            });
        }
        self.index += 1;
        Ok(Some(payload))
    }
}

impl<R: Read> Iterator for ArchiveReader<R> {
    type Item = Result<Vec<u8>, ArchiveError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

// Like `read_exact`, but reports how many bytes were available before EOF.
fn read_full(reader: &mut dyn Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(total)
}

/// Summary of one record, as shown by `tzip list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordInfo {
    pub index: usize,
    pub compressed_len: usize,
    pub original_len: usize,
}

/// Reads every record payload from the archive at `path`.
pub fn read_archive(path: &Path) -> Result<Vec<Vec<u8>>, ArchiveError> {
    let file = File::open(path)?;
    ArchiveReader::new(BufReader::new(file)).collect()
}

/// Reads and inflates every record from the archive at `path`.
pub fn extract_archive(path: &Path) -> Result<Vec<Vec<u8>>, ArchiveError> {
    read_archive(path)?
        .iter()
        .enumerate()
        .map(|(index, payload)| {
            decompress_record(payload).map_err(|source| ArchiveError::Inflate { index, source })
        })
        .collect()
}

/// Inflates every record to report its sizes.
pub fn list_archive(path: &Path) -> Result<Vec<RecordInfo>, ArchiveError> {
    let file = File::open(path)?;
    let mut infos = Vec::new();
    for (index, payload) in ArchiveReader::new(BufReader::new(file)).enumerate() {
        let payload = payload?;
        let original = decompress_record(&payload)
            .map_err(|source| ArchiveError::Inflate { index, source })?;
        infos.push(RecordInfo {
            index,
            compressed_len: payload.len(),
            original_len: original.len(),
        });
    }
    Ok(infos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn record_layout_is_le_length_then_payload() {
        let mut out = Vec::new();
        write_record(&mut out, b"abc").unwrap();
        assert_eq!(out, [3, 0, 0, 0, b'a', b'b', b'c']);
    }

    #[test]
    fn reads_records_in_order() {
        let mut out = Vec::new();
        write_record(&mut out, b"first").unwrap();
        write_record(&mut out, b"").unwrap();
        write_record(&mut out, b"third").unwrap();

        let records: Vec<Vec<u8>> = ArchiveReader::new(Cursor::new(out))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records, vec![b"first".to_vec(), Vec::new(), b"third".to_vec()]);
    }

    #[test]
    fn empty_archive_has_no_records() {
        let mut reader = ArchiveReader::new(Cursor::new(Vec::new()));
        assert!(reader.next_record().unwrap().is_none());
    }

    #[test]
    fn truncated_header_is_reported() {
        let mut out = Vec::new();
        write_record(&mut out, b"ok").unwrap();
        out.extend_from_slice(&[1, 0]);
        let mut reader = ArchiveReader::new(Cursor::new(out));
        assert!(reader.next_record().unwrap().is_some());
        assert!(matches!(
            reader.next_record(),
            Err(ArchiveError::TruncatedHeader { index: 1 })
        ));
        assert!(reader.next().is_none());
    }

    #[test]
    fn truncated_payload_is_reported() {
        let data = vec![10, 0, 0, 0, 1, 2, 3];
        let mut reader = ArchiveReader::new(Cursor::new(data));
        assert!(matches!(
            reader.next_record(),
            Err(ArchiveError::TruncatedPayload {
                index: 0,
                expected: 10,
                found: 3
            })
        ));
    }
}
