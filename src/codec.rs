//! Compression codec used by the workers.
//!
//! The pipeline only needs a deterministic `bytes -> compressed bytes`
//! function with no state shared between concurrent calls, so the seam is a
//! small [`Codec`] trait. [`ZlibCodec`] is the production implementation.

use std::io::{self, Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::config::{LEVEL_DEFAULT, LEVEL_MAX};

pub trait Codec: Send + Sync {
    /// Compresses all of `input`, appending the result to `output`.
    fn compress(&self, input: &[u8], output: &mut Vec<u8>) -> io::Result<()>;

    /// Upper bound on the bytes [`Codec::compress`] appends for an input of
    /// `input_len` bytes. Callers reserve this much up front so that the
    /// codec never has to grow `output` itself.
    fn max_compressed_len(&self, input_len: usize) -> usize {
        compress_bound(input_len)
    }
}

/// Worst-case zlib stream size for `len` input bytes, at any level.
///
/// The larger of zlib's `compressBound` and miniz's `mz_compressBound`,
/// both of which include the 2-byte header and 4-byte Adler-32 trailer.
pub fn compress_bound(len: usize) -> usize {
    let zlib = len
        .saturating_add(len >> 12)
        .saturating_add(len >> 14)
        .saturating_add(len >> 25)
        .saturating_add(13);
    let miniz_stored = len
        .saturating_add(((len / (31 * 1024)) + 1).saturating_mul(5))
        .saturating_add(128);
    let miniz_expand = len.saturating_add(len / 10).saturating_add(128);
    zlib.max(miniz_stored).max(miniz_expand)
}

/// zlib (RFC 1950) stream compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZlibCodec {
    level: u32,
}

impl Default for ZlibCodec {
    fn default() -> Self {
        ZlibCodec::new(LEVEL_DEFAULT)
    }
}

impl ZlibCodec {
    /// Levels above [`LEVEL_MAX`] are clamped.
    pub fn new(level: u32) -> Self {
        ZlibCodec {
            level: level.min(LEVEL_MAX),
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }
}

impl Codec for ZlibCodec {
    fn compress(&self, input: &[u8], output: &mut Vec<u8>) -> io::Result<()> {
        let mut encoder = ZlibEncoder::new(output, Compression::new(self.level));
        encoder.write_all(input)?;
        encoder.finish()?;
        Ok(())
    }
}

/// Inflates one archive record payload.
pub fn decompress_record(payload: &[u8]) -> io::Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(payload);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}
