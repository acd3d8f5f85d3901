//! End-of-run summary.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::pipeline::writer::{DrainSummary, SkippedTask};

/// Sizes and outcome of one archive run.
#[derive(Debug)]
pub struct CompressionReport {
    pub archive: PathBuf,
    pub files: usize,
    pub records: usize,
    pub total_original: u64,
    pub total_compressed: u64,
    pub skipped: Vec<SkippedTask>,
    pub elapsed: Duration,
}

impl CompressionReport {
    pub(crate) fn new(
        archive: PathBuf,
        files: usize,
        summary: DrainSummary,
        elapsed: Duration,
    ) -> Self {
        CompressionReport {
            archive,
            files,
            records: summary.records,
            total_original: summary.total_original,
            total_compressed: summary.total_compressed,
            skipped: summary.skipped,
            elapsed,
        }
    }

    /// Space saved as a percentage of the original size:
    /// `100 × (original − compressed) / original`. `None` when nothing was
    /// read. Negative when compression expanded the data.
    pub fn ratio(&self) -> Option<f64> {
        compression_ratio(self.total_original, self.total_compressed)
    }

    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

pub fn compression_ratio(total_original: u64, total_compressed: u64) -> Option<f64> {
    if total_original == 0 {
        return None;
    }
    Some(100.0 * (total_original as f64 - total_compressed as f64) / total_original as f64)
}

impl fmt::Display for CompressionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ratio() {
            Some(ratio) => write!(f, "Compression rate: {:.2}%", ratio),
            None => write!(f, "Compression rate: n/a (no input bytes)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(original: u64, compressed: u64) -> CompressionReport {
        CompressionReport {
            archive: PathBuf::from("text.tzip"),
            files: 1,
            records: 1,
            total_original: original,
            total_compressed: compressed,
            skipped: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn ratio_formula() {
        assert_eq!(compression_ratio(200, 50), Some(75.0));
        assert_eq!(compression_ratio(100, 100), Some(0.0));
        assert_eq!(compression_ratio(10, 20), Some(-100.0));
    }

    #[test]
    fn zero_original_has_no_ratio() {
        assert_eq!(compression_ratio(0, 8), None);
        assert_eq!(report(0, 8).to_string(), "Compression rate: n/a (no input bytes)");
    }

    #[test]
    fn display_uses_two_decimals() {
        assert_eq!(report(3, 1).to_string(), "Compression rate: 66.67%");
        assert!(report(3, 1).is_complete());
    }
}
