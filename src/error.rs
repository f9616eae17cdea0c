//! Error types for vcftable

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for vcftable operations
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can abort a run. Schema anomalies (missing sentinels, unmatched info keys,
/// surplus annotation values) are not errors and never show up here.
#[derive(Debug, Error)]
pub enum Error {
    /// The input VCF does not exist.
    #[error("input VCF not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Opening or reading through htslib (bgzf) failed.
    #[error("htslib error: {0}")]
    Htslib(#[from] rust_htslib::errors::Error),

    /// A data line has fewer than eight tab-separated fields.
    #[error("line {line_number}: expected at least 8 tab-separated fields, found {found}: {line}")]
    MalformedFixedFields {
        /// 1-based line number in the input file
        line_number: usize,
        /// Number of tab-separated fields on the line
        found: usize,
        /// The offending line, without its terminator
        line: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("could not start decoding threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
