//! Error types for the fanout benchmark.

use std::path::PathBuf;

use thiserror::Error;

use crate::layout::LayoutKind;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for all benchmark operations.
///
/// Every variant is fatal to the current invocation; there are no retries
/// anywhere in the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying I/O failure, including corrupt on-disk data
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted identifier set disagrees with the requested count
    #[error("identifier manifest holds {actual} entries, expected {expected}")]
    CountMismatch {
        /// Count requested at generation time
        expected: usize,
        /// Count found after reloading the persisted manifest
        actual: usize,
    },

    /// The identifier manifest has not been generated yet
    #[error("identifier manifest not found at {}; run `init` first", .path.display())]
    ManifestMissing {
        /// Expected manifest location
        path: PathBuf,
    },

    /// An expected on-disk artifact is absent
    #[error("missing artifact {id} under the {layout} layout")]
    MissingArtifact {
        /// Layout that was being read
        layout: LayoutKind,
        /// Identifier (or block file) whose artifact is absent
        id: String,
    },

    /// The block file's byte length disagrees with the declared shape
    #[error(
        "block {} holds {actual_bytes} bytes, expected {rows} x {cols} f32 rows ({expected_bytes} bytes)",
        .path.display()
    )]
    ShapeMismatch {
        /// Block file location
        path: PathBuf,
        /// Declared row count
        rows: usize,
        /// Declared row length
        cols: usize,
        /// Byte length implied by the declared shape
        expected_bytes: u64,
        /// Byte length actually on disk
        actual_bytes: u64,
    },

    /// A caller-supplied parameter could not be interpreted
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
