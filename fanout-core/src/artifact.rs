//! Per-identifier artifact encoding: a bare little-endian f32 sequence.
//!
//! The record length is recovered from the byte length, so the encoding
//! carries no header at all.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::Result;

/// Writes `values` to `path`, overwriting any previous artifact.
///
/// # Errors
///
/// Returns an error if the file cannot be written (e.g. the bucket directory
/// is missing because bootstrap never ran).
pub fn write(path: &Path, values: &[f32]) -> Result<()> {
    let mut bytes = Vec::with_capacity(values.len() * 4);
    for v in values {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    fs::write(path, bytes)?;
    Ok(())
}

/// Reads one artifact back as an owned f32 vector.
///
/// # Errors
///
/// Returns the underlying I/O error if the file is absent, and an
/// invalid-data error if its byte length is not a whole number of f32s.
pub fn read(path: &Path) -> Result<Vec<f32>> {
    let bytes = fs::read(path)?;
    if bytes.len() % 4 != 0 {
        return Err(std::io::Error::new(
            ErrorKind::InvalidData,
            format!("{}: {} bytes is not a whole number of f32 values", path.display(), bytes.len()),
        )
        .into());
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}
