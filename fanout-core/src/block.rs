//! The contiguous block: every array stored as one row of a single
//! pre-sized memory-mapped file.
//!
//! The block carries no header. Its declared shape is `(rows, cols)` f32
//! values, row-major, and the only validation is that the file's byte length
//! matches that shape exactly. [`BlockMut`] is the exclusive write path;
//! [`Block`] is the read-only path used by the test phase. Both hold an fs2
//! advisory lock for their lifetime and release mapping and lock on drop,
//! error paths included.

use std::fs::File;
use std::fs::OpenOptions;
use std::path::Path;

use fs2::FileExt;
use memmap2::Mmap;
use memmap2::MmapMut;

use crate::error::{Error, Result};
use crate::layout::LayoutKind;

/// Declared block shape: `rows` arrays of `cols` f32 values each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    /// Number of arrays (one per manifest identifier)
    pub rows: usize,
    /// f32 values per array
    pub cols: usize,
}

impl Shape {
    /// Byte stride of one row.
    fn row_bytes(self) -> usize {
        self.cols * size_of::<f32>()
    }

    /// Total byte length implied by the shape.
    fn byte_len(self) -> u64 {
        self.rows as u64 * self.row_bytes() as u64
    }
}

/// Write half of the block: exclusive, pre-sized, flushed on demand.
#[derive(Debug)]
pub struct BlockMut {
    /// File handle (owns the exclusive lock)
    file: File,
    mmap: MmapMut,
    shape: Shape,
}

impl BlockMut {
    /// Creates a block file of exactly `shape`, truncating any previous one.
    ///
    /// The file is pre-sized up front so every row write lands inside the
    /// mapping; there is no growth path.
    ///
    /// # Errors
    ///
    /// Returns an error if the shape is empty, the file cannot be created,
    /// or another process already holds the block open.
    pub fn create(path: &Path, shape: Shape) -> Result<Self> {
        if shape.rows == 0 || shape.cols == 0 {
            return Err(Error::InvalidArgument(format!(
                "block shape must be non-empty, got {} x {}",
                shape.rows, shape.cols
            )));
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        file.try_lock_exclusive().map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("block {} is already open in another process", path.display()),
            ))
        })?;

        file.set_len(shape.byte_len())?;
        let mmap = unsafe { MmapMut::map_mut(&file)? };

        Ok(Self { file, mmap, shape })
    }

    /// Writes one row at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the row length disagrees with the shape or the
    /// index is out of bounds.
    pub fn set_row(&mut self, index: usize, row: &[f32]) -> Result<()> {
        if row.len() != self.shape.cols {
            return Err(Error::InvalidArgument(format!(
                "row holds {} values, block rows hold {}",
                row.len(),
                self.shape.cols
            )));
        }
        if index >= self.shape.rows {
            return Err(Error::InvalidArgument(format!(
                "row index {index} out of bounds ({} rows)",
                self.shape.rows
            )));
        }

        let offset = index * self.shape.row_bytes();

        // SAFETY:
        // - index and row length are checked above, and the file was
        //   pre-sized to shape.byte_len(), so [offset, offset + row_bytes)
        //   lies inside the mapping
        // - the mapping base is page-aligned and offset is a multiple of 4,
        //   satisfying f32 alignment
        unsafe {
            let dst = self.mmap.as_mut_ptr().add(offset).cast::<f32>();
            std::ptr::copy_nonoverlapping(row.as_ptr(), dst, self.shape.cols);
        }

        Ok(())
    }

    /// Flushes the mapping to the kernel and the file to stable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if either flush fails.
    pub fn commit(&mut self) -> Result<()> {
        self.mmap.flush()?;
        self.file.sync_all()?;
        Ok(())
    }

    /// Declared shape of the block.
    pub fn shape(&self) -> Shape {
        self.shape
    }
}

impl Drop for BlockMut {
    fn drop(&mut self) {
        // Explicitly release the lock (happens automatically, but being explicit)
        let _ = FileExt::unlock(&self.file);
    }
}

/// Read half of the block: shared lock, exact shape match, zero-copy rows.
#[derive(Debug)]
pub struct Block {
    /// File handle (owns the shared lock)
    #[allow(dead_code)]
    file: File,
    mmap: Mmap,
    shape: Shape,
}

impl Block {
    /// Reopens an existing block read-only at the declared `shape`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingArtifact`] if the block was never created,
    /// [`Error::ShapeMismatch`] if the file's byte length disagrees with the
    /// shape, or an I/O error if it cannot be opened or mapped.
    pub fn open(path: &Path, shape: Shape) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::MissingArtifact {
                    layout: LayoutKind::Memmap,
                    id: path.display().to_string(),
                }
            } else {
                Error::Io(e)
            }
        })?;

        // Fully qualified: std 1.89 grew an inherent try_lock_shared with a
        // different error type, which would otherwise shadow the fs2 method.
        FileExt::try_lock_shared(&file).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("block {} is exclusively locked by a writer", path.display()),
            ))
        })?;

        let actual_bytes = file.metadata()?.len();
        if actual_bytes != shape.byte_len() {
            return Err(Error::ShapeMismatch {
                path: path.to_path_buf(),
                rows: shape.rows,
                cols: shape.cols,
                expected_bytes: shape.byte_len(),
                actual_bytes,
            });
        }

        let mmap = unsafe { Mmap::map(&file)? };

        Ok(Self { file, mmap, shape })
    }

    /// Returns the row at `index` as a slice straight into the mapping.
    ///
    /// The slice borrows `&self`, so it cannot outlive the mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of bounds.
    pub fn row(&self, index: usize) -> Result<&[f32]> {
        if index >= self.shape.rows {
            return Err(Error::InvalidArgument(format!(
                "row index {index} out of bounds ({} rows)",
                self.shape.rows
            )));
        }

        let offset = index * self.shape.row_bytes();
        debug_assert!(offset + self.shape.row_bytes() <= self.mmap.len());

        // SAFETY:
        // - the open-time shape check guarantees the mapping is exactly
        //   rows * row_bytes long, and index < rows, so the range is in
        //   bounds
        // - the mapping base is page-aligned and offset is a multiple of 4,
        //   satisfying f32 alignment
        // - the lifetime is tied to &self, so the slice cannot outlive the
        //   mapping
        unsafe {
            let ptr = self.mmap.as_ptr().add(offset).cast::<f32>();
            Ok(std::slice::from_raw_parts(ptr, self.shape.cols))
        }
    }

    /// Declared shape of the block.
    pub fn shape(&self) -> Shape {
        self.shape
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
