//! Deterministic mapping from identifier to on-disk storage location.
//!
//! Each layout is a pure function of the identifier (or, for the block
//! layout, its positional index), so the create and test phases always agree
//! on where an artifact lives. Bootstrap is idempotent and is invoked at the
//! start of every create pass, including pre-creating all 4096 bucket
//! directories for the hashed layouts before the first write.

use std::fmt;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Error, Result};

/// File extension of every float32 artifact
const ARTIFACT_EXT: &str = "f32";

/// Block file name under the memmap layout directory
const BLOCK_FILE: &str = "arr.f32";

/// Hex characters consumed by the hashed layouts
const BUCKET_CHARS: usize = 3;

/// Total bucket count of both hashed layouts (16^3)
pub const BUCKET_COUNT: usize = 16 * 16 * 16;

/// The four on-disk placement strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    /// Every artifact directly under one directory
    Flat,
    /// 4096 buckets named by the identifier's last three hex characters
    TwoLevel,
    /// 16x16x16 tree of single-hex-character directories, last character first
    FourLevel,
    /// One contiguous block, rows addressed by manifest index
    Memmap,
}

impl LayoutKind {
    /// All strategies, in reporting order.
    pub const ALL: [Self; 4] = [Self::Flat, Self::TwoLevel, Self::FourLevel, Self::Memmap];

    /// Command-line token naming this layout.
    pub fn token(self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::TwoLevel => "two_level",
            Self::FourLevel => "four_level",
            Self::Memmap => "memmap",
        }
    }

    /// Directory holding this layout's artifacts, under the working root.
    pub fn dir(self, root: &Path) -> PathBuf {
        match self {
            Self::Flat => root.join("flat"),
            Self::TwoLevel => root.join("2level"),
            Self::FourLevel => root.join("4level"),
            Self::Memmap => root.join("memmap"),
        }
    }

    /// Ensures every directory this layout writes into exists.
    ///
    /// Safe to call repeatedly. The hashed layouts pre-create all
    /// [`BUCKET_COUNT`] buckets up front so per-directory entry counts are
    /// bounded from the first write, and so an empty bucket is
    /// indistinguishable from an unlucky hash.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created.
    pub fn bootstrap(self, root: &Path) -> Result<()> {
        let dir = self.dir(root);
        fs::create_dir_all(&dir)?;

        match self {
            Self::Flat | Self::Memmap => {}
            Self::TwoLevel => {
                for bucket in 0..BUCKET_COUNT {
                    fs::create_dir_all(dir.join(format!("{bucket:03x}")))?;
                }
            }
            Self::FourLevel => {
                for a in 0..16 {
                    for b in 0..16 {
                        for c in 0..16 {
                            fs::create_dir_all(dir.join(format!("{a:x}/{b:x}/{c:x}")))?;
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for LayoutKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "flat" => Ok(Self::Flat),
            "two_level" => Ok(Self::TwoLevel),
            "four_level" => Ok(Self::FourLevel),
            "memmap" => Ok(Self::Memmap),
            other => Err(Error::InvalidArgument(format!(
                "unknown layout {other:?} (expected flat, two_level, four_level or memmap)"
            ))),
        }
    }
}

/// Storage location of the artifact holding `id` under `kind`.
///
/// For the block layout every identifier resolves to the single shared block
/// file; rows inside it are addressed by index, not by name.
pub fn artifact_path(root: &Path, kind: LayoutKind, id: &str) -> PathBuf {
    debug_assert!(id.len() >= BUCKET_CHARS);
    let dir = kind.dir(root);

    match kind {
        LayoutKind::Flat => dir.join(format!("{id}.{ARTIFACT_EXT}")),
        LayoutKind::TwoLevel => {
            let bucket = &id[id.len() - BUCKET_CHARS..];
            dir.join(bucket).join(format!("{id}.{ARTIFACT_EXT}"))
        }
        LayoutKind::FourLevel => {
            let mut rev = id.chars().rev();
            let l1 = rev.next().unwrap_or('0');
            let l2 = rev.next().unwrap_or('0');
            let l3 = rev.next().unwrap_or('0');
            dir.join(l1.to_string())
                .join(l2.to_string())
                .join(l3.to_string())
                .join(format!("{id}.{ARTIFACT_EXT}"))
        }
        LayoutKind::Memmap => block_path(root),
    }
}

/// Location of the contiguous block file.
pub fn block_path(root: &Path) -> PathBuf {
    LayoutKind::Memmap.dir(root).join(BLOCK_FILE)
}
