//! The persisted identifier set shared by all phases of one experiment.
//!
//! `init` generates COUNT unique random tokens and persists them; every later
//! `create`/`test` invocation reloads the exact same set in the exact same
//! order. Token order is not semantically meaningful, but it drives the draw
//! sequence during a create pass, so it must survive persist/reload intact.

use std::fs;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::ErrorKind;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use rand::Rng;

use crate::error::{Error, Result};

/// Manifest file name under the working directory
pub const MANIFEST_FILE: &str = "filelist.txt";

/// Hex length of one 128-bit token
pub const TOKEN_LEN: usize = 32;

/// Location of the manifest under `root`.
pub fn manifest_path(root: &Path) -> PathBuf {
    root.join(MANIFEST_FILE)
}

/// Ordered set of unique identifier tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    ids: Vec<String>,
}

impl Manifest {
    /// Generates `count` fresh 128-bit random tokens.
    ///
    /// Tokens come from OS entropy, not from the seeded draw sequence: the
    /// identifier set is fixed once at init time, while the draw sequence is
    /// replayed on every later phase. Collisions are not checked; 128 bits
    /// make them negligible.
    pub fn generate(count: usize) -> Self {
        let mut rng = rand::rng();
        let ids = (0..count).map(|_| format!("{:032x}", rng.random::<u128>())).collect();
        Self { ids }
    }

    /// Reads the manifest back from `root`, validating every token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManifestMissing`] if no manifest exists yet, and an
    /// invalid-data I/O error for lines that are not 32-char hex tokens.
    pub fn load(root: &Path) -> Result<Self> {
        let path = manifest_path(root);
        let file = File::open(&path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Error::ManifestMissing { path: path.clone() }
            } else {
                Error::Io(e)
            }
        })?;

        let mut ids = Vec::new();
        for (line_no, line) in BufReader::new(file).lines().enumerate() {
            let token = line?;
            // Lowercase only: bucket directories are named in lowercase hex
            if token.len() != TOKEN_LEN
                || !token.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
            {
                return Err(std::io::Error::new(
                    ErrorKind::InvalidData,
                    format!(
                        "{}:{}: not a {TOKEN_LEN}-char lowercase hex token: {token:?}",
                        path.display(),
                        line_no + 1
                    ),
                )
                .into());
            }
            ids.push(token);
        }

        Ok(Self { ids })
    }

    /// Persists the manifest under `root`, one token per line.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, root: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(manifest_path(root))?);
        for id in &self.ids {
            writeln!(writer, "{id}")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Number of identifiers in the set.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True when the set holds no identifiers.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Identifiers in persisted order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }
}

/// Generates and persists the identifier set, then re-reads it to confirm
/// the persisted count matches the request.
///
/// The reload is a mandatory self-check: a manifest that does not round-trip
/// would silently desynchronize every later phase.
///
/// # Errors
///
/// Returns [`Error::CountMismatch`] if the reloaded set has a different
/// length, or an I/O error if the working directory or manifest cannot be
/// written.
pub fn init(root: &Path, count: usize) -> Result<()> {
    fs::create_dir_all(root)?;

    Manifest::generate(count).save(root)?;

    let reloaded = Manifest::load(root)?;
    if reloaded.len() != count {
        return Err(Error::CountMismatch { expected: count, actual: reloaded.len() });
    }

    log::debug!("persisted {count} identifiers to {}", manifest_path(root).display());
    Ok(())
}

/// Largest count representable exactly as an f64 (2^53); anything bigger
/// would truncate to the wrong integer.
const MAX_EXACT_COUNT: f64 = 9_007_199_254_740_992.0;

/// Parses a COUNT argument, accepting plain and scientific notation
/// (`100`, `3e5`) and truncating fractional values toward zero.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] for anything that is not a finite
/// positive number in exact integer range.
pub fn parse_count(raw: &str) -> Result<usize> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::InvalidArgument(format!("COUNT must be numeric, got {raw:?}")))?;

    if !value.is_finite() {
        return Err(Error::InvalidArgument(format!("COUNT must be finite, got {raw:?}")));
    }

    let truncated = value.trunc();
    if truncated < 1.0 {
        return Err(Error::InvalidArgument(format!("COUNT must be at least 1, got {raw:?}")));
    }
    if truncated > MAX_EXACT_COUNT {
        return Err(Error::InvalidArgument(format!("COUNT is too large: {raw:?}")));
    }

    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    let count = truncated as usize;
    Ok(count)
}
