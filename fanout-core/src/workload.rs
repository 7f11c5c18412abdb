//! The create and test passes.
//!
//! A create pass replays the seeded draw sequence over the manifest in
//! persisted order and materializes one artifact per identifier. A test pass
//! replays the same sequence to shuffle the visit order, reads every artifact
//! back, and reports max/mean/min over the per-record means plus wall-clock
//! time for the whole pass. The shuffle deliberately defeats the locality a
//! sequential visit would get from the page cache, so the numbers reflect
//! random access rather than streaming throughput.
//!
//! Nothing here retries: the first failure aborts the pass.

use std::io::ErrorKind;
use std::io::Stderr;
use std::path::Path;
use std::time::Duration;
use std::time::Instant;

use log::info;
use pbr::ProgressBar;
use rand::seq::SliceRandom;

use crate::artifact;
use crate::block::{Block, BlockMut, Shape};
use crate::draw;
use crate::error::{Error, Result};
use crate::layout::{self, LayoutKind};
use crate::manifest::Manifest;
use crate::stats::{self, Summary};

/// Result of one test pass.
#[derive(Debug, Clone)]
pub struct Report {
    /// Per-record means, in visit (shuffled) order
    pub means: Vec<f32>,
    /// Wall-clock time of the read pass
    pub elapsed: Duration,
}

impl Report {
    /// Max/mean/min over the per-record means.
    pub fn summary(&self) -> Summary {
        Summary::from_means(&self.means)
    }

    /// Elapsed time in minutes.
    pub fn elapsed_minutes(&self) -> f64 {
        self.elapsed.as_secs_f64() / 60.0
    }
}

/// Materializes one artifact per manifest identifier under `kind`.
///
/// Bootstraps the layout's directories first (idempotent), then iterates the
/// manifest in persisted order. The draw sequence is consumed in lockstep
/// with that order; shuffling here would silently change every record.
///
/// # Errors
///
/// Returns [`Error::ManifestMissing`] if `init` has not been run,
/// [`Error::InvalidArgument`] for a zero size, or any I/O error from the
/// write path. Partially written artifacts are not rolled back.
pub fn create(root: &Path, kind: LayoutKind, size: usize) -> Result<()> {
    ensure_size(size)?;
    let manifest = Manifest::load(root)?;
    kind.bootstrap(root)?;

    info!("creating {} arrays under the {} layout", manifest.len(), kind);
    let mut rng = draw::seeded_rng();
    let mut pb = progress(manifest.len());

    match kind {
        LayoutKind::Memmap => {
            let shape = Shape { rows: manifest.len(), cols: size };
            let mut block = BlockMut::create(&layout::block_path(root), shape)?;
            for index in 0..manifest.len() {
                let row = draw::row(&mut rng, size);
                block.set_row(index, &row)?;
                pb.inc();
            }
            block.commit()?;
        }
        _ => {
            for id in manifest.ids() {
                let values = draw::record(&mut rng, size);
                artifact::write(&layout::artifact_path(root, kind, id), &values)?;
                pb.inc();
            }
        }
    }

    pb.finish();
    Ok(())
}

/// Reads every artifact under `kind` in a reproducible shuffled order,
/// timing the pass.
///
/// # Errors
///
/// Returns [`Error::ManifestMissing`] if `init` has not been run,
/// [`Error::MissingArtifact`] for an identifier whose artifact was never
/// created (or was created under a different layout),
/// [`Error::ShapeMismatch`] if the block disagrees with `(count, size)`, or
/// any other I/O error from the read path.
pub fn test(root: &Path, kind: LayoutKind, size: usize) -> Result<Report> {
    ensure_size(size)?;
    let manifest = Manifest::load(root)?;

    info!("testing the {} layout over {} arrays", kind, manifest.len());
    let mut rng = draw::seeded_rng();
    let mut pb = progress(manifest.len());
    let mut means = Vec::with_capacity(manifest.len());

    let elapsed = match kind {
        LayoutKind::Memmap => {
            let mut order: Vec<usize> = (0..manifest.len()).collect();
            order.shuffle(&mut rng);

            // Mapping cost is part of what this layout is measured on, so
            // the clock starts before the block is opened.
            let start = Instant::now();
            let shape = Shape { rows: manifest.len(), cols: size };
            let block = Block::open(&layout::block_path(root), shape)?;
            for index in order {
                means.push(stats::mean(block.row(index)?));
                pb.inc();
            }
            start.elapsed()
        }
        _ => {
            let mut order = manifest.ids().to_vec();
            order.shuffle(&mut rng);

            let start = Instant::now();
            for id in &order {
                let path = layout::artifact_path(root, kind, id);
                let values = artifact::read(&path).map_err(|e| match e {
                    Error::Io(io) if io.kind() == ErrorKind::NotFound => {
                        Error::MissingArtifact { layout: kind, id: id.clone() }
                    }
                    other => other,
                })?;
                means.push(stats::mean(&values));
                pb.inc();
            }
            start.elapsed()
        }
    };

    pb.finish();
    Ok(Report { means, elapsed })
}

fn ensure_size(size: usize) -> Result<()> {
    if size == 0 {
        return Err(Error::InvalidArgument("--size must be at least 1".to_string()));
    }
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
fn progress(total: usize) -> ProgressBar<Stderr> {
    let mut pb = ProgressBar::on(std::io::stderr(), total as u64);
    pb.set_max_refresh_rate(Some(Duration::from_millis(100)));
    pb
}
