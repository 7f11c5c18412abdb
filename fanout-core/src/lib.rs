//! Fanout - small-array read latency across on-disk layout strategies
//!
//! Fanout measures the wall-clock cost of reading many small float32 arrays
//! from disk under four placement strategies: a flat directory of N files, a
//! two-level hashed directory tree, a four-level hashed directory tree, and
//! a single contiguous memory-mapped block addressed by row offset. The
//! point of comparison is how directory fan-out and file count affect
//! random-access latency versus one pre-allocated blob.
//!
//! # How a run works
//!
//! An experiment is strictly two-phase. `init` persists an ordered set of
//! random identifiers; `create` materializes one array per identifier under
//! a chosen layout; `test` reads everything back in a reproducible shuffled
//! order, timing the pass and summarizing the per-record means. All phases
//! replay the same seeded draw sequence, so results are comparable
//! run-to-run and layout-to-layout.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use fanout_core::{LayoutKind, manifest, workload};
//!
//! # fn main() -> fanout_core::Result<()> {
//! let root = Path::new("cache");
//!
//! // Persist 1000 identifiers, then populate and measure the flat layout
//! manifest::init(root, 1000)?;
//! workload::create(root, LayoutKind::Flat, 256)?;
//!
//! let report = workload::test(root, LayoutKind::Flat, 256)?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```
//!
//! # Design Philosophy
//!
//! Fanout is a measurement harness, not a storage engine. It is
//! single-threaded and single-process by construction, never retries, and
//! makes no durability promises beyond the explicit flush of the block
//! layout. Anything a failed pass left behind is simply overwritten by the
//! next create.

pub mod artifact;
pub mod block;
pub mod draw;
mod error;
pub mod layout;
pub mod manifest;
pub mod stats;
pub mod workload;

pub use block::{Block, BlockMut, Shape};
pub use error::{Error, Result};
pub use layout::LayoutKind;
pub use manifest::Manifest;
pub use stats::Summary;
pub use workload::Report;
