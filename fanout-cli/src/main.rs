//! Command-line driver for the fanout benchmark.
//!
//! Dispatches one phase per invocation: `init` persists the identifier set,
//! `create` populates a layout, `test` measures it. Any failure propagates
//! straight out, is logged with its context chain, and ends the process with
//! exit code 1.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info};

use fanout_core::{LayoutKind, manifest, workload};

mod logger;

/// Benchmark of small-array read latency across on-disk layout strategies
#[derive(Parser, Debug)]
#[command(name = "fanout")]
#[command(about = "Measure small-array read latency across on-disk layout strategies")]
struct Args {
    /// Working directory holding the identifier manifest and all layouts
    #[arg(long, default_value = "cache")]
    root: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate and persist the identifier set
    Init {
        /// Number of identifiers; scientific notation accepted (e.g. 3e5)
        count: String,
    },

    /// Populate on-disk artifacts for one layout
    Create {
        /// Layout: flat, two_level, four_level or memmap
        layout: String,

        /// Base size of the generated arrays
        #[arg(long, default_value_t = 256)]
        size: usize,
    },

    /// Read every artifact back in shuffled order and report latency
    Test {
        /// Layout: flat, two_level, four_level or memmap
        layout: String,

        /// Base size of the generated arrays
        #[arg(long, default_value_t = 256)]
        size: usize,
    },
}

fn main() {
    let args = Args::parse();
    logger::init(args.verbose);

    if let Err(err) = run(args) {
        error!("{err:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Init { count } => {
            let count = manifest::parse_count(&count)?;
            manifest::init(&args.root, count)
                .with_context(|| format!("init failed for {count} identifiers"))?;
            info!("persisted {count} identifiers under {}", args.root.display());
        }

        Command::Create { layout, size } => {
            let kind: LayoutKind = layout.parse()?;
            workload::create(&args.root, kind, size)
                .with_context(|| format!("create failed for the {kind} layout"))?;
        }

        Command::Test { layout, size } => {
            let kind: LayoutKind = layout.parse()?;
            let report = workload::test(&args.root, kind, size)
                .with_context(|| format!("test failed for the {kind} layout"))?;

            println!("{}", report.summary());
            println!("Took {:.2} Minutes", report.elapsed_minutes());
        }
    }

    Ok(())
}
