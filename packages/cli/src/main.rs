#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the spot map toolchain.
//!
//! Each subcommand wraps one dataset step of [`spotmap_generate`]. Run
//! without a subcommand, an interactive menu asks for the step and its
//! parameters instead.
//!
//! Uses `indicatif-log-bridge` (via [`spotmap_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and progress bars never fight for the terminal.

mod interactive;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use spotmap_cli_utils::{IndicatifProgress, MultiProgress};
use spotmap_generate::partition::{DEFAULT_FILE_PREFIX, SplitOptions};
use spotmap_generate::{derive, merge, partition, sanitize};
use spotmap_source::registry::{CategoryTable, builtin, load_category_table};
use spotmap_spot_models::{Badge, PartitionMode};

#[derive(Parser)]
#[command(name = "spotmap", about = "Spot dataset toolchain")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
enum Commands {
    /// Repair a hand-edited spot file into strict, pretty-printed JSON
    Sanitize {
        /// File to repair (left untouched)
        input: PathBuf,
        /// Where to write the repaired JSON
        output: PathBuf,
    },
    /// Split a flat spot collection into per-category files plus an index
    Split {
        /// Flat spot collection
        input: PathBuf,
        /// Directory receiving `index.json` and `<slug>/spots.json`
        out_dir: PathBuf,
        /// `replicate` writes a spot to every category, `primary` only to
        /// its primary one
        #[arg(long, default_value = "replicate")]
        mode: PartitionMode,
        /// Prefix of the `file` paths recorded in the index
        #[arg(long, default_value = DEFAULT_FILE_PREFIX)]
        file_prefix: String,
        /// TOML file replacing the built-in category table
        #[arg(long)]
        categories: Option<PathBuf>,
    },
    /// Merge per-category files back into one deduplicated collection
    Merge {
        /// Directory holding `index.json`
        data_dir: PathBuf,
        /// Where to write the merged collection
        output: PathBuf,
    },
    /// Attach scores and badges to every spot
    Derive {
        /// Flat spot collection
        input: PathBuf,
        /// Where to write the derived collection
        output: PathBuf,
        /// Comma-separated badge codes every written spot must carry
        /// (e.g., `FEN,WC`)
        #[arg(long, value_delimiter = ',')]
        badges: Vec<Badge>,
    },
    /// List all badge codes
    Badges,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = spotmap_cli_utils::init_logger();
    let cli = Cli::parse();

    let command = match cli.command {
        Some(command) => command,
        None => interactive::run()?,
    };

    execute(command, &multi)
}

/// Runs one subcommand to completion.
fn execute(command: Commands, multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Sanitize { input, output } => {
            let count = sanitize::sanitize(&input, &output)?;
            println!("OK -> {} ({count} records)", output.display());
        }
        Commands::Split {
            input,
            out_dir,
            mode,
            file_prefix,
            categories,
        } => {
            let table = category_table(categories.as_deref())?;
            let options = SplitOptions { mode, file_prefix };
            let progress = IndicatifProgress::categories_bar(multi, "Splitting");
            let index = partition::split(&input, &out_dir, &options, &table, &progress)?;
            println!(
                "Wrote {} categories to {}",
                index.len(),
                out_dir.display()
            );
        }
        Commands::Merge { data_dir, output } => {
            let progress = IndicatifProgress::categories_bar(multi, "Merging");
            let outcome = merge::merge(&data_dir, &output, &progress)?;
            println!(
                "Merged {} unique spots ({} duplicates dropped) -> {}",
                outcome.spots.len(),
                outcome.duplicates,
                output.display()
            );
        }
        Commands::Derive {
            input,
            output,
            badges,
        } => {
            let required: BTreeSet<Badge> = badges.into_iter().collect();
            let summary = derive::derive_file(&input, &output, &required)?;
            println!(
                "Derived {} spots, wrote {} -> {}",
                summary.total,
                summary.kept,
                output.display()
            );
        }
        Commands::Badges => {
            println!("{:<8} LABEL", "CODE");
            println!("{}", "-".repeat(40));
            for badge in Badge::all() {
                println!("{:<8} {}", badge.as_ref(), badge.label());
            }
        }
    }

    Ok(())
}

/// Loads the category table from `path`, or returns the built-in one.
fn category_table(path: Option<&Path>) -> Result<CategoryTable, Box<dyn std::error::Error>> {
    Ok(match path {
        Some(path) => {
            log::info!("Using category table from {}", path.display());
            load_category_table(path)?
        }
        None => builtin().clone(),
    })
}
