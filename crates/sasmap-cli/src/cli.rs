//! CLI argument types for the sasmap binary.

use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

/// 🗺️ Map the data flow of legacy SAS programs
///
/// Extracts table-level lineage from program scripts and execution logs
/// without running any SAS code
#[derive(Parser, Debug)]
#[command(version)]
#[command(propagate_version = true)]
pub struct SasMapCli {
    #[command(subcommand)]
    pub command: SasMapCommands,
}

/// CLI subcommands for sasmap.
#[derive(Debug, Subcommand)]
pub enum SasMapCommands {
    /// Extract lineage from SAS program scripts (*.sas)
    Script {
        /// Path to a .sas file, or a directory scanned recursively
        #[arg(value_hint = ValueHint::AnyPath, value_parser)]
        input: PathBuf,
        /// Directory for the per-file outputs{n}Created when missing{n}Defaults to ./output
        #[arg(default_value = "output", long, short = 'o', value_hint = ValueHint::DirPath, value_parser)]
        output_dir: PathBuf,
        /// Overwrite output files if they already exist
        #[arg(action, long)]
        overwrite: bool,
        /// Process input files in parallel
        #[arg(action, long)]
        parallel: bool,
        /// Do not display progress bar
        #[arg(action, long)]
        no_progress: bool,
        /// Write the summary as JSON instead of text
        #[arg(action, long)]
        as_json: bool,
    },
    /// Extract lineage from SAS execution logs (*.log)
    Log {
        /// Path to a .log file, or a directory scanned recursively
        #[arg(value_hint = ValueHint::AnyPath, value_parser)]
        input: PathBuf,
        /// Directory for the per-file outputs{n}Created when missing{n}Defaults to ./output
        #[arg(default_value = "output", long, short = 'o', value_hint = ValueHint::DirPath, value_parser)]
        output_dir: PathBuf,
        /// Overwrite output files if they already exist
        #[arg(action, long)]
        overwrite: bool,
        /// Process input files in parallel
        #[arg(action, long)]
        parallel: bool,
        /// Do not display progress bar
        #[arg(action, long)]
        no_progress: bool,
        /// Write the summary as JSON instead of text
        #[arg(action, long)]
        as_json: bool,
    },
}
