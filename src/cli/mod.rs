//! Command-line parsing for the ideal-function matcher.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the matching code.
//!
//! Input paths can also come from the environment (or a `.env` file), which is
//! handy when the same three datasets are evaluated repeatedly.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ideal", version, about = "Ideal-function selection and test-point classification")]
pub struct Cli {
    /// More log output on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Select the best ideal function for each training function.
    Select(SelectArgs),
    /// Select, derive deviation thresholds, and classify test observations.
    Evaluate(EvaluateArgs),
    /// Print a previously exported run summary.
    Show(ShowArgs),
}

/// Training and ideal inputs shared by every fitting command.
#[derive(Debug, Args, Clone)]
pub struct CurveInputs {
    /// Training functions CSV (`x,y1..y4`).
    #[arg(long, env = "IDEAL_TRAINING_CSV", value_name = "CSV")]
    pub training: PathBuf,

    /// Ideal functions CSV (`x,y1..yN`).
    #[arg(long, env = "IDEAL_IDEAL_CSV", value_name = "CSV")]
    pub ideal: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct SelectArgs {
    #[command(flatten)]
    pub inputs: CurveInputs,

    /// Export the training → ideal mapping to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export a JSON run summary.
    #[arg(long, value_name = "JSON")]
    pub json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub inputs: CurveInputs,

    /// Test observations CSV (`x,y`).
    #[arg(long, env = "IDEAL_TEST_CSV", value_name = "CSV")]
    pub test: PathBuf,

    /// Export the training → ideal mapping to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Directory for the evaluation/matched/unmatched CSV tables.
    #[arg(long, env = "IDEAL_EXPORT_DIR", value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Export a JSON run summary.
    #[arg(long, value_name = "JSON")]
    pub json: Option<PathBuf>,

    /// How many unmatched observations to list in the terminal summary.
    #[arg(long, default_value_t = 10)]
    pub show_unmatched: usize,
}

/// Options for printing a saved summary.
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Summary JSON produced by `--json`.
    #[arg(value_name = "JSON")]
    pub summary: PathBuf,
}
