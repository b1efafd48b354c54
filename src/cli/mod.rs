//! CLI argument parsing using clap.
//!
//! This module defines the command-line interface for kalmansignal,
//! including all subcommands and their arguments.

mod config;

pub use config::{CliConfigError, ExportCliConfig};

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// kalmansignal - next-session price estimate from a state-space filter
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Set the verbosity level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub verbose: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true, default_value_t = false)]
    pub json_logs: bool,
}

/// Where the price history comes from.
#[derive(Args, Debug, Clone)]
pub struct HistoryArgs {
    /// Instrument symbol; bars are read from `<data-dir>/<SYMBOL>.csv`
    #[arg(long, default_value = "META")]
    pub symbol: String,
    /// Directory holding daily bar CSV exports
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,
    /// First day of history (YYYY-MM-DD)
    #[arg(long, default_value = "2020-01-01")]
    pub start_date: String,
    /// End of history, exclusive (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub end_date: Option<String>,
    /// Timeout in seconds for loading price history
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

/// Location of the persisted filter state.
#[derive(Args, Debug, Clone)]
pub struct StateArgs {
    /// Filter state file
    #[arg(long, env = "PARAMS_FILE", default_value = "kalman_params.json")]
    pub state_file: PathBuf,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Filter the close series, persist the residual and print the next-session action
    Predict {
        #[command(flatten)]
        history: HistoryArgs,
        #[command(flatten)]
        state: StateArgs,
        /// Append each prediction to this CSV file
        #[arg(long)]
        history_csv: Option<PathBuf>,
    },

    /// Write the derived dataset (typical price, log returns) as CSV
    Export {
        #[command(flatten)]
        history: HistoryArgs,
        /// Output CSV path; defaults to `<SYMBOL>Data.csv`
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Inspect or reset the persisted filter state
    State {
        #[command(subcommand)]
        action: StateCommand,
    },
}

/// State maintenance actions
#[derive(Subcommand)]
pub enum StateCommand {
    /// Print the persisted state (or the defaults that would be used)
    Show {
        #[command(flatten)]
        state: StateArgs,
    },
    /// Overwrite the state file with default parameters and a zero residual
    Reset {
        #[command(flatten)]
        state: StateArgs,
    },
}
