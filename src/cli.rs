use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(subcommand_value_name = "SUBCOMMAND")]
#[command(subcommand_help_heading = "Subcommands")]
pub struct Cli {
    /// Path to config file.
    ///
    /// This can also be set with the `CIRCLE_GESTURE_CONFIG` environment variable. If both are
    /// set, the command line argument takes precedence. Without either, the built-in defaults
    /// are used.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub subcommand: Sub,
}

#[derive(Subcommand)]
pub enum Sub {
    /// Validate the config file.
    Validate,
    /// Run a recorded input trace through the recognizer and print phase changes.
    Replay {
        /// JSON-lines trace, one record per input update.
        trace: PathBuf,
        /// Format output as JSON.
        #[arg(short, long)]
        json: bool,
        /// Also print the fitted circle and off-band samples when an attempt ends.
        #[arg(short, long)]
        diagnostics: bool,
    },
}
