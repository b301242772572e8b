//! Command-line interface built on clap.
//!
//! [`Cli`] carries the global overrides; [`Command`] selects the interactive
//! terminal front end (default) or the headless report.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Regulatory intelligence report generator.
#[derive(Debug, Parser)]
#[command(name = "regintel", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to the configuration file (defaults to ./regintel.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory the report is written to.
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Delay after each pipeline stage in milliseconds.
    #[arg(long, global = true)]
    pub stage_delay_ms: Option<u64>,

    /// Enable debug logging.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

impl Cli {
    /// The selected subcommand, `tui` when none was given.
    pub fn resolved_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Tui)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Interactive terminal front end.
    Tui,

    /// Run the analysis and write the PDF report without a UI.
    Report {
        /// JSON file with `rationales` and `affected` maps keyed by update id.
        #[arg(long)]
        annotations: Option<PathBuf>,

        /// Destination file (defaults to <output-dir>/guardant_regulatory_report.pdf).
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}
