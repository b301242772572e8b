//! regintel - Regulatory Intelligence Report Generator
//!
//! Interactive terminal front end by default; `regintel report` renders the
//! PDF without a UI.

use anyhow::Result;
use clap::Parser;

use regintel::application::SystemClock;
use regintel::cli::{Cli, Command};
use regintel::commands::{build_pipeline, run_report, run_tui};
use regintel::config::AppConfig;
use regintel::domain::REPORT_FILE_NAME;
use regintel::logging::init_logging;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(delay) = cli.stage_delay_ms {
        config.stage_delay_ms = delay;
    }

    let log_level = if cli.verbose { "debug" } else { config.log_level.as_str() };
    let headless = matches!(cli.resolved_command(), Command::Report { .. });
    let _guard = init_logging(log_level, &config, headless)?;

    let pipeline = build_pipeline(&config)?;

    match cli.resolved_command() {
        Command::Tui => run_tui(pipeline, config.output_dir.clone()),
        Command::Report { annotations, output } => {
            let output = output.unwrap_or_else(|| config.output_dir.join(REPORT_FILE_NAME));
            let path = run_report(&pipeline, &SystemClock, annotations.as_deref(), &output)?;
            println!("Report written to {}", path.display());
            Ok(())
        }
    }
}
