//! Command-line front end for mixplan_core
//!
//! Reads JSON inputs and optional YAML settings, runs one modeling operation,
//! and writes the JSON report to stdout or a file.

pub mod commands;
pub mod logging;
pub mod settings;

use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::WrapErr;

pub use commands::{Command, Report, execute};
pub use logging::init_logging;
pub use settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "mixplan")]
#[command(about = "Marketing mix attribution, budget optimization and forecasting")]
pub struct Cli {
    /// YAML settings file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    pub log_level: String,

    /// Write logs to mixplan.log in this directory instead of stderr
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Write the JSON report here instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Run a parsed command line; logging must already be initialized
pub fn run(cli: &Cli) -> color_eyre::Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    let report = execute(&cli.command, &settings)?;
    let json = report.to_json()?;
    write_output(cli.output.as_deref(), &json)
}

fn write_output(path: Option<&Path>, json: &str) -> color_eyre::Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, json)
                .wrap_err_with(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "Wrote report");
        }
        None => println!("{json}"),
    }
    Ok(())
}
