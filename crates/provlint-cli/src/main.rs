//! provlint CLI tool.
//!
//! Usage:
//! ```bash
//! provlint check [OPTIONS] [PATH]
//! provlint coverage [OPTIONS] [PATH]
//! provlint unused [OPTIONS] [PATH]
//! provlint list-analyzers
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod loader;

/// Documentation and API surface checks for provider-style codebases
#[derive(Parser)]
#[command(name = "provlint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the documentation checks and print diagnostics
    Check {
        /// Path to analyze (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Report per-file API coverage of the library unit
    Coverage {
        /// Path to analyze (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Report library symbols no consumer references
    Unused {
        /// Path to analyze (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// List available analyzers
    ListAnalyzers,
}

/// Output format for diagnostics.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Check { path, format } => commands::check::run(&path, format, cli.config.as_deref()),
        Commands::Coverage { path } => commands::coverage::run(&path, cli.config.as_deref()),
        Commands::Unused { path } => commands::unused::run(&path, cli.config.as_deref()),
        Commands::ListAnalyzers => {
            commands::list_analyzers::run();
            Ok(())
        }
    }
}
