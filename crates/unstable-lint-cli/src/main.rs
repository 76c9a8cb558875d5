//! unstable-lint CLI tool.
//!
//! Usage:
//! ```bash
//! unstable-lint check [OPTIONS] [PATH]
//! unstable-lint list-rules [--preset strict]
//! unstable-lint init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use config_resolver::LoadedConfig;

mod commands;
mod config_resolver;

/// Reports Java usages of APIs marked unstable (Guava `@Beta` and friends)
#[derive(Parser)]
#[command(name = "unstable-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Rule preset, overriding the config file (recommended, strict)
    #[arg(long, global = true)]
    preset: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run lint checks
    Check {
        /// Path to analyze (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Only run specific rules (comma-separated names or codes)
        #[arg(long)]
        rules: Option<String>,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,
    },

    /// List available rules
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-violation compact format.
    Compact,
    /// Source snippets with labels, rendered by miette.
    Fancy,
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
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            path,
            format,
            rules,
            exclude,
        } => {
            let loaded = LoadedConfig::load(&path, cli.config.as_deref())?.with_preset(cli.preset);
            let has_errors = commands::check::run(&path, format, rules, exclude, loaded)?;
            if has_errors {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::ListRules => {
            let loaded =
                LoadedConfig::load(Path::new("."), cli.config.as_deref())?.with_preset(cli.preset);
            commands::list_rules::run(&loaded)
        }
        Commands::Init { force } => commands::init::run(Path::new("."), force),
    }
}
