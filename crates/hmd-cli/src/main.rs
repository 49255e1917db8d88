//! hmd-sync CLI
//!
//! Keeps a local Markdown file synchronized with a hosted buffer.

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hmd_core::Config;

mod commands;
mod editor;
mod output;
mod reporter;

use commands::SessionArgs;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "hmd-sync")]
#[command(about = "Debounced, conflict-aware buffer synchronization")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch a file and push edits after each quiet period
    Watch(SessionArgs),
    /// Push the file's content once
    Push(SessionArgs),
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (api_uri, token, quiet_period_ms, ...)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    match cli.command {
        Commands::Config { command } => match command {
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key, value, config_path, &output)
            }
            Some(ConfigCommands::Show) | None => commands::config::show(config_path, &output),
        },
        Commands::Watch(args) => {
            let config = Config::load_with_cli_override(config_path)?;
            commands::watch::watch(args, &config, &output).await
        }
        Commands::Push(args) => {
            let config = Config::load_with_cli_override(config_path)?;
            commands::push::push(args, &config, &output).await
        }
    }
}

/// Log to stderr; RUST_LOG wins over -v
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hmd_core={},hmd_sync={}", level, level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
