//! synapse-exec CLI
//!
//! Submits scripts to the local synapse execution service, attaching to the
//! target first when needed.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use synapse_exec::commands::{self, RunOptions};
use synapse_exec::output::print_error;

#[derive(Parser)]
#[command(name = "synapse-exec")]
#[command(author, version, about = "Run scripts through the synapse execution service")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors and the result
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a script on the attached target
    /// Alias: exec
    #[command(alias = "exec")]
    Run {
        /// Script file to run, or - to read from stdin
        script: String,
        /// Service URL (overrides config)
        #[arg(short, long, env = "SYNAPSE_EXEC_URL")]
        url: Option<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Show config file path
    Path,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Run { script, url, json } => {
            let mut config = match commands::load_client_config(cli.config.as_ref()) {
                Ok(config) => config,
                Err(e) => {
                    print_error(&format!("{:#}", e));
                    std::process::exit(2);
                }
            };
            if let Some(url) = url {
                config.service_url = url;
                config.validate()?;
            }

            let options = RunOptions {
                script,
                json,
                quiet: cli.quiet,
            };
            let status = commands::run_command(&config, options).await?;
            if status.exit_code() != 0 {
                std::process::exit(status.exit_code());
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_show(cli.config.as_ref())?,
            ConfigAction::Path => commands::config_path(cli.config.as_ref())?,
            ConfigAction::Init { force } => commands::config_init(cli.config.as_ref(), force)?,
        },
    }

    Ok(())
}
