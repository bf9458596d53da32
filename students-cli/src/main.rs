//! students-api - HTTP service for student records
//!
//! Resolves the YAML config, opens the SQLite store and serves the API until
//! Ctrl+C or SIGTERM.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use students_server::Config;
use tracing::info;

mod commands;
mod tracing_setup;

/// Environment variable naming the config file. Takes precedence over `--config`.
const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

#[derive(Parser, Debug)]
#[command(
    name = "students-api",
    author,
    version,
    about = "Record and serve student entities over HTTP"
)]
struct Cli {
    /// Path to the configuration file (overridden by CONFIG_PATH)
    #[arg(long, short = 'c', default_value = "config/local.yaml", global = true)]
    config: PathBuf,

    /// Override the environment name from the config file
    #[arg(long = "env", env = "ENV", global = true)]
    env_name: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the HTTP API (default)
    Serve,
    /// Create the database and schema, then exit
    InitDb,
}

/// Resolve the config path (env first, then flag) and load it.
fn load_config(cli: &Cli) -> Result<Config> {
    let path = std::env::var_os(CONFIG_PATH_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| cli.config.clone());

    let mut config = Config::load(&path).context("Failed to load config")?;
    if let Some(env) = &cli.env_name {
        config = config.with_env(env.as_str()).context("Invalid --env override")?;
    }

    info!(path = %path.display(), env = %config.env, "Loaded config");
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug })?;

    let config = load_config(&cli)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => commands::serve::run_serve(config).await,
        Commands::InitDb => commands::init_db::run_init_db(config).await,
    }
}
