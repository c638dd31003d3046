//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use franchise_core::{LookupConfig, lookup_franchise};
use franchise_shared::{AppConfig, init_config, load_config, load_config_from};
use tracing::info;

use crate::server;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// franchise: collect every part of a film franchise from one title.
#[derive(Parser)]
#[command(
    name = "franchise",
    version,
    about = "Find a title and crawl its franchise: every linked part with its year.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.franchise/franchise.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Serve `GET /search-franchise?q=<title>` over HTTP.
    Serve {
        /// Interface to bind (overrides `[server].host`).
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides `[server].port`).
        #[arg(long, env = "PORT")]
        port: Option<u16>,

        /// Crawl workers per lookup (overrides `[crawl].workers`).
        #[arg(short, long)]
        workers: Option<usize>,
    },

    /// Run one lookup and print the sorted records as JSON.
    Search {
        /// Title to search for.
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Crawl workers (overrides `[crawl].workers`).
        #[arg(short, long)]
        workers: Option<usize>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "franchise=info",
        1 => "franchise=debug",
        _ => "franchise=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config;
    match cli.command {
        Command::Serve {
            host,
            port,
            workers,
        } => {
            let mut config = resolve_config(config_path.as_ref())?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(workers) = workers {
                config.crawl.workers = workers;
            }
            cmd_serve(&config).await
        }
        Command::Search { query, workers } => {
            let mut config = resolve_config(config_path.as_ref())?;
            if let Some(workers) = workers {
                config.crawl.workers = workers;
            }
            cmd_search(&config, &query.join(" ")).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(config_path.as_ref()).await,
        },
    }
}

/// Load the config file named on the command line, or the default one.
fn resolve_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_serve(config: &AppConfig) -> Result<()> {
    let lookup = LookupConfig::try_from(config)?;
    let addr = format!("{}:{}", config.server.host, config.server.port);

    info!(
        %addr,
        workers = lookup.crawl.workers,
        base_url = %lookup.crawl.base_url,
        "starting server"
    );

    server::run_server(&addr, lookup).await
}

async fn cmd_search(config: &AppConfig, query: &str) -> Result<()> {
    let lookup_config = LookupConfig::try_from(config)?;

    let lookup = lookup_franchise(&lookup_config, query)
        .await
        .map_err(|e| eyre!("lookup for '{query}' failed: {e}"))?;

    info!(
        seed = %lookup.seed,
        records = lookup.records.len(),
        pages_failed = lookup.pages_failed,
        "lookup finished in {:.1}s",
        lookup.elapsed.as_secs_f64()
    );

    println!("{}", serde_json::to_string_pretty(&lookup.records)?);
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(path: Option<&PathBuf>) -> Result<()> {
    let config = resolve_config(path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
