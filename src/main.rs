//! Damage Timeline
//!
//! Command-line entry point:
//! - `serve`: run the dashboard server
//! - `probe`: fetch one snapshot from a telemetry API and print it
//! - `init-config`: print or write a commented default config

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

use damage_timeline::api::{serve, AppState};
use damage_timeline::config::{generate_default_config, Config};
use damage_timeline::history::PlayerRegistry;
use damage_timeline::logging;
use damage_timeline::telemetry::{HttpTelemetryClient, Snapshot, TelemetrySource};

#[derive(Parser)]
#[command(name = "damage-timeline")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Live stacked chart of per-player damage output")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the user config dir, then ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the dashboard server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
        /// Telemetry API address pre-filled in new dashboards
        #[arg(long)]
        api_url: Option<String>,
    },

    /// Fetch one snapshot from the telemetry API
    Probe {
        /// Telemetry API address
        #[arg(long)]
        api_url: String,
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Generate default config file
    InitConfig {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            api_url,
        } => {
            let loaded = Config::resolve(cli.config.as_deref())?;
            logging::init(&loaded.config.logging)?;
            loaded.report();

            let mut config = loaded.config;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(url) = api_url {
                config.telemetry.default_api_url = Some(url);
            }

            run_server(config).await
        }

        Commands::Probe { api_url, format } => {
            let loaded = Config::resolve(cli.config.as_deref())?;
            logging::init(&loaded.config.logging)?;
            loaded.report();
            let config = loaded.config;

            let client = HttpTelemetryClient::new(config.telemetry.request_timeout())?;
            let snapshot = client
                .fetch_snapshot(&api_url)
                .await
                .with_context(|| format!("probing {}", api_url))?;

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshot)?),
                OutputFormat::Table => {
                    print_table(&snapshot, &PlayerRegistry::new(config.players.clone()))
                }
            }
            Ok(())
        }

        Commands::InitConfig { output } => {
            let content = generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, content)
                        .with_context(|| format!("writing {}", path.display()))?;
                    eprintln!("Config written to {}", path.display());
                }
                None => print!("{}", content),
            }
            Ok(())
        }
    }
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting damage timeline v{}", env!("CARGO_PKG_VERSION"));

    let source = Arc::new(HttpTelemetryClient::new(config.telemetry.request_timeout())?);
    let api_config = config.api_config();

    match &config.telemetry.default_api_url {
        Some(url) => tracing::info!("Default telemetry API: {}", url),
        None => tracing::info!("No default telemetry API, dashboards start empty"),
    }
    tracing::info!(
        poll_interval_ms = config.telemetry.poll_interval_ms,
        max_sessions = api_config.max_sessions,
        "Session defaults loaded"
    );

    let state = AppState::new(source, config.session_config(), api_config.clone());
    serve(state, &api_config).await?;

    Ok(())
}

fn print_table(snapshot: &Snapshot, names: &PlayerRegistry) {
    if snapshot.is_empty() {
        println!("No players reported.");
        return;
    }

    println!("{:<16} {:<20} {:>18}", "Player ID", "Name", "Cumulative damage");
    println!("{}", "-".repeat(56));
    for reading in &snapshot.readings {
        println!(
            "{:<16} {:<20} {:>18.1}",
            reading.player_id,
            names.display_name(&reading.player_id),
            reading.cumulative_damage
        );
    }
}
