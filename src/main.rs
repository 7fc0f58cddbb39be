use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

use lei_enricher::app::enrich_use_case::EnrichUseCase;
use lei_enricher::config::Config;
use lei_enricher::infra::registry_adapter::GleifRegistryAdapter;
use lei_enricher::observability;
use lei_enricher::server;

#[derive(Parser)]
#[command(name = "lei-enricher")]
#[command(about = "Enrich transaction CSV files with GLEIF legal-entity data")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (defaults to ./enricher.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enrich one CSV file and print the result as JSON
    Enrich {
        /// CSV file with a header row (columns lei, notional, rate, ...)
        input: PathBuf,
        /// Write the JSON result here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Pretty-print the JSON result
        #[arg(long)]
        pretty: bool,
    },
    /// Serve the enrichment HTTP API
    Serve {
        /// Address to bind, overriding the config file
        #[arg(long)]
        bind: Option<String>,
    },
}

async fn run_enrich(config: Config, input: PathBuf, output: Option<PathBuf>, pretty: bool) -> Result<()> {
    let bytes = fs::read(&input).with_context(|| format!("Failed to read {}", input.display()))?;

    let lookup = GleifRegistryAdapter::new(&config.registry).context("Failed to build registry client")?;
    let use_case = EnrichUseCase::with_default_enricher(Box::new(lookup));
    let outcome = use_case
        .run(&bytes)
        .await
        .with_context(|| format!("Failed to enrich {}", input.display()))?;

    if !outcome.errors.is_empty() {
        warn!("{} records could not be fully enriched", outcome.errors.len());
    }

    let response = outcome.into_response();
    let json = if pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };

    match output {
        Some(path) => {
            fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            info!(records = response.data.len(), "wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_logging();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Enrich { input, output, pretty } => run_enrich(config, input, output, pretty).await,
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind_addr = bind;
            }
            server::serve(config).await
        }
    }
}
