//! Dietseed CLI
//!
//! Seeds the Neo4j and MongoDB demo stores with the diet-tracking dataset:
//! - `seed`: wait for both stores, load both, print a summary
//! - `load`, `probe`, `verify`: the same steps one at a time
//! - `dump`: export store contents through the container runtime

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dietseed_dataset::Dataset;
use dietseed_storage::{verify, DumpExporter, Engine, Orchestrator, SeedConfig, Selection};
use std::path::PathBuf;

mod logging;
mod render;
mod settings;

#[derive(Parser)]
#[command(name = "dietseed")]
#[command(
    author,
    version,
    about = "Dietseed: seed and export the diet-tracking demo databases"
)]
struct Cli {
    /// JSON config file; environment variables and flags override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Readiness attempts per store.
    #[arg(long, global = true)]
    max_retries: Option<u32>,

    /// Seconds between readiness attempts.
    #[arg(long, global = true)]
    retry_interval: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Wait for both stores, load both, print a summary (default).
    Seed,

    /// Wait for one store and load it.
    Load {
        /// `graph` (Neo4j) or `document` (MongoDB).
        store: Engine,
    },

    /// Check that stores accept connections.
    Probe {
        #[arg(default_value = "both")]
        stores: Selection,
    },

    /// Compare stored counts with the dataset.
    Verify,

    /// Export store contents with the stores' dump tools.
    Dump {
        #[arg(default_value = "both")]
        stores: Selection,

        /// Output directory (defaults to the configured dump directory).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Print the effective configuration as JSON (passwords masked).
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let config = settings::load(
        cli.config.as_deref(),
        settings::Overrides {
            max_retries: cli.max_retries,
            retry_interval_secs: cli.retry_interval,
        },
    )?;
    tracing::debug!(
        neo4j = %config.graph.uri,
        mongo_db = %config.document.database,
        attempts = config.readiness.max_attempts,
        "configuration loaded"
    );

    match cli.command.unwrap_or(Commands::Seed) {
        Commands::Seed => cmd_seed(&config, Selection::Both).await,
        Commands::Load { store } => cmd_seed(&config, store.into()).await,
        Commands::Probe { stores } => cmd_probe(&config, stores).await,
        Commands::Verify => cmd_verify(&config).await,
        Commands::Dump { stores, out } => cmd_dump(&config, stores, out).await,
        Commands::Config => cmd_config(&config),
    }
}

async fn cmd_seed(config: &SeedConfig, selection: Selection) -> Result<()> {
    let dataset = Dataset::sample();
    let orchestrator = Orchestrator::from_config(config, selection);

    eprintln!(
        "{} {} records, {} relationships",
        "Seeding".green().bold(),
        dietseed_dataset::EntityKind::ALL
            .iter()
            .map(|k| dataset.count(*k))
            .sum::<usize>(),
        dataset.relationships.len()
    );

    let summary = orchestrator.run(&dataset).await?;
    print!("{}", render::summary(&summary));

    if !summary.is_success() {
        tracing::error!(?selection, "seeding finished with failures");
        bail!("seeding failed");
    }
    eprintln!("{}", "ok".green().bold());
    Ok(())
}

async fn cmd_probe(config: &SeedConfig, selection: Selection) -> Result<()> {
    let orchestrator = Orchestrator::from_config(config, selection);
    let mut down = Vec::new();

    for (engine, result) in orchestrator.probe_each().await {
        match result {
            Ok(()) => println!("{} {engine}", "ready".green().bold()),
            Err(err) => {
                println!("{} {engine}: {err}", "unreachable".red().bold());
                down.push(engine.to_string());
            }
        }
    }

    if !down.is_empty() {
        bail!("not ready: {}", down.join(", "));
    }
    Ok(())
}

async fn cmd_verify(config: &SeedConfig) -> Result<()> {
    let dataset = Dataset::sample();
    let report = verify::verify(config, &dataset)
        .await
        .context("verification could not run")?;
    print!("{}", render::checks(&report));

    if !report.passed() {
        for check in report.failures() {
            tracing::warn!(
                engine = %check.engine,
                check = %check.name,
                actual = check.actual,
                "verification check failed"
            );
        }
        bail!("{} verification checks failed", report.failures().count());
    }
    Ok(())
}

async fn cmd_dump(config: &SeedConfig, selection: Selection, out: Option<PathBuf>) -> Result<()> {
    let destination = out.unwrap_or_else(|| config.dump.output_dir.clone());
    let exporter = DumpExporter::docker(&config.dump, &config.document);

    eprintln!(
        "{} {}",
        "Exporting to".green().bold(),
        destination.display()
    );
    let results = exporter.export_all(selection, &destination).await;
    print!("{}", render::dumps(&results));

    let failed = results.iter().filter(|(_, r)| r.is_err()).count();
    if failed > 0 {
        bail!("{failed} of {} dumps failed", results.len());
    }
    Ok(())
}

fn cmd_config(config: &SeedConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(&settings::redacted(config))?;
    println!("{json}");
    Ok(())
}
