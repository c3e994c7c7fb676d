//! tavernd_init - One-time database initialization tool
//!
//! Creates a fresh game database seeded with event definitions.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// tavernd database initialization tool
#[derive(Parser, Debug)]
#[command(
    name = "tavernd_init",
    version,
    about = "Initialize a new tavernd database"
)]
struct Args {
    /// Path to SQLite database file to create (must not exist)
    #[arg(short, long)]
    database: PathBuf,

    /// TOML file with event definitions to seed
    #[arg(long = "events")]
    events: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tavernd=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    if !args.events.exists() {
        bail!("Event seed file not found: {}", args.events.display());
    }
    let source = std::fs::read_to_string(&args.events)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", args.events.display(), e))?;
    let seed = tavernd::init::parse_seed(&source)?;

    tavernd::init::init_database(&args.database, seed.events).await?;

    Ok(())
}
