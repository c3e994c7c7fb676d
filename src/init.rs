//! Database initialization module
//!
//! Provides one-time database setup functionality for the tavernd_init
//! tool: creates a fresh database and seeds the event definitions.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::db::Database;
use crate::event::{EventService, NewEvent};

/// Seed file layout: a list of event definitions
#[derive(Debug, Deserialize)]
pub struct EventSeedFile {
    pub events: Vec<NewEvent>,
}

/// Parse a TOML event seed file
pub fn parse_seed(source: &str) -> Result<EventSeedFile> {
    toml::from_str(source).context("Failed to parse event seed file")
}

/// Initialize a new game database
///
/// # Arguments
/// * `path` - Path to the SQLite database file (must not exist)
/// * `events` - Event definitions to seed
///
/// # Errors
/// * Database file already exists
/// * An event carries no locales
/// * Database creation fails
pub async fn init_database(path: &Path, events: Vec<NewEvent>) -> Result<()> {
    // Fail if database already exists
    if path.exists() {
        bail!(
            "Database file already exists: {}. Remove it first or use a different path.",
            path.display()
        );
    }

    for event in &events {
        if event.locales.is_empty() {
            bail!("Every seeded event needs at least one locale");
        }
    }

    info!("Creating new database at {}", path.display());

    let path_str = path.to_str().context("Database path must be valid UTF-8")?;
    let db = Database::new(Some(path_str)).await?;
    let service = EventService::new(db.pool().clone());
    for event in &events {
        let id = service.save_event(event).await?;
        info!(
            "Seeded {} event {} ({} locales)",
            event.event_type.as_str(),
            id,
            event.locales.len()
        );
    }

    info!("Database initialized with {} events", events.len());
    Ok(())
}
