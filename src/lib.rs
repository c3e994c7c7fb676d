//! tavernd - chat RPG game server daemon
//!
//! A turn-based, stat-driven personage simulation embedded in chat:
//! duels resolved through a dice-driven combat engine and recurring
//! events personages can join.

pub mod api;
pub mod battle;
pub mod command;
pub mod config;
pub mod db;
pub mod duel;
pub mod event;
pub mod init;
pub mod locale;
pub mod personage;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use api::AppState;
use db::Database;
use event::EventLauncher;

pub use config::Config;

/// The tavernd server instance
pub struct Server {
    config: Config,
    state: AppState,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Server {
    /// Create a new server instance
    pub async fn new(config: Config) -> Result<Self> {
        let db = Arc::new(Database::new(config.db_path.as_deref()).await?);
        let state = AppState::build(db, config.default_language);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            config,
            state,
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Get the database handle
    pub fn db(&self) -> Arc<Database> {
        self.state.db.clone()
    }

    /// Get the shared application state
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the server until shutdown
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        info!("tavernd listening on {}", local_addr);

        let launcher = EventLauncher::new(
            self.state.events.clone(),
            self.state.launched_events.clone(),
            self.state.connections.clone(),
        );
        tokio::spawn(launcher.run(self.shutdown_rx.clone()));

        let router = api::router(self.state.clone());
        let mut shutdown_rx = self.shutdown_rx.clone();

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown_rx.changed().await.ok();
            })
            .await?;

        info!("tavernd shutdown complete");
        Ok(())
    }

    /// Signal the server to shutdown
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Get the configured bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }
}
