//! Background event launcher
//!
//! Periodically instantiates due event definitions and announces the
//! fresh instances to every connected chat session.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{info, warn};

use super::{Event, EventService, LaunchedEvent, LaunchedEventService};
use crate::api::ConnectionManager;

/// Interval between launch checks
const LAUNCH_CHECK_SECONDS: u64 = 60;

/// Periodic task creating launched events from due definitions
pub struct EventLauncher {
    events: Arc<EventService>,
    launched_events: Arc<LaunchedEventService>,
    connections: Arc<ConnectionManager>,
}

impl EventLauncher {
    pub fn new(
        events: Arc<EventService>,
        launched_events: Arc<LaunchedEventService>,
        connections: Arc<ConnectionManager>,
    ) -> Self {
        Self {
            events,
            launched_events,
            connections,
        }
    }

    /// Run launch checks until shutdown is signalled
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(Duration::from_secs(LAUNCH_CHECK_SECONDS));
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.tick(Utc::now()).await {
                        warn!("Event launch check failed: {}", e);
                    }
                }
                _ = shutdown_rx.changed() => break,
            }
        }
    }

    /// Launch every due event and announce it; returns the new instances
    pub async fn tick(&self, now: DateTime<Utc>) -> Result<Vec<LaunchedEvent>, sqlx::Error> {
        let mut launched_now = Vec::new();
        for event in self.events.get_enabled_events().await? {
            if !self.is_due(&event, now).await? {
                continue;
            }
            let launched = self.launched_events.launch(&event, now).await?;
            info!(
                "Launched event {} as instance {} until {}",
                event.id, launched.id, launched.end_date
            );
            self.connections
                .broadcast_localized(|language| {
                    event.to_start_message(language, launched.end_date, now)
                })
                .await;
            launched_now.push(launched);
        }
        Ok(launched_now)
    }

    /// An event is due when it has no active instance and the last
    /// launch is at least one period old
    async fn is_due(&self, event: &Event, now: DateTime<Utc>) -> Result<bool, sqlx::Error> {
        Ok(
            match self.launched_events.get_last_by_event_id(event.id).await? {
                Some(last) if last.is_active(now) => false,
                Some(last) => now - last.start_date >= event.period(),
                None => true,
            },
        )
    }
}
