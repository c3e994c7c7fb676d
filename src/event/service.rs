//! Event storage services
//!
//! Lookup and persistence for event definitions and their launched
//! instances, including the participation edges.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;
use tracing::warn;

use super::{Event, EventId, EventLocale, EventType, LaunchedEvent, LaunchedEventId, NewEvent};
use crate::locale::Language;
use crate::personage::PersonageId;

/// Service for event definitions
pub struct EventService {
    pool: SqlitePool,
}

impl EventService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get an event definition with its locales
    pub async fn get_event_by_id(&self, id: EventId) -> Result<Option<Event>, sqlx::Error> {
        let row: Option<(i64, i64, i64, String, i64)> = sqlx::query_as(
            "SELECT id, period_seconds, duration_seconds, type, enabled FROM events WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        match self.event_from_row(row).await? {
            Some(event) => Ok(Some(event)),
            None => Ok(None),
        }
    }

    /// Get all enabled event definitions
    pub async fn get_enabled_events(&self) -> Result<Vec<Event>, sqlx::Error> {
        let rows: Vec<(i64, i64, i64, String, i64)> = sqlx::query_as(
            "SELECT id, period_seconds, duration_seconds, type, enabled FROM events WHERE enabled = 1",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(event) = self.event_from_row(row).await? {
                events.push(event);
            }
        }
        Ok(events)
    }

    /// Store a new event definition with its locales, returning the id
    pub async fn save_event(&self, event: &NewEvent) -> Result<EventId, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO events (period_seconds, duration_seconds, type, enabled) VALUES (?, ?, ?, ?)",
        )
        .bind(event.period_seconds)
        .bind(event.duration_seconds)
        .bind(event.event_type.as_str())
        .bind(event.enabled)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        for locale in &event.locales {
            sqlx::query(
                "INSERT INTO event_locales (event_id, language, intro, description) VALUES (?, ?, ?, ?)",
            )
            .bind(id)
            .bind(locale.language.code())
            .bind(&locale.intro)
            .bind(&locale.description)
            .execute(&self.pool)
            .await?;
        }
        Ok(id)
    }

    async fn event_from_row(
        &self,
        row: (i64, i64, i64, String, i64),
    ) -> Result<Option<Event>, sqlx::Error> {
        let (id, period_seconds, duration_seconds, type_str, enabled) = row;
        let Some(event_type) = EventType::from_str(&type_str) else {
            warn!("Event {} has unknown type '{}'", id, type_str);
            return Ok(None);
        };
        let locales = self.locales(id).await?;
        Ok(Some(Event {
            id,
            period_seconds,
            duration_seconds,
            event_type,
            enabled: enabled != 0,
            locales,
        }))
    }

    async fn locales(&self, event_id: EventId) -> Result<Vec<EventLocale>, sqlx::Error> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(
            "SELECT language, intro, description FROM event_locales WHERE event_id = ?",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(code, intro, description)| EventLocale {
                language: Language::from_code(&code).unwrap_or_default(),
                intro,
                description,
            })
            .collect())
    }
}

/// Service for launched event instances and participation edges
pub struct LaunchedEventService {
    pool: SqlitePool,
}

impl LaunchedEventService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(
        &self,
        id: LaunchedEventId,
    ) -> Result<Option<LaunchedEvent>, sqlx::Error> {
        let row: Option<(i64, i64, i64, i64)> = sqlx::query_as(
            "SELECT id, event_id, start_date, end_date FROM launched_events WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(launched_event_from_row))
    }

    /// Create an instance of an event with window [now, now + duration)
    pub async fn launch(
        &self,
        event: &Event,
        now: DateTime<Utc>,
    ) -> Result<LaunchedEvent, sqlx::Error> {
        let start = now;
        let end = now + event.duration();
        let result = sqlx::query(
            "INSERT INTO launched_events (event_id, start_date, end_date) VALUES (?, ?, ?)",
        )
        .bind(event.id)
        .bind(start.timestamp())
        .bind(end.timestamp())
        .execute(&self.pool)
        .await?;

        Ok(LaunchedEvent {
            id: result.last_insert_rowid(),
            event_id: event.id,
            start_date: start,
            end_date: end,
        })
    }

    /// Most recently launched instance of an event, active or not
    pub async fn get_last_by_event_id(
        &self,
        event_id: EventId,
    ) -> Result<Option<LaunchedEvent>, sqlx::Error> {
        let row: Option<(i64, i64, i64, i64)> = sqlx::query_as(
            "SELECT id, event_id, start_date, end_date FROM launched_events
             WHERE event_id = ? ORDER BY start_date DESC, id DESC LIMIT 1",
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(launched_event_from_row))
    }

    /// Record a participation edge
    pub async fn add_personage(
        &self,
        personage_id: PersonageId,
        launched_event_id: LaunchedEventId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO personage_to_event (personage_id, launched_event_id) VALUES (?, ?)",
        )
        .bind(personage_id)
        .bind(launched_event_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// The launched event a personage is actively enrolled in, if any
    pub async fn get_active_by_personage(
        &self,
        personage_id: PersonageId,
        now: DateTime<Utc>,
    ) -> Result<Option<LaunchedEvent>, sqlx::Error> {
        let rows: Vec<(i64, i64, i64, i64)> = sqlx::query_as(
            "SELECT le.id, le.event_id, le.start_date, le.end_date
             FROM launched_events le
             JOIN personage_to_event pe ON pe.launched_event_id = le.id
             WHERE pe.personage_id = ?",
        )
        .bind(personage_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(launched_event_from_row)
            .find(|launched| launched.is_active(now)))
    }
}

fn launched_event_from_row(row: (i64, i64, i64, i64)) -> LaunchedEvent {
    LaunchedEvent {
        id: row.0,
        event_id: row.1,
        start_date: DateTime::from_timestamp(row.2, 0).unwrap_or_default(),
        end_date: DateTime::from_timestamp(row.3, 0).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_pool;

    fn raid_seed() -> NewEvent {
        NewEvent {
            period_seconds: 86_400,
            duration_seconds: 3_600,
            event_type: EventType::Raid,
            enabled: true,
            locales: vec![EventLocale {
                language: Language::En,
                intro: "A raid gathers".to_string(),
                description: "The dungeon awaits".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn test_save_and_get_event() {
        let pool = test_pool().await;
        let events = EventService::new(pool);

        let id = events.save_event(&raid_seed()).await.unwrap();
        let event = events.get_event_by_id(id).await.unwrap().unwrap();

        assert_eq!(event.event_type, EventType::Raid);
        assert_eq!(event.duration_seconds, 3_600);
        assert_eq!(event.locales.len(), 1);
        assert_eq!(event.locales[0].intro, "A raid gathers");
    }

    #[tokio::test]
    async fn test_get_missing_event() {
        let pool = test_pool().await;
        let events = EventService::new(pool);

        assert!(events.get_event_by_id(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_launch_round_trip() {
        let pool = test_pool().await;
        let events = EventService::new(pool.clone());
        let launched_events = LaunchedEventService::new(pool);

        let id = events.save_event(&raid_seed()).await.unwrap();
        let event = events.get_event_by_id(id).await.unwrap().unwrap();
        let now = Utc::now();

        let launched = launched_events.launch(&event, now).await.unwrap();
        let fetched = launched_events
            .get_by_id(launched.id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(fetched.event_id, id);
        assert!(fetched.is_active(now));
        assert_eq!(fetched.end_date.timestamp(), (now + event.duration()).timestamp());
    }

    #[tokio::test]
    async fn test_active_participation_ignores_expired_instances() {
        let pool = test_pool().await;
        let events = EventService::new(pool.clone());
        let launched_events = LaunchedEventService::new(pool);

        let id = events.save_event(&raid_seed()).await.unwrap();
        let event = events.get_event_by_id(id).await.unwrap().unwrap();
        let now = Utc::now();

        // An instance launched long ago has already expired
        let expired = launched_events
            .launch(&event, now - chrono::Duration::days(2))
            .await
            .unwrap();
        launched_events.add_personage(7, expired.id).await.unwrap();
        assert!(launched_events
            .get_active_by_personage(7, now)
            .await
            .unwrap()
            .is_none());

        let active = launched_events.launch(&event, now).await.unwrap();
        launched_events.add_personage(7, active.id).await.unwrap();
        let found = launched_events
            .get_active_by_personage(7, now)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, active.id);
    }

    #[tokio::test]
    async fn test_last_instance_by_event() {
        let pool = test_pool().await;
        let events = EventService::new(pool.clone());
        let launched_events = LaunchedEventService::new(pool);

        let id = events.save_event(&raid_seed()).await.unwrap();
        let event = events.get_event_by_id(id).await.unwrap().unwrap();
        let now = Utc::now();

        assert!(launched_events
            .get_last_by_event_id(id)
            .await
            .unwrap()
            .is_none());

        launched_events
            .launch(&event, now - chrono::Duration::days(1))
            .await
            .unwrap();
        let latest = launched_events.launch(&event, now).await.unwrap();

        let found = launched_events
            .get_last_by_event_id(id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, latest.id);
    }
}
