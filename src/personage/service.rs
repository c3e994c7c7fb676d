//! Personage service
//!
//! Lifecycle operations on personages and the event participation
//! state machine. Every join attempt is classified into a closed set
//! of outcomes; only the success path writes a participation edge.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info};

use super::{
    is_valid_name, CharacteristicKind, Characteristics, Personage, PersonageId, DEFAULT_NAME,
    STARTING_LEVELING_POINTS,
};
use crate::event::{Event, EventService, LaunchedEventId, LaunchedEventService};

/// Money charged for resetting characteristics
pub const RESET_STATS_PRICE: i64 = 100;

/// Personage operation errors
#[derive(Debug, Error)]
pub enum PersonageError {
    #[error("invalid personage name")]
    InvalidName,

    #[error("not enough leveling points")]
    NotEnoughLevelingPoints,

    #[error("not enough money: need {price}")]
    NotEnoughMoney { price: i64 },

    #[error("database error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Outcomes of a failed event join attempt
///
/// The variants are mutually exclusive and checked in this order:
/// unknown event, expired event, already in this event, busy in
/// another event. Storage failures stay generic on purpose.
#[derive(Debug, Error)]
pub enum JoinEventError {
    #[error("launched event does not exist")]
    EventNotExist,

    #[error("event already finished")]
    ExpiredEvent(Event),

    #[error("personage is already in this event")]
    PersonageInThisEvent,

    #[error("personage is busy in another event")]
    PersonageInOtherEvent,

    #[error("database error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Service owning personage state and event participation
pub struct PersonageService {
    pool: SqlitePool,
    events: Arc<EventService>,
    launched_events: Arc<LaunchedEventService>,
    join_locks: Mutex<HashMap<PersonageId, Arc<Mutex<()>>>>,
}

impl PersonageService {
    pub fn new(
        pool: SqlitePool,
        events: Arc<EventService>,
        launched_events: Arc<LaunchedEventService>,
    ) -> Self {
        Self {
            pool,
            events,
            launched_events,
            join_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Create a personage with the starting loadout
    pub async fn create_personage(&self) -> Result<Personage, PersonageError> {
        let characteristics = Characteristics::default_start();
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO personages
             (name, money, leveling_points, health, last_health_change,
              attack, defense, strength, agility, wisdom)
             VALUES (?, 0, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(DEFAULT_NAME)
        .bind(STARTING_LEVELING_POINTS)
        .bind(characteristics.max_health())
        .bind(now.timestamp())
        .bind(characteristics.attack)
        .bind(characteristics.defense)
        .bind(characteristics.strength)
        .bind(characteristics.agility)
        .bind(characteristics.wisdom)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!("Created personage {}", id);
        Ok(Personage {
            id,
            name: DEFAULT_NAME.to_string(),
            money: 0,
            leveling_points: STARTING_LEVELING_POINTS,
            health: characteristics.max_health(),
            last_health_change: now,
            characteristics,
        })
    }

    /// Load a personage, applying passive regeneration
    pub async fn get_by_id(&self, id: PersonageId) -> Result<Option<Personage>, PersonageError> {
        let row: Option<PersonageRow> = sqlx::query_as(
            "SELECT id, name, money, leveling_points, health, last_health_change,
                    attack, defense, strength, agility, wisdom
             FROM personages WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.regen_and_save(row.into()).await?)),
            None => Ok(None),
        }
    }

    /// Load a personage the caller has guaranteed to exist
    pub async fn get_by_id_force(&self, id: PersonageId) -> anyhow::Result<Personage> {
        self.get_by_id(id)
            .await?
            .with_context(|| format!("Personage must be present with id {}", id))
    }

    /// Find a personage by exact name
    pub async fn get_by_name(&self, name: &str) -> Result<Option<Personage>, PersonageError> {
        let row: Option<PersonageRow> = sqlx::query_as(
            "SELECT id, name, money, leveling_points, health, last_health_change,
                    attack, defense, strength, agility, wisdom
             FROM personages WHERE name = ? LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.regen_and_save(row.into()).await?)),
            None => Ok(None),
        }
    }

    /// Attempt to enroll a personage in a launched event
    ///
    /// The whole check-then-insert runs under a per-personage guard so
    /// two simultaneous joins cannot both pass the no-active-edge check.
    pub async fn join_event(
        &self,
        personage_id: PersonageId,
        launched_event_id: LaunchedEventId,
    ) -> Result<(), JoinEventError> {
        let lock = self.join_lock(personage_id).await;
        let _guard = lock.lock().await;

        let Some(requested) = self.launched_events.get_by_id(launched_event_id).await? else {
            error!("Requested event {} doesn't present", launched_event_id);
            return Err(JoinEventError::EventNotExist);
        };
        let now = Utc::now();
        if !requested.is_active(now) {
            return Err(match self.events.get_event_by_id(requested.event_id).await? {
                Some(event) => JoinEventError::ExpiredEvent(event),
                None => JoinEventError::EventNotExist,
            });
        }

        match self
            .launched_events
            .get_active_by_personage(personage_id, now)
            .await?
        {
            None => {
                self.launched_events
                    .add_personage(personage_id, launched_event_id)
                    .await?;
                Ok(())
            }
            Some(active) if active.id == launched_event_id => {
                Err(JoinEventError::PersonageInThisEvent)
            }
            Some(_) => Err(JoinEventError::PersonageInOtherEvent),
        }
    }

    /// Rename a personage after validating the new name
    pub async fn change_name(
        &self,
        mut personage: Personage,
        name: &str,
    ) -> Result<Personage, PersonageError> {
        let name = name.trim();
        if !is_valid_name(name) {
            return Err(PersonageError::InvalidName);
        }
        personage.name = name.to_string();
        self.update(&personage).await?;
        Ok(personage)
    }

    /// Spend one leveling point on a characteristic
    pub async fn increment_characteristic(
        &self,
        mut personage: Personage,
        kind: CharacteristicKind,
    ) -> Result<Personage, PersonageError> {
        if personage.leveling_points < 1 {
            return Err(PersonageError::NotEnoughLevelingPoints);
        }
        personage.leveling_points -= 1;
        personage.characteristics = personage.characteristics.with_incremented(kind);
        self.update(&personage).await?;
        Ok(personage)
    }

    /// Reset characteristics to the starting values for a price,
    /// refunding the spent leveling points
    pub async fn reset_stats(
        &self,
        mut personage: Personage,
    ) -> Result<Personage, PersonageError> {
        if personage.money < RESET_STATS_PRICE {
            return Err(PersonageError::NotEnoughMoney {
                price: RESET_STATS_PRICE,
            });
        }
        personage.money -= RESET_STATS_PRICE;
        personage.leveling_points += personage.characteristics.spent_leveling_points();
        personage.characteristics = Characteristics::default_start();
        personage.health = personage.health.min(personage.characteristics.max_health());
        self.update(&personage).await?;
        Ok(personage)
    }

    /// Add (or with a negative amount, take) money
    pub async fn add_money(
        &self,
        mut personage: Personage,
        amount: i64,
    ) -> Result<Personage, PersonageError> {
        personage.money += amount;
        self.update(&personage).await?;
        Ok(personage)
    }

    /// Overwrite stored health, stamping the change time
    pub async fn update_health(
        &self,
        id: PersonageId,
        health: i32,
        at: DateTime<Utc>,
    ) -> Result<(), PersonageError> {
        sqlx::query("UPDATE personages SET health = ?, last_health_change = ? WHERE id = ?")
            .bind(health)
            .bind(at.timestamp())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update(&self, personage: &Personage) -> Result<(), PersonageError> {
        sqlx::query(
            "UPDATE personages SET
                name = ?, money = ?, leveling_points = ?,
                health = ?, last_health_change = ?,
                attack = ?, defense = ?, strength = ?, agility = ?, wisdom = ?
             WHERE id = ?",
        )
        .bind(&personage.name)
        .bind(personage.money)
        .bind(personage.leveling_points)
        .bind(personage.health)
        .bind(personage.last_health_change.timestamp())
        .bind(personage.characteristics.attack)
        .bind(personage.characteristics.defense)
        .bind(personage.characteristics.strength)
        .bind(personage.characteristics.agility)
        .bind(personage.characteristics.wisdom)
        .bind(personage.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn regen_and_save(&self, mut personage: Personage) -> Result<Personage, PersonageError> {
        if personage.regen_health(Utc::now()) {
            self.update_health(personage.id, personage.health, personage.last_health_change)
                .await?;
        }
        Ok(personage)
    }

    async fn join_lock(&self, personage_id: PersonageId) -> Arc<Mutex<()>> {
        self.join_locks
            .lock()
            .await
            .entry(personage_id)
            .or_default()
            .clone()
    }
}

type PersonageRow = (i64, String, i64, i32, i32, i64, i32, i32, i32, i32, i32);

impl From<PersonageRow> for Personage {
    fn from(row: PersonageRow) -> Self {
        let (
            id,
            name,
            money,
            leveling_points,
            health,
            last_health_change,
            attack,
            defense,
            strength,
            agility,
            wisdom,
        ) = row;
        Personage {
            id,
            name,
            money,
            leveling_points,
            health,
            last_health_change: DateTime::from_timestamp(last_health_change, 0)
                .unwrap_or_default(),
            characteristics: Characteristics {
                attack,
                defense,
                strength,
                agility,
                wisdom,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_pool;
    use crate::event::{EventLocale, EventType, NewEvent};
    use crate::locale::Language;

    async fn services() -> (Arc<PersonageService>, Arc<EventService>, Arc<LaunchedEventService>) {
        let pool = test_pool().await;
        let events = Arc::new(EventService::new(pool.clone()));
        let launched_events = Arc::new(LaunchedEventService::new(pool.clone()));
        let personages = Arc::new(PersonageService::new(
            pool,
            events.clone(),
            launched_events.clone(),
        ));
        (personages, events, launched_events)
    }

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
    async fn test_create_and_load_personage() {
        let (personages, _, _) = services().await;

        let created = personages.create_personage().await.unwrap();
        let loaded = personages.get_by_id(created.id).await.unwrap().unwrap();

        assert_eq!(loaded.name, DEFAULT_NAME);
        assert_eq!(loaded.health, loaded.characteristics.max_health());
        assert_eq!(loaded.leveling_points, STARTING_LEVELING_POINTS);
        assert_eq!(loaded.money, 0);
    }

    #[tokio::test]
    async fn test_get_by_id_force_panics_loudly_on_missing() {
        let (personages, _, _) = services().await;
        assert!(personages.get_by_id_force(404).await.is_err());
    }

    #[tokio::test]
    async fn test_join_precedence_chain() {
        let (personages, events, launched_events) = services().await;
        let personage = personages.create_personage().await.unwrap();
        let now = Utc::now();

        let event_id = events.save_event(&raid_seed()).await.unwrap();
        let event = events.get_event_by_id(event_id).await.unwrap().unwrap();
        let first = launched_events.launch(&event, now).await.unwrap();
        let second = launched_events.launch(&event, now).await.unwrap();
        let expired = launched_events
            .launch(&event, now - chrono::Duration::days(1))
            .await
            .unwrap();

        // Fresh personage joins the first active instance
        personages.join_event(personage.id, first.id).await.unwrap();

        // A different active instance is refused
        assert!(matches!(
            personages.join_event(personage.id, second.id).await,
            Err(JoinEventError::PersonageInOtherEvent)
        ));

        // Joining the same instance again is refused without a new edge
        assert!(matches!(
            personages.join_event(personage.id, first.id).await,
            Err(JoinEventError::PersonageInThisEvent)
        ));

        // An expired instance reports the event for messaging
        assert!(matches!(
            personages.join_event(personage.id, expired.id).await,
            Err(JoinEventError::ExpiredEvent(_))
        ));

        // A bogus id wins over every other classification
        assert!(matches!(
            personages.join_event(personage.id, 9999).await,
            Err(JoinEventError::EventNotExist)
        ));
    }

    #[tokio::test]
    async fn test_join_never_duplicates_edges() {
        let (personages, events, launched_events) = services().await;
        let personage = personages.create_personage().await.unwrap();
        let now = Utc::now();

        let event_id = events.save_event(&raid_seed()).await.unwrap();
        let event = events.get_event_by_id(event_id).await.unwrap().unwrap();
        let launched = launched_events.launch(&event, now).await.unwrap();

        personages.join_event(personage.id, launched.id).await.unwrap();
        let _ = personages.join_event(personage.id, launched.id).await;

        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM personage_to_event WHERE personage_id = ?")
                .bind(personage.id)
                .fetch_one(&personages.pool)
                .await
                .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_expired_event_with_broken_definition_degrades() {
        let (personages, events, launched_events) = services().await;
        let personage = personages.create_personage().await.unwrap();
        let now = Utc::now();

        let event_id = events.save_event(&raid_seed()).await.unwrap();
        let event = events.get_event_by_id(event_id).await.unwrap().unwrap();
        let expired = launched_events
            .launch(&event, now - chrono::Duration::days(1))
            .await
            .unwrap();

        // Corrupt the definition so it no longer resolves
        sqlx::query("UPDATE events SET type = 'siege' WHERE id = ?")
            .bind(event_id)
            .execute(&personages.pool)
            .await
            .unwrap();

        assert!(matches!(
            personages.join_event(personage.id, expired.id).await,
            Err(JoinEventError::EventNotExist)
        ));
    }

    #[tokio::test]
    async fn test_concurrent_joins_allow_only_one_event() {
        let (personages, events, launched_events) = services().await;
        let personage = personages.create_personage().await.unwrap();
        let now = Utc::now();

        let event_id = events.save_event(&raid_seed()).await.unwrap();
        let event = events.get_event_by_id(event_id).await.unwrap().unwrap();
        let first = launched_events.launch(&event, now).await.unwrap();
        let second = launched_events.launch(&event, now).await.unwrap();

        let (a, b) = tokio::join!(
            personages.join_event(personage.id, first.id),
            personages.join_event(personage.id, second.id),
        );

        // Exactly one of the two simultaneous joins may create an edge
        assert!(a.is_ok() ^ b.is_ok());
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM personage_to_event WHERE personage_id = ?")
                .bind(personage.id)
                .fetch_one(&personages.pool)
                .await
                .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_change_name() {
        let (personages, _, _) = services().await;
        let personage = personages.create_personage().await.unwrap();

        let renamed = personages
            .change_name(personage.clone(), "Grim Tavernkeeper")
            .await
            .unwrap();
        assert_eq!(renamed.name, "Grim Tavernkeeper");

        assert!(matches!(
            personages.change_name(renamed, "x").await,
            Err(PersonageError::InvalidName)
        ));
    }

    #[tokio::test]
    async fn test_leveling_and_reset() {
        let (personages, _, _) = services().await;
        let mut personage = personages.create_personage().await.unwrap();

        for _ in 0..STARTING_LEVELING_POINTS {
            personage = personages
                .increment_characteristic(personage, CharacteristicKind::Wisdom)
                .await
                .unwrap();
        }
        assert_eq!(personage.leveling_points, 0);
        assert_eq!(personage.characteristics.wisdom, 5 + STARTING_LEVELING_POINTS);

        assert!(matches!(
            personages
                .increment_characteristic(personage.clone(), CharacteristicKind::Agility)
                .await,
            Err(PersonageError::NotEnoughLevelingPoints)
        ));

        // Reset is refused while broke
        assert!(matches!(
            personages.reset_stats(personage.clone()).await,
            Err(PersonageError::NotEnoughMoney { .. })
        ));

        let personage = personages
            .add_money(personage, RESET_STATS_PRICE)
            .await
            .unwrap();
        let personage = personages.reset_stats(personage).await.unwrap();
        assert_eq!(personage.money, 0);
        assert_eq!(personage.leveling_points, STARTING_LEVELING_POINTS);
        assert_eq!(
            personage.characteristics,
            Characteristics::default_start()
        );
    }
}
