//! Duel module
//!
//! Persisted duel challenges between personages and their lifecycle:
//! a WAITING challenge is either DECLINED or, on acceptance, fought to
//! the end and FINISHED. Accepting runs the battle resolver and
//! persists the consequences (health, reward, winner).

use std::sync::Arc;

use anyhow::Context;
use sqlx::sqlite::SqlitePool;
use thiserror::Error;
use tracing::info;

use crate::battle::{self, BattlePersonage, DuelResult, RandomDice};
use crate::personage::{Personage, PersonageError, PersonageId, PersonageService};

/// Duel identity
pub type DuelId = i64;

/// Money granted to the duel winner
pub const DUEL_REWARD: i64 = 10;

/// Lifecycle states of a duel challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuelStatus {
    Waiting,
    Declined,
    Finished,
}

impl DuelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuelStatus::Waiting => "waiting",
            DuelStatus::Declined => "declined",
            DuelStatus::Finished => "finished",
        }
    }

    pub fn from_str(s: &str) -> Option<DuelStatus> {
        match s {
            "waiting" => Some(DuelStatus::Waiting),
            "declined" => Some(DuelStatus::Declined),
            "finished" => Some(DuelStatus::Finished),
            _ => None,
        }
    }
}

/// A persisted duel challenge
#[derive(Debug, Clone)]
pub struct Duel {
    pub id: DuelId,
    pub initiating_personage_id: PersonageId,
    pub accepting_personage_id: PersonageId,
    pub status: DuelStatus,
    pub winner_id: Option<PersonageId>,
}

/// Duel lifecycle errors
#[derive(Debug, Error)]
pub enum DuelError {
    #[error("cannot duel yourself")]
    DuelWithSelf,

    #[error("initiator already has a pending duel")]
    DuelAlreadyExists,

    #[error("personage is not the duel acceptor")]
    NotDuelAcceptor,

    #[error("duel is not waiting for an answer")]
    DuelNotWaiting,

    #[error("database error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("personage error: {0}")]
    Personage(#[from] PersonageError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Service owning duel challenges
pub struct DuelService {
    pool: SqlitePool,
    personages: Arc<PersonageService>,
}

impl DuelService {
    pub fn new(pool: SqlitePool, personages: Arc<PersonageService>) -> Self {
        Self { pool, personages }
    }

    /// Create a WAITING challenge from initiator to opponent
    pub async fn create_duel(
        &self,
        initiator: &Personage,
        opponent: &Personage,
    ) -> Result<Duel, DuelError> {
        if initiator.id == opponent.id {
            return Err(DuelError::DuelWithSelf);
        }
        let pending: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM duels WHERE initiating_personage_id = ? AND status = ? LIMIT 1",
        )
        .bind(initiator.id)
        .bind(DuelStatus::Waiting.as_str())
        .fetch_optional(&self.pool)
        .await?;
        if pending.is_some() {
            return Err(DuelError::DuelAlreadyExists);
        }

        let result = sqlx::query(
            "INSERT INTO duels (initiating_personage_id, accepting_personage_id, status)
             VALUES (?, ?, ?)",
        )
        .bind(initiator.id)
        .bind(opponent.id)
        .bind(DuelStatus::Waiting.as_str())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(
            "Personage {} challenged {} to duel {}",
            initiator.id, opponent.id, id
        );
        Ok(Duel {
            id,
            initiating_personage_id: initiator.id,
            accepting_personage_id: opponent.id,
            status: DuelStatus::Waiting,
            winner_id: None,
        })
    }

    pub async fn get_by_id(&self, id: DuelId) -> Result<Option<Duel>, DuelError> {
        let row: Option<(i64, i64, i64, String, Option<i64>)> = sqlx::query_as(
            "SELECT id, initiating_personage_id, accepting_personage_id, status, winner_id
             FROM duels WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some((id, initiator, acceptor, status, winner_id)) = row else {
            return Ok(None);
        };
        let status = DuelStatus::from_str(&status)
            .with_context(|| format!("Unknown duel status '{}'", status))?;
        Ok(Some(Duel {
            id,
            initiating_personage_id: initiator,
            accepting_personage_id: acceptor,
            status,
            winner_id,
        }))
    }

    /// Load a duel the caller has guaranteed to exist
    pub async fn get_by_id_force(&self, id: DuelId) -> Result<Duel, DuelError> {
        self.get_by_id(id)
            .await?
            .with_context(|| format!("Duel must be present with id {}", id))
            .map_err(DuelError::from)
    }

    /// Accept a waiting duel and fight it out
    ///
    /// The initiator strikes first. Both personages' canonical health is
    /// updated from the battle outcome and the winner collects the reward.
    pub async fn accept_duel(
        &self,
        duel_id: DuelId,
        acceptor_id: PersonageId,
    ) -> Result<DuelResult, DuelError> {
        let duel = self.get_by_id_force(duel_id).await?;
        if duel.status != DuelStatus::Waiting {
            return Err(DuelError::DuelNotWaiting);
        }
        if duel.accepting_personage_id != acceptor_id {
            return Err(DuelError::NotDuelAcceptor);
        }

        let initiator = self
            .personages
            .get_by_id_force(duel.initiating_personage_id)
            .await?;
        let acceptor = self.personages.get_by_id_force(acceptor_id).await?;

        let result = battle::resolve(
            BattlePersonage::new(initiator.id, &initiator.characteristics, initiator.health),
            BattlePersonage::new(acceptor.id, &acceptor.characteristics, acceptor.health),
            &mut RandomDice,
        );

        self.personages
            .update_health(
                result.winner.personage_id,
                result.winner.remaining_health,
                result.finished_at,
            )
            .await?;
        self.personages
            .update_health(
                result.loser.personage_id,
                result.loser.remaining_health,
                result.finished_at,
            )
            .await?;

        let winner = self
            .personages
            .get_by_id_force(result.winner.personage_id)
            .await?;
        self.personages.add_money(winner, DUEL_REWARD).await?;

        sqlx::query("UPDATE duels SET status = ?, winner_id = ? WHERE id = ?")
            .bind(DuelStatus::Finished.as_str())
            .bind(result.winner.personage_id)
            .bind(duel.id)
            .execute(&self.pool)
            .await?;

        info!(
            "Duel {} finished, personage {} won in {} rounds",
            duel.id, result.winner.personage_id, result.rounds
        );
        Ok(result)
    }

    /// Decline a waiting duel
    pub async fn decline_duel(
        &self,
        duel_id: DuelId,
        decliner_id: PersonageId,
    ) -> Result<Duel, DuelError> {
        let mut duel = self.get_by_id_force(duel_id).await?;
        if duel.status != DuelStatus::Waiting {
            return Err(DuelError::DuelNotWaiting);
        }
        if duel.accepting_personage_id != decliner_id {
            return Err(DuelError::NotDuelAcceptor);
        }

        sqlx::query("UPDATE duels SET status = ? WHERE id = ?")
            .bind(DuelStatus::Declined.as_str())
            .bind(duel.id)
            .execute(&self.pool)
            .await?;

        duel.status = DuelStatus::Declined;
        Ok(duel)
    }
}
