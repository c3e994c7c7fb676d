//! Command execution against the game services

use std::sync::Arc;

use tracing::error;

use super::Command;
use crate::duel::{DuelError, DuelService};
use crate::locale::{common, duel, raid, Language};
use crate::personage::{JoinEventError, Personage, PersonageError, PersonageId, PersonageService};

/// Executes parsed commands and renders localized replies
pub struct CommandDispatcher {
    personages: Arc<PersonageService>,
    duels: Arc<DuelService>,
}

impl CommandDispatcher {
    pub fn new(personages: Arc<PersonageService>, duels: Arc<DuelService>) -> Self {
        Self { personages, duels }
    }

    /// Execute a command for a logged-in personage
    pub async fn execute(
        &self,
        personage_id: PersonageId,
        language: Language,
        command: Command,
    ) -> String {
        let personage = match self.personages.get_by_id_force(personage_id).await {
            Ok(personage) => personage,
            Err(e) => {
                error!("Failed to load personage {}: {}", personage_id, e);
                return common::internal_error(language).to_string();
            }
        };

        match command {
            Command::Start => common::welcome(language).to_string(),
            Command::Help => common::help(language).to_string(),
            Command::Profile => common::profile(language, &personage),
            Command::ChangeName { name } => self.change_name(personage, language, &name).await,
            Command::LevelUp { kind } => {
                match self.personages.increment_characteristic(personage, kind).await {
                    Ok(_) => common::characteristic_increased(language).to_string(),
                    Err(PersonageError::NotEnoughLevelingPoints) => {
                        common::not_enough_leveling_points(language).to_string()
                    }
                    Err(e) => self.personage_failure(language, e),
                }
            }
            Command::ResetStats => match self.personages.reset_stats(personage).await {
                Ok(_) => common::stats_reset(language).to_string(),
                Err(PersonageError::NotEnoughMoney { price }) => {
                    common::not_enough_money(language, price)
                }
                Err(e) => self.personage_failure(language, e),
            },
            Command::StartDuel { opponent } => {
                self.start_duel(personage, language, &opponent).await
            }
            Command::AcceptDuel { duel_id } => {
                self.accept_duel(personage, language, duel_id).await
            }
            Command::DeclineDuel { duel_id } => {
                self.decline_duel(personage, language, duel_id).await
            }
            Command::JoinEvent { launched_event_id } => {
                match self.personages.join_event(personage.id, launched_event_id).await {
                    Ok(()) => raid::join_success(language).to_string(),
                    Err(JoinEventError::EventNotExist) => {
                        raid::event_not_exist(language).to_string()
                    }
                    Err(JoinEventError::ExpiredEvent(_)) => {
                        raid::expired_event(language).to_string()
                    }
                    Err(JoinEventError::PersonageInThisEvent) => {
                        raid::personage_in_this_event(language).to_string()
                    }
                    Err(JoinEventError::PersonageInOtherEvent) => {
                        raid::personage_in_other_event(language).to_string()
                    }
                    Err(JoinEventError::Storage(e)) => {
                        error!("Join event failed: {}", e);
                        common::internal_error(language).to_string()
                    }
                }
            }
            // The chat session owns the language; by the time the command
            // reaches us the switch has already happened.
            Command::ChangeLanguage { .. } => common::language_changed(language).to_string(),
        }
    }

    async fn change_name(
        &self,
        personage: Personage,
        language: Language,
        name: &str,
    ) -> String {
        match self.personages.change_name(personage, name).await {
            Ok(renamed) => common::name_changed(language, &renamed.name),
            Err(PersonageError::InvalidName) => common::invalid_name(language).to_string(),
            Err(e) => self.personage_failure(language, e),
        }
    }

    async fn start_duel(
        &self,
        initiator: Personage,
        language: Language,
        opponent_name: &str,
    ) -> String {
        let opponent = match self.personages.get_by_name(opponent_name).await {
            Ok(Some(opponent)) => opponent,
            Ok(None) => return common::personage_not_found(language, opponent_name),
            Err(e) => return self.personage_failure(language, e),
        };
        match self.duels.create_duel(&initiator, &opponent).await {
            Ok(created) => {
                duel::duel_proposed(language, &initiator.name, &opponent.name, created.id)
            }
            Err(DuelError::DuelWithSelf) => duel::duel_with_self(language).to_string(),
            Err(DuelError::DuelAlreadyExists) => duel::duel_already_exists(language).to_string(),
            Err(e) => self.duel_failure(language, e),
        }
    }

    async fn accept_duel(
        &self,
        acceptor: Personage,
        language: Language,
        duel_id: crate::duel::DuelId,
    ) -> String {
        match self.duels.accept_duel(duel_id, acceptor.id).await {
            Ok(result) => {
                let winner = self
                    .personages
                    .get_by_id_force(result.winner.personage_id)
                    .await;
                let loser = self
                    .personages
                    .get_by_id_force(result.loser.personage_id)
                    .await;
                match (winner, loser) {
                    (Ok(winner), Ok(loser)) => {
                        duel::duel_result(language, &winner.name, &loser.name, &result)
                    }
                    _ => common::internal_error(language).to_string(),
                }
            }
            Err(DuelError::NotDuelAcceptor) => {
                duel::not_duel_accepting_personage(language).to_string()
            }
            Err(DuelError::DuelNotWaiting) => duel::duel_not_waiting(language).to_string(),
            Err(e) => self.duel_failure(language, e),
        }
    }

    async fn decline_duel(
        &self,
        decliner: Personage,
        language: Language,
        duel_id: crate::duel::DuelId,
    ) -> String {
        match self.duels.decline_duel(duel_id, decliner.id).await {
            Ok(declined) => {
                match self
                    .personages
                    .get_by_id_force(declined.initiating_personage_id)
                    .await
                {
                    Ok(initiator) => duel::declined_duel(language, &initiator.name),
                    Err(e) => {
                        error!("Failed to load duel initiator: {}", e);
                        common::internal_error(language).to_string()
                    }
                }
            }
            Err(DuelError::NotDuelAcceptor) => {
                duel::not_duel_accepting_personage(language).to_string()
            }
            Err(DuelError::DuelNotWaiting) => duel::duel_not_waiting(language).to_string(),
            Err(e) => self.duel_failure(language, e),
        }
    }

    fn personage_failure(&self, language: Language, e: PersonageError) -> String {
        error!("Personage operation failed: {}", e);
        common::internal_error(language).to_string()
    }

    fn duel_failure(&self, language: Language, e: DuelError) -> String {
        error!("Duel operation failed: {}", e);
        common::internal_error(language).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_pool;
    use crate::event::{EventService, LaunchedEventService};

    async fn dispatcher() -> (Arc<PersonageService>, CommandDispatcher) {
        let pool = test_pool().await;
        let events = Arc::new(EventService::new(pool.clone()));
        let launched_events = Arc::new(LaunchedEventService::new(pool.clone()));
        let personages = Arc::new(PersonageService::new(
            pool.clone(),
            events,
            launched_events,
        ));
        let duels = Arc::new(DuelService::new(pool, personages.clone()));
        (personages.clone(), CommandDispatcher::new(personages, duels))
    }

    #[tokio::test]
    async fn test_profile_command_renders_stats() {
        let (personages, dispatcher) = dispatcher().await;
        let personage = personages.create_personage().await.unwrap();

        let reply = dispatcher
            .execute(personage.id, Language::En, Command::Profile)
            .await;

        assert!(reply.contains(&personage.name));
        assert!(reply.contains("Health: 100/100"));
    }

    #[tokio::test]
    async fn test_duel_flow_over_commands() {
        let (personages, dispatcher) = dispatcher().await;
        let initiator = personages.create_personage().await.unwrap();
        let opponent = personages.create_personage().await.unwrap();
        let opponent = personages
            .change_name(opponent, "Boromir")
            .await
            .unwrap();

        let reply = dispatcher
            .execute(
                initiator.id,
                Language::En,
                Command::StartDuel {
                    opponent: "Boromir".to_string(),
                },
            )
            .await;
        assert!(reply.contains("challenges"));

        let reply = dispatcher
            .execute(
                opponent.id,
                Language::En,
                Command::AcceptDuel { duel_id: 1 },
            )
            .await;
        assert!(reply.contains("defeats"));
    }

    #[tokio::test]
    async fn test_unknown_opponent() {
        let (personages, dispatcher) = dispatcher().await;
        let personage = personages.create_personage().await.unwrap();

        let reply = dispatcher
            .execute(
                personage.id,
                Language::En,
                Command::StartDuel {
                    opponent: "Nobody".to_string(),
                },
            )
            .await;

        assert!(reply.contains("no personage named Nobody"));
    }

    #[tokio::test]
    async fn test_join_unknown_event() {
        let (personages, dispatcher) = dispatcher().await;
        let personage = personages.create_personage().await.unwrap();

        let reply = dispatcher
            .execute(
                personage.id,
                Language::En,
                Command::JoinEvent {
                    launched_event_id: 42,
                },
            )
            .await;

        assert_eq!(reply, raid::event_not_exist(Language::En));
    }
}
