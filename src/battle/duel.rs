//! Duel resolver
//!
//! Alternates attacks between two combatant snapshots until exactly one
//! survives. Termination is guaranteed by the strictly positive attack
//! floor in the calculator.

use chrono::{DateTime, Utc};

use super::dice::Dice;
use super::personage::BattlePersonage;
use crate::personage::PersonageId;

/// Final accounting for one duel participant
#[derive(Debug, Clone)]
pub struct CombatantStats {
    pub personage_id: PersonageId,
    pub remaining_health: i32,
    pub damage_dealt: i64,
    pub damage_blocked: i64,
}

impl From<BattlePersonage> for CombatantStats {
    fn from(personage: BattlePersonage) -> Self {
        Self {
            personage_id: personage.id(),
            remaining_health: personage.health(),
            damage_dealt: personage.damage_dealt(),
            damage_blocked: personage.damage_blocked(),
        }
    }
}

/// Outcome of a resolved duel, immutable once created
#[derive(Debug, Clone)]
pub struct DuelResult {
    pub winner: CombatantStats,
    pub loser: CombatantStats,
    pub rounds: u32,
    pub finished_at: DateTime<Utc>,
}

/// Resolve a duel between two snapshots; `first` attacks first
pub fn resolve<D: Dice>(
    mut first: BattlePersonage,
    mut second: BattlePersonage,
    dice: &mut D,
) -> DuelResult {
    let mut rounds = 0;
    loop {
        rounds += 1;
        first.deal_damage_to(&mut second, dice);
        if second.is_dead() {
            return finished(first, second, rounds);
        }
        second.deal_damage_to(&mut first, dice);
        if first.is_dead() {
            return finished(second, first, rounds);
        }
    }
}

fn finished(winner: BattlePersonage, loser: BattlePersonage, rounds: u32) -> DuelResult {
    DuelResult {
        winner: winner.into(),
        loser: loser.into(),
        rounds,
        finished_at: Utc::now(),
    }
}
