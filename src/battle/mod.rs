//! Battle system module
//!
//! Implements stat-driven duel combat:
//! - Attack value from attack/strength against defense, with a hard floor
//! - Critical hits scaling with wisdom against agility
//! - Dodges scaling with agility
//! - Mutual attrition accounting (damage dealt and blocked)
//! - A resolver alternating attacks until one side falls

mod dice;
mod duel;
mod personage;

pub use dice::{Dice, RandomDice, SequenceDice};
pub use duel::{resolve, CombatantStats, DuelResult};
pub use personage::BattlePersonage;
