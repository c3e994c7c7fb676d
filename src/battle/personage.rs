//! Combatant snapshot and the single-attack calculator
//!
//! A `BattlePersonage` is a per-duel copy of a personage's fighting
//! stats. The persistent record is never touched during a battle; the
//! caller applies consequences once the result is final.

use tracing::debug;

use super::dice::Dice;
use crate::personage::{Characteristics, PersonageId};

/// Multiplier on strength when building the attack value
const STRENGTH_MULTIPLIER: f64 = 1.1;

/// Multiplier on the defender's defense when reducing the attack value
const DEFENSE_MULTIPLIER: f64 = 0.7;

/// Attack never drops below this share of the raw attack characteristic
const MIN_ATTACK_PERCENT: f64 = 0.1;

/// Attack floor; a positive minimum keeps every duel finite
const MIN_ATTACK: f64 = 1.0;

/// Crit chance before the wisdom contribution, percent
const BASE_CRIT_CHANCE: f64 = 10.0;

/// Crit chance cap, percent
const MAX_CRIT_CHANCE: f64 = 90.0;

/// Crit chance gained per point of wisdom
const WISDOM_CRIT_CHANCE_MULTIPLIER: f64 = 2.0;

/// Damage multiplier on a successful crit before the wisdom bonus
const BASE_CRIT_MULTIPLIER: f64 = 2.0;

/// Share of the enemy's agility subtracted from wisdom in the crit bonus
const AGILITY_CRIT_MULTIPLIER: f64 = 0.4;

/// Crit bonus gained per effective point of wisdom
const WISDOM_CRIT_MULTIPLIER: f64 = 0.04;

/// Dodge chance before the agility contribution, percent
const BASE_DODGE_CHANCE: f64 = 10.0;

/// Dodge chance cap, percent
const MAX_DODGE_CHANCE: f64 = 90.0;

/// Dodge chance gained per point of agility
const AGILITY_DODGE_CHANCE_MULTIPLIER: f64 = 1.6;

/// Immutable copy of the characteristics captured at snapshot creation
#[derive(Debug, Clone, Copy)]
struct BattleCharacteristics {
    attack: i32,
    defense: i32,
    strength: i32,
    agility: i32,
    wisdom: i32,
}

impl From<&Characteristics> for BattleCharacteristics {
    fn from(characteristics: &Characteristics) -> Self {
        Self {
            attack: characteristics.attack,
            defense: characteristics.defense,
            strength: characteristics.strength,
            agility: characteristics.agility,
            wisdom: characteristics.wisdom,
        }
    }
}

/// A personage's combat state for the duration of one duel
#[derive(Debug, Clone)]
pub struct BattlePersonage {
    id: PersonageId,
    health: i32,
    damage_dealt: i64,
    damage_blocked: i64,
    characteristics: BattleCharacteristics,
}

impl BattlePersonage {
    /// Snapshot a personage entering a duel with its current health
    pub fn new(id: PersonageId, characteristics: &Characteristics, health: i32) -> Self {
        Self {
            id,
            health: health.max(0),
            damage_dealt: 0,
            damage_blocked: 0,
            characteristics: characteristics.into(),
        }
    }

    pub fn id(&self) -> PersonageId {
        self.id
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Total damage this snapshot has landed on enemies
    pub fn damage_dealt(&self) -> i64 {
        self.damage_dealt
    }

    /// Total attack value thrown at this snapshot, dodged or not
    pub fn damage_blocked(&self) -> i64 {
        self.damage_blocked
    }

    /// Compute and apply one directed attack against `enemy`
    pub fn deal_damage_to<D: Dice>(&mut self, enemy: &mut BattlePersonage, dice: &mut D) {
        let ch = &self.characteristics;
        let mut attack = f64::from(ch.attack) + f64::from(ch.strength) * STRENGTH_MULTIPLIER
            - f64::from(enemy.characteristics.defense) * DEFENSE_MULTIPLIER;
        attack = attack.max(self.min_attack());
        attack *= self.crit_bonus(enemy.characteristics.agility, dice);
        let attack = attack.floor() as i32;
        self.damage_dealt += i64::from(enemy.take_damage(attack, self.id, dice));
    }

    /// Absorb an incoming attack; returns the damage actually dealt
    fn take_damage<D: Dice>(&mut self, attack: i32, enemy: PersonageId, dice: &mut D) -> i32 {
        if self.is_dead() {
            return 0;
        }
        self.damage_blocked += i64::from(attack);
        if self.is_dodge(dice) {
            debug!("Personage {} missed {}", enemy, self.id);
            return 0;
        }
        let dealt = attack.min(self.health);
        self.health -= dealt;
        debug!("Personage {} attacked {} by {} damage", enemy, self.id, dealt);
        dealt
    }

    fn is_dodge<D: Dice>(&self, dice: &mut D) -> bool {
        let dodge_chance = (BASE_DODGE_CHANCE
            + f64::from(self.characteristics.agility) * AGILITY_DODGE_CHANCE_MULTIPLIER)
            .min(MAX_DODGE_CHANCE);
        f64::from(dice.roll_percent()) <= dodge_chance
    }

    fn crit_bonus<D: Dice>(&self, enemy_agility: i32, dice: &mut D) -> f64 {
        let wisdom = f64::from(self.characteristics.wisdom);
        let crit_chance =
            (BASE_CRIT_CHANCE + wisdom * WISDOM_CRIT_CHANCE_MULTIPLIER).min(MAX_CRIT_CHANCE);
        if f64::from(dice.roll_percent()) <= crit_chance {
            BASE_CRIT_MULTIPLIER
                + (wisdom - f64::from(enemy_agility) * AGILITY_CRIT_MULTIPLIER).max(0.0)
                    * WISDOM_CRIT_MULTIPLIER
        } else {
            1.0
        }
    }

    fn min_attack(&self) -> f64 {
        (f64::from(self.characteristics.attack) * MIN_ATTACK_PERCENT).max(MIN_ATTACK)
    }
}
