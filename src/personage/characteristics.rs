//! The five base characteristics and values derived from them

use serde::{Deserialize, Serialize};

/// Starting attack for a fresh personage
pub const DEFAULT_ATTACK: i32 = 20;

/// Starting defense for a fresh personage
pub const DEFAULT_DEFENSE: i32 = 5;

/// Starting value for strength, agility and wisdom
pub const DEFAULT_STAT: i32 = 5;

/// Leveling points a fresh personage can spend right away
pub const STARTING_LEVELING_POINTS: i32 = 5;

/// Health floor before the strength contribution
const HEALTH_BASE: i32 = 90;

/// Extra max health per point of strength
const HEALTH_PER_STRENGTH: i32 = 2;

/// The base stats determining combat performance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Characteristics {
    pub attack: i32,
    pub defense: i32,
    pub strength: i32,
    pub agility: i32,
    pub wisdom: i32,
}

impl Characteristics {
    /// Characteristics of a freshly created personage
    pub fn default_start() -> Self {
        Self {
            attack: DEFAULT_ATTACK,
            defense: DEFAULT_DEFENSE,
            strength: DEFAULT_STAT,
            agility: DEFAULT_STAT,
            wisdom: DEFAULT_STAT,
        }
    }

    /// Maximum health derived from the characteristics
    pub fn max_health(&self) -> i32 {
        HEALTH_BASE + self.strength * HEALTH_PER_STRENGTH
    }

    /// Leveling points sunk into this set beyond the starting values
    pub fn spent_leveling_points(&self) -> i32 {
        let start = Self::default_start();
        (self.strength - start.strength)
            + (self.agility - start.agility)
            + (self.wisdom - start.wisdom)
    }

    pub fn with_incremented(mut self, kind: CharacteristicKind) -> Self {
        match kind {
            CharacteristicKind::Strength => self.strength += 1,
            CharacteristicKind::Agility => self.agility += 1,
            CharacteristicKind::Wisdom => self.wisdom += 1,
        }
        self
    }
}

/// Characteristics a personage can level up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacteristicKind {
    Strength,
    Agility,
    Wisdom,
}

impl CharacteristicKind {
    /// Parse from chat text, case-insensitive
    pub fn from_str(s: &str) -> Option<CharacteristicKind> {
        match s.to_lowercase().as_str() {
            "strength" | "str" => Some(CharacteristicKind::Strength),
            "agility" | "agi" => Some(CharacteristicKind::Agility),
            "wisdom" | "wis" => Some(CharacteristicKind::Wisdom),
            _ => None,
        }
    }
}
