//! Personage module
//!
//! The persistent player-controlled character:
//! - Characteristics (attack, defense, strength, agility, wisdom)
//! - Passive health regeneration between operations
//! - Leveling, renaming and money
//! - Event participation with the single-active-event rule

mod characteristics;
mod service;

pub use characteristics::{
    CharacteristicKind, Characteristics, DEFAULT_ATTACK, DEFAULT_DEFENSE, DEFAULT_STAT,
    STARTING_LEVELING_POINTS,
};
pub use service::{JoinEventError, PersonageError, PersonageService};

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;

/// Personage identity
pub type PersonageId = i64;

/// Time to passively regenerate from zero to full health
const FULL_REGEN_MINUTES: i64 = 60;

/// Name given to a personage on creation, before the player picks one
pub const DEFAULT_NAME: &str = "Wanderer";

/// A player-controlled game character
#[derive(Debug, Clone)]
pub struct Personage {
    pub id: PersonageId,
    pub name: String,
    pub money: i64,
    pub leveling_points: i32,
    pub health: i32,
    pub last_health_change: DateTime<Utc>,
    pub characteristics: Characteristics,
}

impl Personage {
    /// Apply passive regeneration up to `now`.
    /// Returns true if health changed and the personage needs saving.
    pub fn regen_health(&mut self, now: DateTime<Utc>) -> bool {
        let max_health = self.characteristics.max_health();
        if self.health >= max_health {
            return false;
        }

        let elapsed_seconds = (now - self.last_health_change).num_seconds().max(0);
        let gained =
            (i64::from(max_health) * elapsed_seconds / (FULL_REGEN_MINUTES * 60)) as i32;
        if gained == 0 {
            return false;
        }

        self.health = (self.health + gained).min(max_health);
        self.last_health_change = now;
        true
    }
}

/// Check a player-proposed personage name
pub fn is_valid_name(name: &str) -> bool {
    static NAME_RE: OnceLock<Regex> = OnceLock::new();
    NAME_RE
        .get_or_init(|| Regex::new(r"^[\p{L}\p{N} -]{2,25}$").unwrap())
        .is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn personage_with_health(health: i32) -> Personage {
        Personage {
            id: 1,
            name: DEFAULT_NAME.to_string(),
            money: 0,
            leveling_points: 0,
            health,
            last_health_change: Utc::now(),
            characteristics: Characteristics::default_start(),
        }
    }

    #[test]
    fn test_regen_partial() {
        let mut personage = personage_with_health(50);
        let now = personage.last_health_change + Duration::minutes(30);

        assert!(personage.regen_health(now));
        // Half the regen window restores half of max health
        assert_eq!(personage.health, 100);
    }

    #[test]
    fn test_regen_caps_at_max() {
        let mut personage = personage_with_health(99);
        let now = personage.last_health_change + Duration::hours(10);

        assert!(personage.regen_health(now));
        assert_eq!(personage.health, 100);
    }

    #[test]
    fn test_regen_noop_at_full() {
        let mut personage = personage_with_health(100);
        let now = personage.last_health_change + Duration::hours(1);

        assert!(!personage.regen_health(now));
        assert_eq!(personage.health, 100);
    }

    #[test]
    fn test_regen_noop_when_no_time_passed() {
        let mut personage = personage_with_health(50);
        let now = personage.last_health_change;

        assert!(!personage.regen_health(now));
        assert_eq!(personage.health, 50);
    }

    #[test]
    fn test_name_validation() {
        assert!(is_valid_name("Wanderer"));
        assert!(is_valid_name("Боромир 2"));
        assert!(is_valid_name("Mary-Ann"));
        assert!(!is_valid_name("x"));
        assert!(!is_valid_name("a_very_long_name_that_never_ends"));
        assert!(!is_valid_name("bad!name"));
        assert!(!is_valid_name(""));
    }
}
