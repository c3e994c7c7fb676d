//! Event module
//!
//! Game activities personages can enroll in:
//! - `Event` - a reusable definition with recurrence, duration and texts
//! - `LaunchedEvent` - one time-bounded running instance
//! - Launcher - background task instantiating due definitions
//!
//! Enrollment itself is classified by
//! [`PersonageService::join_event`](crate::personage::PersonageService::join_event).

mod launcher;
mod service;

pub use launcher::EventLauncher;
pub use service::{EventService, LaunchedEventService};

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::locale::{raid, Language};

/// Event definition identity
pub type EventId = i64;

/// Launched event instance identity
pub type LaunchedEventId = i64;

/// The closed set of event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Raid,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Raid => "raid",
        }
    }

    pub fn from_str(s: &str) -> Option<EventType> {
        match s {
            "raid" => Some(EventType::Raid),
            _ => None,
        }
    }
}

/// Localized texts for one event in one language
#[derive(Debug, Clone, Deserialize)]
pub struct EventLocale {
    pub language: Language,
    pub intro: String,
    pub description: String,
}

/// A reusable event definition, read-only to the game core
#[derive(Debug, Clone)]
pub struct Event {
    pub id: EventId,
    pub period_seconds: i64,
    pub duration_seconds: i64,
    pub event_type: EventType,
    pub enabled: bool,
    pub locales: Vec<EventLocale>,
}

impl Event {
    /// Interval between launches
    pub fn period(&self) -> Duration {
        Duration::seconds(self.period_seconds)
    }

    /// Length of the activity window of one instance
    pub fn duration(&self) -> Duration {
        Duration::seconds(self.duration_seconds)
    }

    /// Chat announcement for a freshly launched instance
    pub fn to_start_message(
        &self,
        language: Language,
        end_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> String {
        // Seeded events always carry at least one locale
        let Some(locale) = self.locale_by_language_or_default(language) else {
            return format!("Event #{}", self.id);
        };
        match self.end_date_text(language, end_date, now) {
            Some(end_text) => {
                format!("{}\n\n{}\n\n{}", locale.intro, locale.description, end_text)
            }
            None => format!("{}\n\n{}", locale.intro, locale.description),
        }
    }

    fn end_date_text(
        &self,
        language: Language,
        end_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Option<String> {
        if end_date <= now {
            return None;
        }
        let diff = end_date - now;
        let mut hours = String::new();
        if diff.num_hours() > 0 {
            hours = format!("{} {}", diff.num_hours(), raid::hours_short(language));
        }
        let minutes_part = diff.num_minutes() % 60;
        let mut minutes = String::new();
        if minutes_part > 0 {
            minutes = format!("{} {}", minutes_part, raid::minutes_short(language));
        } else if diff.num_hours() == 0 {
            minutes = format!("1 {}", raid::minutes_short(language));
        }
        let prefix = match self.event_type {
            EventType::Raid => raid::raid_starts_prefix(language),
        };
        Some(format!("{}{} {}", prefix, hours, minutes))
    }

    fn locale_by_language_or_default(&self, language: Language) -> Option<&EventLocale> {
        self.locales
            .iter()
            .find(|locale| locale.language == language)
            .or_else(|| {
                self.locales
                    .iter()
                    .find(|locale| locale.language == Language::DEFAULT)
            })
            .or_else(|| self.locales.first())
    }
}

/// A new event definition ready to be stored (seed tool input)
#[derive(Debug, Clone, Deserialize)]
pub struct NewEvent {
    pub period_seconds: i64,
    pub duration_seconds: i64,
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub locales: Vec<EventLocale>,
}

fn default_enabled() -> bool {
    true
}

/// One running instance of an event
#[derive(Debug, Clone)]
pub struct LaunchedEvent {
    pub id: LaunchedEventId,
    pub event_id: EventId,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl LaunchedEvent {
    /// An instance is active while `now` falls inside its window
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.start_date <= now && now < self.end_date
    }
}
