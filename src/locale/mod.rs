//! Localization module
//!
//! Languages known to the game and the text bundles rendered into chat
//! messages. Every user-facing string lives here or in the per-event
//! locale rows; game logic never formats chat text directly.

pub mod common;
pub mod duel;
pub mod raid;

use serde::{Deserialize, Serialize};

/// Languages a chat session can run in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ru,
}

impl Language {
    /// The language used when a text bundle has no entry for the requested one
    pub const DEFAULT: Language = Language::En;

    /// Two-letter code used in storage and chat commands
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ru => "ru",
        }
    }

    /// Parse a two-letter code, case-insensitive
    pub fn from_code(code: &str) -> Option<Language> {
        match code.to_lowercase().as_str() {
            "en" => Some(Language::En),
            "ru" => Some(Language::Ru),
            _ => None,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
