//! Chat command module
//!
//! Parses chat text into the closed command set and executes commands
//! against the game services, rendering localized replies.

mod dispatcher;

pub use dispatcher::CommandDispatcher;

use crate::duel::DuelId;
use crate::event::LaunchedEventId;
use crate::locale::Language;
use crate::personage::CharacteristicKind;

/// The closed set of chat commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Profile,
    ChangeName { name: String },
    LevelUp { kind: CharacteristicKind },
    ResetStats,
    StartDuel { opponent: String },
    AcceptDuel { duel_id: DuelId },
    DeclineDuel { duel_id: DuelId },
    JoinEvent { launched_event_id: LaunchedEventId },
    ChangeLanguage { language: Language },
}

/// Parse one chat line into a command
///
/// Commands start with a slash; anything else is not a command.
pub fn parse(text: &str) -> Option<Command> {
    let text = text.trim();
    let (verb, args) = match text.split_once(char::is_whitespace) {
        Some((verb, args)) => (verb, args.trim()),
        None => (text, ""),
    };
    let verb = verb.strip_prefix('/')?;

    match verb.to_lowercase().as_str() {
        "start" => Some(Command::Start),
        "help" => Some(Command::Help),
        "profile" => Some(Command::Profile),
        "name" if !args.is_empty() => Some(Command::ChangeName {
            name: args.to_string(),
        }),
        "levelup" => CharacteristicKind::from_str(args).map(|kind| Command::LevelUp { kind }),
        "reset" => Some(Command::ResetStats),
        "duel" if !args.is_empty() => Some(Command::StartDuel {
            opponent: args.to_string(),
        }),
        "accept" => args.parse().ok().map(|duel_id| Command::AcceptDuel { duel_id }),
        "decline" => args
            .parse()
            .ok()
            .map(|duel_id| Command::DeclineDuel { duel_id }),
        "join" => args
            .parse()
            .ok()
            .map(|launched_event_id| Command::JoinEvent { launched_event_id }),
        "language" => Language::from_code(args).map(|language| Command::ChangeLanguage { language }),
        _ => None,
    }
}
