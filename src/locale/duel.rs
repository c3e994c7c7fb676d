//! Duel chat texts

use super::Language;
use crate::battle::DuelResult;
use crate::duel::DuelId;

pub fn duel_proposed(language: Language, initiator: &str, opponent: &str, duel_id: DuelId) -> String {
    match language {
        Language::En => format!(
            "{} challenges {} to a duel! Accept with /accept {} or refuse with /decline {}.",
            initiator, opponent, duel_id, duel_id
        ),
        Language::Ru => format!(
            "{} вызывает {} на дуэль! Прими вызов командой /accept {} или откажись командой /decline {}.",
            initiator, opponent, duel_id, duel_id
        ),
    }
}

pub fn duel_with_self(language: Language) -> &'static str {
    match language {
        Language::En => "You cannot duel yourself.",
        Language::Ru => "Нельзя вызвать на дуэль самого себя.",
    }
}

pub fn duel_already_exists(language: Language) -> &'static str {
    match language {
        Language::En => "You already have a pending duel. Wait for an answer.",
        Language::Ru => "У тебя уже есть незавершённая дуэль. Дождись ответа.",
    }
}

pub fn not_duel_accepting_personage(language: Language) -> &'static str {
    match language {
        Language::En => "This duel is not for you to answer.",
        Language::Ru => "Отвечать на эту дуэль должен не ты.",
    }
}

pub fn duel_not_waiting(language: Language) -> &'static str {
    match language {
        Language::En => "This duel is already settled.",
        Language::Ru => "Эта дуэль уже разрешилась.",
    }
}

pub fn declined_duel(language: Language, initiator: &str) -> String {
    match language {
        Language::En => format!("The challenge from {} is declined.", initiator),
        Language::Ru => format!("Вызов от {} отклонён.", initiator),
    }
}

pub fn duel_result(language: Language, winner: &str, loser: &str, result: &DuelResult) -> String {
    match language {
        Language::En => format!(
            "{} defeats {} after {} rounds! Damage dealt: {} against {}.",
            winner,
            loser,
            result.rounds,
            result.winner.damage_dealt,
            result.loser.damage_dealt,
        ),
        Language::Ru => format!(
            "{} побеждает {} за {} раундов! Нанесено урона: {} против {}.",
            winner,
            loser,
            result.rounds,
            result.winner.damage_dealt,
            result.loser.damage_dealt,
        ),
    }
}
