//! Raid and event participation chat texts

use super::Language;

pub fn raid_starts_prefix(language: Language) -> &'static str {
    match language {
        Language::En => "The raid departs in ",
        Language::Ru => "Рейд отправится через ",
    }
}

pub fn hours_short(language: Language) -> &'static str {
    match language {
        Language::En => "h",
        Language::Ru => "ч",
    }
}

pub fn minutes_short(language: Language) -> &'static str {
    match language {
        Language::En => "m",
        Language::Ru => "мин",
    }
}

pub fn join_success(language: Language) -> &'static str {
    match language {
        Language::En => "You join the raid party. Sharpen your blade!",
        Language::Ru => "Ты присоединяешься к отряду. Точи клинок!",
    }
}

pub fn event_not_exist(language: Language) -> &'static str {
    match language {
        Language::En => "There is no such event.",
        Language::Ru => "Такого события нет.",
    }
}

pub fn expired_event(language: Language) -> &'static str {
    match language {
        Language::En => "Too late, the party has already departed.",
        Language::Ru => "Слишком поздно, отряд уже отправился.",
    }
}

pub fn personage_in_this_event(language: Language) -> &'static str {
    match language {
        Language::En => "You are already in this party.",
        Language::Ru => "Ты уже в этом отряде.",
    }
}

pub fn personage_in_other_event(language: Language) -> &'static str {
    match language {
        Language::En => "You are already busy with another event.",
        Language::Ru => "Ты уже занят в другом событии.",
    }
}
