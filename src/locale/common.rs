//! Common chat texts: greetings, profile, command errors

use super::Language;
use crate::personage::Personage;

pub fn welcome(language: Language) -> &'static str {
    match language {
        Language::En => {
            "Welcome to the tavern, wanderer! Type /help to see what you can do here."
        }
        Language::Ru => {
            "Добро пожаловать в таверну, путник! Отправь /help, чтобы узнать, что здесь можно делать."
        }
    }
}

pub fn help(language: Language) -> &'static str {
    match language {
        Language::En => {
            "Commands:\n\
             /profile - show your personage\n\
             /name <new name> - change your name\n\
             /levelup <strength|agility|wisdom> - spend a leveling point\n\
             /reset - reset characteristics for a price\n\
             /duel <name> - challenge a personage\n\
             /accept <duel id> - accept a duel\n\
             /decline <duel id> - decline a duel\n\
             /join <event id> - join a launched event\n\
             /language <en|ru> - switch language"
        }
        Language::Ru => {
            "Команды:\n\
             /profile - профиль персонажа\n\
             /name <новое имя> - сменить имя\n\
             /levelup <strength|agility|wisdom> - потратить очко прокачки\n\
             /reset - сбросить характеристики за плату\n\
             /duel <имя> - вызвать персонажа на дуэль\n\
             /accept <id дуэли> - принять дуэль\n\
             /decline <id дуэли> - отклонить дуэль\n\
             /join <id события> - присоединиться к событию\n\
             /language <en|ru> - сменить язык"
        }
    }
}

pub fn profile(language: Language, personage: &Personage) -> String {
    let ch = &personage.characteristics;
    match language {
        Language::En => format!(
            "{}\nHealth: {}/{}\nMoney: {}\nAttack: {}\nDefense: {}\nStrength: {}\nAgility: {}\nWisdom: {}\nLeveling points: {}",
            personage.name,
            personage.health,
            ch.max_health(),
            personage.money,
            ch.attack,
            ch.defense,
            ch.strength,
            ch.agility,
            ch.wisdom,
            personage.leveling_points,
        ),
        Language::Ru => format!(
            "{}\nЗдоровье: {}/{}\nДеньги: {}\nАтака: {}\nЗащита: {}\nСила: {}\nЛовкость: {}\nМудрость: {}\nОчки прокачки: {}",
            personage.name,
            personage.health,
            ch.max_health(),
            personage.money,
            ch.attack,
            ch.defense,
            ch.strength,
            ch.agility,
            ch.wisdom,
            personage.leveling_points,
        ),
    }
}

pub fn login_first(language: Language) -> &'static str {
    match language {
        Language::En => "Introduce yourself first: send {\"type\":\"login\",\"name\":\"...\"}.",
        Language::Ru => "Сначала представься: отправь {\"type\":\"login\",\"name\":\"...\"}.",
    }
}

pub fn unknown_command(language: Language) -> &'static str {
    match language {
        Language::En => "I don't know such a command. Type /help for the list.",
        Language::Ru => "Я не знаю такой команды. Отправь /help, чтобы увидеть список.",
    }
}

pub fn internal_error(language: Language) -> &'static str {
    match language {
        Language::En => "Something went wrong. Try again later.",
        Language::Ru => "Что-то пошло не так. Попробуй позже.",
    }
}

pub fn personage_not_found(language: Language, name: &str) -> String {
    match language {
        Language::En => format!("There is no personage named {} here.", name),
        Language::Ru => format!("Здесь нет персонажа по имени {}.", name),
    }
}

pub fn name_changed(language: Language, name: &str) -> String {
    match language {
        Language::En => format!("From now on you are known as {}.", name),
        Language::Ru => format!("Теперь тебя зовут {}.", name),
    }
}

pub fn invalid_name(language: Language) -> &'static str {
    match language {
        Language::En => "A name must be 2-25 letters, digits, spaces or hyphens.",
        Language::Ru => "Имя должно состоять из 2-25 букв, цифр, пробелов или дефисов.",
    }
}

pub fn characteristic_increased(language: Language) -> &'static str {
    match language {
        Language::En => "You feel stronger. Check /profile.",
        Language::Ru => "Ты чувствуешь прилив сил. Загляни в /profile.",
    }
}

pub fn not_enough_leveling_points(language: Language) -> &'static str {
    match language {
        Language::En => "You have no leveling points to spend.",
        Language::Ru => "У тебя нет очков прокачки.",
    }
}

pub fn not_enough_money(language: Language, price: i64) -> String {
    match language {
        Language::En => format!("Not enough money, you need {}.", price),
        Language::Ru => format!("Не хватает денег, нужно {}.", price),
    }
}

pub fn stats_reset(language: Language) -> &'static str {
    match language {
        Language::En => "Your characteristics are back to the starting values.",
        Language::Ru => "Твои характеристики возвращены к начальным значениям.",
    }
}

pub fn language_changed(language: Language) -> &'static str {
    match language {
        Language::En => "Language switched to English.",
        Language::Ru => "Язык переключён на русский.",
    }
}
