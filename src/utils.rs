// SPDX-License-Identifier: GPL-3.0-only

use std::fmt;

use crate::entities::PokemonStats;

/// Errors surfaced by the SDK core. The FFI layer folds these into the JSON
/// envelope instead of exposing them as codes.
#[derive(Debug)]
pub enum PokeError {
    InvalidId(i64),
    InvalidName(String),
    Api(rustemon::error::Error),
    CacheMissing,
    Io(std::io::Error),
    CacheFormat(rkyv::rancor::Error),
    Json(serde_json::Error),
    Task(tokio::task::JoinError),
}

impl fmt::Display for PokeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PokeError::InvalidId(id) => {
                write!(f, "Invalid Pokémon id {id}, PokéApi ids start at 1")
            }
            PokeError::InvalidName(name) => write!(f, "Invalid Pokémon name {name:?}"),
            PokeError::Api(err) => err.fmt(f),
            PokeError::CacheMissing => write!(f, "No Pokémon cache file found"),
            PokeError::Io(err) => err.fmt(f),
            PokeError::CacheFormat(err) => {
                write!(f, "The Pokémon cache file could not be read: {err}")
            }
            PokeError::Json(err) => err.fmt(f),
            PokeError::Task(err) => write!(f, "A background task failed: {err}"),
        }
    }
}

impl std::error::Error for PokeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PokeError::Api(err) => Some(err),
            PokeError::Io(err) => Some(err),
            PokeError::CacheFormat(err) => Some(err),
            PokeError::Json(err) => Some(err),
            PokeError::Task(err) => Some(err),
            PokeError::InvalidId(_) | PokeError::InvalidName(_) | PokeError::CacheMissing => None,
        }
    }
}

impl From<rustemon::error::Error> for PokeError {
    fn from(err: rustemon::error::Error) -> Self {
        PokeError::Api(err)
    }
}

impl From<std::io::Error> for PokeError {
    fn from(err: std::io::Error) -> Self {
        PokeError::Io(err)
    }
}

impl From<rkyv::rancor::Error> for PokeError {
    fn from(err: rkyv::rancor::Error) -> Self {
        PokeError::CacheFormat(err)
    }
}

impl From<serde_json::Error> for PokeError {
    fn from(err: serde_json::Error) -> Self {
        PokeError::Json(err)
    }
}

impl From<tokio::task::JoinError> for PokeError {
    fn from(err: tokio::task::JoinError) -> Self {
        PokeError::Task(err)
    }
}

/// Transforms a kebab-case string into a space-separated string where each word starts with an uppercase letter.
pub fn capitalize_string(input: &str) -> String {
    input
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Helper to scale some data from PokeApi such as weight...
/// scales a number down by dividing it by 10, converting it to a floating-point
pub fn scale_numbers(num: i64) -> f64 {
    (num as f64) / 10.0
}

/// PokéApi flavor texts embed form feeds and hard line breaks, scrub them down
/// to single-spaced prose.
pub fn clean_flavor_text(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Parses the PokéApi stat list into the SDK stats block
pub fn parse_pokemon_stats(stats: &[rustemon::model::pokemon::PokemonStat]) -> PokemonStats {
    let mut parsed = PokemonStats {
        hp: 0,
        attack: 0,
        defense: 0,
        sp_attack: 0,
        sp_defense: 0,
        speed: 0,
    };

    for stat in stats {
        match stat.stat.name.as_str() {
            "hp" => parsed.hp = stat.base_stat,
            "attack" => parsed.attack = stat.base_stat,
            "defense" => parsed.defense = stat.base_stat,
            "special-attack" => parsed.sp_attack = stat.base_stat,
            "special-defense" => parsed.sp_defense = stat.base_stat,
            "speed" => parsed.speed = stat.base_stat,
            _ => {} // Ignore any unknown stats
        }
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalizes_kebab_case_names() {
        assert_eq!(capitalize_string("viridian-forest"), "Viridian Forest");
        assert_eq!(capitalize_string("walk"), "Walk");
        assert_eq!(capitalize_string(""), "");
    }

    #[test]
    fn scales_decimetres_and_hectograms() {
        assert_eq!(scale_numbers(4), 0.4);
        assert_eq!(scale_numbers(60), 6.0);
    }

    #[test]
    fn scrubs_control_characters_from_flavor_text() {
        let raw = "When several of\nthese POKéMON\u{0c}gather, their\nelectricity could.";
        assert_eq!(
            clean_flavor_text(raw),
            "When several of these POKéMON gather, their electricity could."
        );
    }

    #[test]
    fn parses_known_stats_and_ignores_the_rest() {
        let mut speed = rustemon::model::pokemon::PokemonStat::default();
        speed.stat.name = "speed".to_string();
        speed.base_stat = 90;

        let mut hp = rustemon::model::pokemon::PokemonStat::default();
        hp.stat.name = "hp".to_string();
        hp.base_stat = 35;

        let mut bogus = rustemon::model::pokemon::PokemonStat::default();
        bogus.stat.name = "luck".to_string();
        bogus.base_stat = 999;

        let parsed = parse_pokemon_stats(&[speed, hp, bogus]);
        assert_eq!(parsed.speed, 90);
        assert_eq!(parsed.hp, 35);
        assert_eq!(parsed.attack, 0);
    }

    #[test]
    fn invalid_id_error_mentions_the_id() {
        let message = PokeError::InvalidId(0).to_string();
        assert!(message.contains('0'));
    }
}
