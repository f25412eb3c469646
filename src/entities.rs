// SPDX-License-Identifier: GPL-3.0-only

use std::fmt::Debug;

use bytecheck::CheckBytes;
use rkyv::{Archive, Deserialize, Serialize};

use crate::utils::PokeError;

/// Everything the SDK knows about a single Pokémon.
///
/// This is both the unit stored in the disk cache (rkyv) and the `pokemon`
/// object of the JSON envelope returned over the FFI (serde).
#[derive(Archive, CheckBytes, Serialize, Deserialize, Clone, serde::Serialize, serde::Deserialize)]
#[rkyv(derive(Debug))]
pub struct PokemonRecord {
    #[serde(flatten)]
    pub pokemon: PokemonData,
    pub specie: Option<PokemonSpecie>,
    pub sprites: PokemonSprites,
    pub encounter_info: Option<Vec<PokemonEncounterInfo>>,
}

impl Debug for PokemonRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PokemonRecord")
            .field("pokemon", &self.pokemon.id)
            .finish()
    }
}

impl PokemonRecord {
    /// Returns the total value of all the stats of the Pokémon
    pub fn total_stats(&self) -> i64 {
        self.pokemon.stats.hp
            + self.pokemon.stats.attack
            + self.pokemon.stats.defense
            + self.pokemon.stats.sp_attack
            + self.pokemon.stats.sp_defense
            + self.pokemon.stats.speed
    }
}

/// Core Pokémon data
#[derive(Archive, CheckBytes, Serialize, Deserialize, Clone, serde::Serialize, serde::Deserialize)]
#[rkyv(derive(Debug))]
pub struct PokemonData {
    pub id: i64,
    pub name: String,
    pub weight: i64,
    pub height: i64,
    pub types: Vec<String>,
    pub abilities: Vec<String>,
    pub stats: PokemonStats,
}

impl Debug for PokemonData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PokemonData").field("id", &self.id).finish()
    }
}

/// Pokémon statistics
#[derive(Archive, CheckBytes, Serialize, Deserialize, Clone, Debug, serde::Serialize, serde::Deserialize)]
#[rkyv(derive(Debug))]
pub struct PokemonStats {
    pub hp: i64,
    pub attack: i64,
    pub defense: i64,
    pub sp_attack: i64,
    pub sp_defense: i64,
    pub speed: i64,
}

/// Sprite URLs as published by PokéApi, either side may be missing
#[derive(Archive, CheckBytes, Serialize, Deserialize, Clone, Debug, serde::Serialize, serde::Deserialize)]
#[rkyv(derive(Debug))]
pub struct PokemonSprites {
    pub front_default: Option<String>,
    pub back_default: Option<String>,
}

/// Species level information, absent when the species lookup fails
#[derive(Archive, CheckBytes, Serialize, Deserialize, Clone, Debug, serde::Serialize, serde::Deserialize)]
#[rkyv(derive(Debug))]
pub struct PokemonSpecie {
    pub flavor_text: Option<String>,
    pub generation: PokemonGeneration,
}

#[derive(
    Archive,
    CheckBytes,
    Serialize,
    Deserialize,
    Clone,
    Debug,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
)]
#[rkyv(derive(Debug))]
#[repr(u8)]
pub enum PokemonGeneration {
    Unknown,
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
}

impl PokemonGeneration {
    /// Parses a PokéApi generation name into the matching variant
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "generation-i" => PokemonGeneration::One,
            "generation-ii" => PokemonGeneration::Two,
            "generation-iii" => PokemonGeneration::Three,
            "generation-iv" => PokemonGeneration::Four,
            "generation-v" => PokemonGeneration::Five,
            "generation-vi" => PokemonGeneration::Six,
            "generation-vii" => PokemonGeneration::Seven,
            "generation-viii" => PokemonGeneration::Eight,
            "generation-ix" => PokemonGeneration::Nine,
            _ => PokemonGeneration::Unknown,
        }
    }
}

/// Pokémon encounter information
#[derive(Archive, CheckBytes, Serialize, Deserialize, Clone, Debug, serde::Serialize, serde::Deserialize)]
#[rkyv(derive(Debug))]
pub struct PokemonEncounterInfo {
    pub location: String,
    pub version_methods: Vec<String>,
}

/// The envelope every FFI fetch resolves to, serialized as
/// `{"success": bool, "pokemon": object|null, "error": string|null}`.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct FetchOutcome {
    pub success: bool,
    pub pokemon: Option<PokemonRecord>,
    pub error: Option<String>,
}

impl FetchOutcome {
    pub fn from_result(result: Result<PokemonRecord, PokeError>) -> Self {
        match result {
            Ok(record) => FetchOutcome {
                success: true,
                pokemon: Some(record),
                error: None,
            },
            Err(err) => FetchOutcome::failure(err.to_string()),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        FetchOutcome {
            success: false,
            pokemon: None,
            error: Some(message.into()),
        }
    }

    /// Serializes the envelope, falling back to a fixed error payload so the
    /// FFI always has valid JSON to hand out.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"success":false,"pokemon":null,"error":"Failed to serialize result"}"#.to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> PokemonRecord {
        PokemonRecord {
            pokemon: PokemonData {
                id: 25,
                name: "pikachu".to_string(),
                weight: 60,
                height: 4,
                types: vec!["electric".to_string()],
                abilities: vec!["static".to_string(), "lightning-rod (HIDDEN)".to_string()],
                stats: PokemonStats {
                    hp: 35,
                    attack: 55,
                    defense: 40,
                    sp_attack: 50,
                    sp_defense: 50,
                    speed: 90,
                },
            },
            specie: Some(PokemonSpecie {
                flavor_text: Some("It stores electricity in its cheeks.".to_string()),
                generation: PokemonGeneration::One,
            }),
            sprites: PokemonSprites {
                front_default: Some("https://example.com/25_front.png".to_string()),
                back_default: None,
            },
            encounter_info: Some(vec![PokemonEncounterInfo {
                location: "Viridian Forest".to_string(),
                version_methods: vec!["Yellow: Walk".to_string()],
            }]),
        }
    }

    #[test]
    fn record_serializes_with_flattened_core_data() {
        let value = serde_json::to_value(sample_record()).unwrap();

        assert_eq!(value["id"], 25);
        assert_eq!(value["name"], "pikachu");
        assert_eq!(value["stats"]["speed"], 90);
        assert_eq!(value["sprites"]["back_default"], serde_json::Value::Null);
        assert_eq!(value["specie"]["generation"], "One");
    }

    #[test]
    fn total_stats_sums_every_stat() {
        assert_eq!(sample_record().total_stats(), 320);
    }

    #[test]
    fn generation_parses_known_and_unknown_names() {
        assert_eq!(
            PokemonGeneration::from_name("generation-iv"),
            PokemonGeneration::Four
        );
        assert_eq!(
            PokemonGeneration::from_name("Generation-IX"),
            PokemonGeneration::Nine
        );
        assert_eq!(
            PokemonGeneration::from_name("generation-xx"),
            PokemonGeneration::Unknown
        );
    }

    #[test]
    fn success_envelope_carries_the_record() {
        let outcome = FetchOutcome::from_result(Ok(sample_record()));
        let value = serde_json::to_value(&outcome).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["error"], serde_json::Value::Null);
        assert_eq!(value["pokemon"]["id"], 25);
    }

    #[test]
    fn failure_envelope_has_no_record() {
        let outcome = FetchOutcome::failure("boom");
        let json = outcome.to_json_string();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["pokemon"], serde_json::Value::Null);
        assert_eq!(value["error"], "boom");
    }
}
