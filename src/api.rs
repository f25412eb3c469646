// SPDX-License-Identifier: GPL-3.0-only

use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
    time::Duration,
};

use anywho::{Error, anywho};
use futures_util::StreamExt;
use rustemon::client::{
    CacheMode, CacheOptions, MokaManager, RustemonClient, RustemonClientBuilder,
};
use rustemon::model::pokemon::{Pokemon, PokemonSpecies};
use tokio::sync::Semaphore;

use crate::entities::{
    PokemonData, PokemonEncounterInfo, PokemonGeneration, PokemonRecord, PokemonSpecie,
    PokemonSprites,
};
use crate::utils::{PokeError, capitalize_string, clean_flavor_text, parse_pokemon_stats};

/// PokéApi client. HTTP-level caching stays off, the SDK keeps its own disk
/// cache in front of it.
#[derive(Debug, Clone)]
pub struct PokeApi {
    client: Arc<RustemonClient>,
}

impl Default for PokeApi {
    fn default() -> Self {
        Self {
            client: Arc::new(
                RustemonClientBuilder::default()
                    .with_manager(MokaManager::default())
                    .with_mode(CacheMode::NoStore)
                    .with_options(CacheOptions {
                        shared: true,
                        cache_heuristic: 0.1,
                        immutable_min_time_to_live: Duration::from_secs(3600),
                        ignore_cargo_cult: true,
                    })
                    .try_build()
                    .unwrap(),
            ),
        }
    }
}

impl PokeApi {
    /// Fetches a single Pokémon by its PokéApi id and assembles the SDK record.
    pub async fn fetch_by_id(&self, id: i64) -> Result<PokemonRecord, PokeError> {
        let pokemon = rustemon::pokemon::pokemon::get_by_id(id, &self.client).await?;
        self.complete_record(pokemon).await
    }

    /// Fetches a single Pokémon by its PokéApi name and assembles the SDK record.
    pub async fn fetch_by_name(&self, name: &str) -> Result<PokemonRecord, PokeError> {
        let pokemon = rustemon::pokemon::pokemon::get_by_name(name, &self.client).await?;
        self.complete_record(pokemon).await
    }

    /// Fetches the details of every Pokémon in PokéApi, keyed by id. Entries
    /// that fail are skipped so one broken resource never sinks a warm pass.
    pub async fn fetch_all(&self) -> BTreeMap<i64, PokemonRecord> {
        let all_entries = rustemon::pokemon::pokemon::get_all_entries(&self.client)
            .await
            .unwrap_or_default();

        let semaphore = Arc::new(Semaphore::new(30));

        let record_stream = futures_util::stream::iter(all_entries)
            .map(|entry| {
                let api = self.clone();
                let sem = Arc::clone(&semaphore);
                async move {
                    let _permit = sem.acquire().await.unwrap();
                    api.fetch_by_name(&entry.name).await
                }
            })
            .buffer_unordered(30);

        record_stream
            .collect::<Vec<Result<PokemonRecord, PokeError>>>()
            .await
            .into_iter()
            .filter_map(|fetched| match fetched {
                Ok(record) => Some((record.pokemon.id, record)),
                Err(err) => {
                    eprintln!("Skipping entry: {err}");
                    None
                }
            })
            .collect()
    }

    /// Pulls the encounter and species data for an already fetched Pokémon and
    /// folds everything into a [`PokemonRecord`]. A failed species lookup is
    /// tolerated, some forms have no species entry under their own name.
    async fn complete_record(&self, pokemon: Pokemon) -> Result<PokemonRecord, PokeError> {
        let encounters =
            rustemon::pokemon::pokemon::encounters::get_by_id(pokemon.id, &self.client).await?;

        let specie_info =
            rustemon::pokemon::pokemon_species::get_by_name(&pokemon.name, &self.client).await;

        let sprites = PokemonSprites {
            front_default: pokemon.sprites.front_default.clone(),
            back_default: pokemon.sprites.back_default.clone(),
        };

        let encounter_info: Vec<PokemonEncounterInfo> = encounters
            .iter()
            .map(|ef| PokemonEncounterInfo {
                location: capitalize_string(&ef.location_area.name),
                version_methods: ef
                    .version_details
                    .iter()
                    .map(|vd| {
                        // Remove repeated methods
                        let unique_methods: HashSet<String> = vd
                            .encounter_details
                            .iter()
                            .map(|ed| capitalize_string(&ed.method.name))
                            .collect();

                        format!(
                            "{}: {}",
                            capitalize_string(&vd.version.name),
                            unique_methods
                                .into_iter()
                                .collect::<Vec<String>>()
                                .join(", ")
                        )
                    })
                    .collect(),
            })
            .collect();

        let specie = specie_info.ok().map(|specie_info| PokemonSpecie {
            flavor_text: english_flavor_text(&specie_info).ok(),
            generation: PokemonGeneration::from_name(&specie_info.generation.name),
        });

        let data = PokemonData {
            id: pokemon.id,
            name: pokemon.name,
            weight: pokemon.weight,
            height: pokemon.height,
            types: pokemon
                .types
                .iter()
                .map(|types| types.type_.name.to_string())
                .collect(),
            abilities: pokemon
                .abilities
                .iter()
                .map(|a| {
                    if a.is_hidden {
                        format!("{} (HIDDEN)", a.ability.name)
                    } else {
                        a.ability.name.clone()
                    }
                })
                .collect(),
            stats: parse_pokemon_stats(&pokemon.stats),
        };

        Ok(PokemonRecord {
            pokemon: data,
            specie,
            sprites,
            encounter_info: Some(encounter_info),
        })
    }
}

/// Picks the first english flavor text of a species and scrubs it.
fn english_flavor_text(specie: &PokemonSpecies) -> Result<String, Error> {
    let entry = specie
        .flavor_text_entries
        .iter()
        .find(|x| x.language.name == "en")
        .ok_or_else(|| anywho!("No english flavor text entry"))?;

    Ok(clean_flavor_text(&entry.flavor_text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_flavor_text_is_picked_and_scrubbed() {
        let mut specie = PokemonSpecies::default();

        specie.flavor_text_entries.push(Default::default());
        specie.flavor_text_entries[0].language.name = "ja".to_string();
        specie.flavor_text_entries[0].flavor_text = "ほのおポケモン".to_string();

        specie.flavor_text_entries.push(Default::default());
        specie.flavor_text_entries[1].language.name = "en".to_string();
        specie.flavor_text_entries[1].flavor_text =
            "Obviously prefers\nhot places.\u{0c}It blows out fire.".to_string();

        assert_eq!(
            english_flavor_text(&specie).unwrap(),
            "Obviously prefers hot places. It blows out fire."
        );
    }

    #[test]
    fn missing_english_flavor_text_is_an_error() {
        let specie = PokemonSpecies::default();
        assert!(english_flavor_text(&specie).is_err());
    }
}
