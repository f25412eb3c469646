// SPDX-License-Identifier: GPL-3.0-only

use std::{
    collections::BTreeMap,
    fs::File,
    path::PathBuf,
    sync::{Mutex, OnceLock},
};

use memmap2::Mmap;

use crate::api::PokeApi;
use crate::entities::PokemonRecord;
use crate::utils::PokeError;

const APP_ID: &str = "dev.pokesdk.PokeSdk";

static POKE_CORE: OnceLock<PokeCore> = OnceLock::new();

/// Composition root of the SDK: the PokéApi client plus the cache in front of
/// it. The FFI surface and host applications share one instance.
pub struct PokeCore {
    api: PokeApi,
    cache: PokeCache,
}

impl PokeCore {
    /// The process-wide core. The first call loads whatever disk cache exists,
    /// an unreadable or missing cache file just means starting empty.
    pub fn global() -> &'static PokeCore {
        POKE_CORE.get_or_init(|| {
            let cache = PokeCache::at_default_location();
            if let Err(err) = cache.load() {
                if !matches!(err, PokeError::CacheMissing) {
                    eprintln!("Discarding unreadable Pokémon cache: {err}");
                }
            }

            PokeCore {
                api: PokeApi::default(),
                cache,
            }
        })
    }

    /// Cache-first lookup by PokéApi id. A network hit is inserted into the
    /// cache and persisted before returning.
    pub async fn pokemon_by_id(&self, id: i64) -> Result<PokemonRecord, PokeError> {
        if id <= 0 {
            return Err(PokeError::InvalidId(id));
        }

        if let Some(record) = self.cache.get(id) {
            return Ok(record);
        }

        let record = self.api.fetch_by_id(id).await?;
        self.remember(record.clone()).await;
        Ok(record)
    }

    /// Cache-first lookup by PokéApi name. Input is trimmed and lowercased to
    /// match the API's slugs.
    pub async fn pokemon_by_name(&self, name: &str) -> Result<PokemonRecord, PokeError> {
        let slug = name.trim().to_lowercase();
        if slug.is_empty() {
            return Err(PokeError::InvalidName(name.to_string()));
        }

        if let Some(record) = self.cache.get_by_name(&slug) {
            return Ok(record);
        }

        let record = self.api.fetch_by_name(&slug).await?;
        self.remember(record.clone()).await;
        Ok(record)
    }

    /// Prefetches the whole dex into the cache. Returns the fetched records so
    /// callers can post-process them.
    pub async fn warm(&self) -> BTreeMap<i64, PokemonRecord> {
        let records = self.api.fetch_all().await;

        for record in records.values() {
            self.cache.insert(record.clone());
        }
        if let Err(err) = self.cache.persist().await {
            eprintln!("Failed to persist the Pokémon cache: {err}");
        }

        records
    }

    /// Snapshot of everything currently cached.
    pub fn cached_records(&self) -> Vec<PokemonRecord> {
        self.cache.records()
    }

    async fn remember(&self, record: PokemonRecord) {
        self.cache.insert(record);
        if let Err(err) = self.cache.persist().await {
            eprintln!("Failed to persist the Pokémon cache: {err}");
        }
    }
}

/// In-memory map of records backed by a single rkyv snapshot file.
struct PokeCache {
    entries: Mutex<BTreeMap<i64, PokemonRecord>>,
    path: PathBuf,
}

impl PokeCache {
    fn at_default_location() -> Self {
        let cache_dir = dirs::data_dir()
            .expect("No platform data directory available")
            .join(APP_ID);

        if !cache_dir.exists() {
            std::fs::create_dir_all(&cache_dir).expect("Failed to create the cache path");
        }

        Self::at(cache_dir.join("pokemon_cache.bin"))
    }

    fn at(path: PathBuf) -> Self {
        PokeCache {
            entries: Mutex::new(BTreeMap::new()),
            path,
        }
    }

    /// Maps the snapshot file and merges its records into memory.
    fn load(&self) -> Result<(), PokeError> {
        if !self.path.exists() {
            return Err(PokeError::CacheMissing);
        }

        let file = File::open(&self.path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        let archived = rkyv::access::<
            rkyv::Archived<BTreeMap<i64, PokemonRecord>>,
            rkyv::rancor::Error,
        >(&mmap[..])?;
        let stored =
            rkyv::deserialize::<BTreeMap<i64, PokemonRecord>, rkyv::rancor::Error>(archived)?;

        let mut entries = self.entries.lock().unwrap();
        for (id, record) in stored {
            entries.insert(id, record);
        }

        Ok(())
    }

    /// Serializes the whole map on a blocking task and rewrites the snapshot.
    async fn persist(&self) -> Result<(), PokeError> {
        let snapshot = self.entries.lock().unwrap().clone();

        let bytes =
            tokio::task::spawn_blocking(move || rkyv::to_bytes::<rkyv::rancor::Error>(&snapshot))
                .await??;
        tokio::fs::write(&self.path, bytes.as_slice()).await?;

        Ok(())
    }

    fn get(&self, id: i64) -> Option<PokemonRecord> {
        self.entries.lock().unwrap().get(&id).cloned()
    }

    fn get_by_name(&self, name: &str) -> Option<PokemonRecord> {
        self.entries
            .lock()
            .unwrap()
            .values()
            .find(|record| record.pokemon.name == name)
            .cloned()
    }

    fn insert(&self, record: PokemonRecord) {
        self.entries
            .lock()
            .unwrap()
            .insert(record.pokemon.id, record);
    }

    fn records(&self) -> Vec<PokemonRecord> {
        self.entries.lock().unwrap().values().cloned().collect()
    }
}
