// SPDX-License-Identifier: GPL-3.0-only

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anywho::{Error, anywho};
use flate2::Compression;
use flate2::write::GzEncoder;
use futures::StreamExt;
use poke_sdk::{FetchOutcome, PokeCore, PokemonRecord};
use poke_sdk::utils::scale_numbers;
use ron::to_string;
use tokio::sync::Semaphore;

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_help();
        return;
    }

    let core = PokeCore::global();

    match args[1].as_str() {
        "-a" => {
            println!("Executing all operations...");
            warm_pokemon_data(core).await;
            bundle_sprites(core).await;
        }
        "-p" => {
            println!("Warming the Pokémon cache only...");
            warm_pokemon_data(core).await;
        }
        "-s" => {
            println!("Bundling sprites only...");
            bundle_sprites(core).await;
        }
        "-f" => match args.get(2).and_then(|raw| raw.parse::<u32>().ok()) {
            Some(id) => fetch_one(core, id).await,
            None => {
                println!("-f needs a numeric Pokémon id");
                print_help();
            }
        },
        _ => {
            println!("Invalid flag: {}", args[1]);
            print_help();
        }
    }
}

fn print_help() {
    println!(
        "Usage: {} [FLAG]",
        std::env::args()
            .next()
            .unwrap_or_else(|| "pokegen".to_string())
    );
    println!();
    println!("FLAGS:");
    println!("  -a        Execute all operations (warm the cache and bundle sprites)");
    println!("  -p        Warm the Pokémon cache and export a RON snapshot");
    println!("  -s        Download cached Pokémon sprites and bundle them as tar.gz");
    println!("  -f <id>   Fetch one Pokémon and print the SDK's JSON envelope");
    println!();
    println!("You can only pass one flag at a time.");
}

/// Prefetches the whole dex through the SDK cache and exports a readable
/// snapshot next to the binary.
async fn warm_pokemon_data(core: &PokeCore) {
    println!("Downloading Pokémon data...");

    let records = core.warm().await;
    println!("Cached {} Pokémon", records.len());

    let ron_string = to_string(&records);

    if let Ok(ron_data) = ron_string {
        if let Err(e) = tokio::fs::create_dir_all("assets").await {
            println!("Failed to create assets directory: {e}");
            return;
        }

        match tokio::fs::write("assets/pokemon_data.ron", ron_data).await {
            Ok(()) => println!("Snapshot written successfully"),
            Err(_) => println!("Failed to write the snapshot to file"),
        }
    } else {
        println!("Failed to serialize data to RON format");
    }
}

/// Downloads every cached front sprite and packs them into
/// `assets/sprites.tar.gz`.
async fn bundle_sprites(core: &PokeCore) {
    let temp_sprites_dir = std::env::temp_dir().join("pokegen_sprites");

    println!("Downloading Pokémon sprites...");
    match download_sprites(core.cached_records(), &temp_sprites_dir).await {
        Ok(downloaded) => {
            println!("{downloaded} sprites downloaded to: {temp_sprites_dir:?}");

            if let Err(e) = tokio::fs::create_dir_all("assets").await {
                println!("Failed to create assets directory: {e}");
                return;
            }

            let assets_path = Path::new("assets").join("sprites.tar.gz");
            let tar_gz = match std::fs::File::create(assets_path) {
                Ok(file) => file,
                Err(e) => {
                    println!("Failed to create the archive file: {e}");
                    return;
                }
            };
            let enc = GzEncoder::new(tar_gz, Compression::default());
            let mut tar = tar::Builder::new(enc);

            // add the entire sprites directory to the archive
            let _res = tar.append_dir_all("sprites", &temp_sprites_dir);
            match tar.finish() {
                Ok(()) => {
                    let _res = std::fs::remove_dir_all(&temp_sprites_dir);
                    println!("Archive created successfully");
                }
                Err(e) => println!("Failed to finish the archive: {e}"),
            }
        }
        Err(e) => println!("Failed to download sprites: {e}"),
    }
}

/// Fetches one Pokémon through the SDK and prints the exact envelope the FFI
/// surface would hand a native caller.
async fn fetch_one(core: &PokeCore, id: u32) {
    let outcome = FetchOutcome::from_result(core.pokemon_by_id(i64::from(id)).await);
    println!("{}", outcome.to_json_string());

    if let Some(record) = &outcome.pokemon {
        println!(
            "# {}: {} m, {} kg, total stats {}",
            record.pokemon.name,
            scale_numbers(record.pokemon.height),
            scale_numbers(record.pokemon.weight),
            record.total_stats()
        );
    }
}

/// Downloads the front sprite of every record, skipping files that already
/// exist. Returns how many sprites were actually fetched.
async fn download_sprites(
    records: Vec<PokemonRecord>,
    download_path: &Path,
) -> Result<usize, Error> {
    if records.is_empty() {
        return Err(anywho!("The cache is empty, run pokegen -p first"));
    }

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(10)
        .build()?;

    let semaphore = Arc::new(Semaphore::new(20));

    let results = futures::stream::iter(records)
        .map(|record| {
            let client = client.clone();
            let semaphore = Arc::clone(&semaphore);
            let download_path = download_path.to_path_buf();

            async move {
                let _permit = semaphore.acquire().await.unwrap();
                if let Some(sprite_url) = record.sprites.front_default.clone() {
                    download_image(
                        &client,
                        sprite_url,
                        record.pokemon.name.clone(),
                        download_path,
                    )
                    .await
                    .map(|()| 1)
                } else {
                    Ok(0)
                }
            }
        })
        .buffer_unordered(20) // Adjust the number of concurrent tasks
        .collect::<Vec<_>>()
        .await;

    let mut downloaded = 0;
    for result in results {
        match result {
            Ok(count) => downloaded += count,
            Err(e) => eprintln!("Error downloading sprite: {e}"),
        }
    }

    Ok(downloaded)
}

/// Attempts to download a pokemon sprite (image_url) to the provided location following the naming scheme of the SDK
async fn download_image(
    client: &reqwest::Client,
    image_url: String,
    pokemon_name: String,
    download_path: PathBuf,
) -> Result<(), Error> {
    let image_filename = format!("{pokemon_name}_front.png");
    let image_path = download_path.join(&pokemon_name).join(&image_filename);

    // Check if file already exists
    if tokio::fs::metadata(&image_path).await.is_ok() {
        return Ok(());
    }

    let response = client.get(&image_url).send().await?;
    if response.status().is_success() {
        let bytes = response.bytes().await?;
        if let Some(parent) = image_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&image_path, &bytes).await?;
        Ok(())
    } else {
        Err(anywho!(
            "Failed to download image. Status: {}",
            response.status()
        ))
    }
}
