// SPDX-License-Identifier: GPL-3.0-only

//! poke-sdk serves Pokémon data from PokéApi to native hosts.
//!
//! The crate is a cache-first fetch core ([`PokeCore`]) wrapped by a small
//! C compatible surface ([`ffi`]) so Android, iOS and desktop applications can
//! link against it. Records are cached on disk between runs, the companion
//! `pokegen` tool can prefetch the whole dex ahead of time.

pub mod api;
pub mod core;
pub mod entities;
pub mod ffi;
pub mod utils;

pub use crate::core::PokeCore;
pub use crate::entities::{FetchOutcome, PokemonRecord};
pub use crate::utils::PokeError;
