// SPDX-License-Identifier: GPL-3.0-only

//! C compatible surface of the SDK, as declared in `include/poke_sdk.h`.
//!
//! Every fetch entry point hands back an owned, null-terminated JSON envelope
//! that the caller must release with [`free_string`]. Errors travel inside the
//! envelope, panics are caught at the boundary and folded into it too.

use std::ffi::{CStr, CString, c_char};
use std::panic::catch_unwind;
use std::sync::OnceLock;

use tokio::runtime::{Builder, Runtime};

use crate::core::PokeCore;
use crate::entities::FetchOutcome;

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// The runtime bridging the async core to the synchronous C ABI. Created on
/// first use, shared by every exported function.
fn runtime() -> &'static Runtime {
    RUNTIME.get_or_init(|| {
        Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("Failed to build the SDK runtime")
    })
}

fn into_c_string(payload: String) -> *mut c_char {
    match CString::new(payload) {
        Ok(c_string) => c_string.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

fn envelope_or_panic_notice(fetch: impl FnOnce() -> String + std::panic::UnwindSafe) -> String {
    catch_unwind(fetch)
        .unwrap_or_else(|_| FetchOutcome::failure("Panicked while fetching").to_json_string())
}

/// Fetch the Pokémon with the given PokéApi id and return it as an owned JSON
/// envelope. Returns null only if the payload itself could not be allocated,
/// every other failure is reported inside the envelope. The caller must
/// release the result with [`free_string`].
#[unsafe(no_mangle)]
pub extern "C" fn get_pokemon_json(id: u32) -> *mut c_char {
    let payload = envelope_or_panic_notice(|| {
        let result = runtime().block_on(PokeCore::global().pokemon_by_id(i64::from(id)));
        FetchOutcome::from_result(result).to_json_string()
    });

    into_c_string(payload)
}

/// Like [`get_pokemon_json`], but looks the Pokémon up by its PokéApi name
/// (e.g. `"pikachu"`). A null or non-UTF-8 `name` yields an error envelope.
///
/// # Safety
///
/// `name`, when non-null, must point to a valid null-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn get_pokemon_json_by_name(name: *const c_char) -> *mut c_char {
    if name.is_null() {
        return into_c_string(
            FetchOutcome::failure("Null pointer passed as name").to_json_string(),
        );
    }

    // SAFETY: non-null checked above, validity is the caller's contract.
    let requested = match unsafe { CStr::from_ptr(name) }.to_str() {
        Ok(text) => text.to_owned(),
        Err(_) => {
            return into_c_string(
                FetchOutcome::failure("Name is not valid UTF-8").to_json_string(),
            );
        }
    };

    let payload = envelope_or_panic_notice(move || {
        let result = runtime().block_on(PokeCore::global().pokemon_by_name(&requested));
        FetchOutcome::from_result(result).to_json_string()
    });

    into_c_string(payload)
}

/// Free the memory allocated for the given string.
///
/// # Safety
///
/// `ptr` must be null or a pointer previously returned by this SDK, and this
/// function must not be called twice for the same pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        // SAFETY: the pointer came out of CString::into_raw in this library.
        drop(unsafe { CString::from_raw(ptr) });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn take_envelope(ptr: *mut c_char) -> FetchOutcome {
        assert!(!ptr.is_null());
        let json = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_owned();
        unsafe { free_string(ptr) };
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn zero_id_yields_an_error_envelope() {
        let outcome = take_envelope(get_pokemon_json(0));

        assert!(!outcome.success);
        assert!(outcome.pokemon.is_none());
        assert!(outcome.error.is_some());
    }

    #[test]
    fn null_name_yields_an_error_envelope() {
        let outcome = take_envelope(unsafe { get_pokemon_json_by_name(std::ptr::null()) });

        assert!(!outcome.success);
        assert!(outcome.error.is_some());
    }

    #[test]
    fn non_utf8_name_yields_an_error_envelope() {
        let name = CString::new(vec![0xFFu8, 0xFEu8]).unwrap();
        let outcome = take_envelope(unsafe { get_pokemon_json_by_name(name.as_ptr()) });

        assert!(!outcome.success);
    }

    #[test]
    fn blank_name_yields_an_error_envelope() {
        let name = CString::new("   ").unwrap();
        let outcome = take_envelope(unsafe { get_pokemon_json_by_name(name.as_ptr()) });

        assert!(!outcome.success);
        assert!(outcome.pokemon.is_none());
    }

    #[test]
    fn free_string_ignores_null() {
        unsafe { free_string(std::ptr::null_mut()) };
    }

    #[test]
    fn payloads_with_interior_nuls_become_null() {
        assert!(into_c_string("bad\0payload".to_string()).is_null());
    }
}
