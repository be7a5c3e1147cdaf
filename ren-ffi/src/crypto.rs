//! Stateless key and randomness utilities.

use std::ffi::c_char;

use crate::ffi::{c_str_to_string, catch_ptr, into_c_string, to_c_json};

/// A fresh X25519 key pair as JSON `{"public_key": b64, "private_key": b64}`, or null on
/// failure. Caller must free with [`ren_sdk_free_string`](crate::ren_sdk_free_string).
#[unsafe(no_mangle)]
pub extern "C" fn ren_sdk_generate_keypair() -> *mut c_char {
    catch_ptr(|| to_c_json(&ren::crypto::generate_key_pair()?))
}

/// Base64 of 16 fresh random bytes, or null on failure.
/// Caller must free with [`ren_sdk_free_string`](crate::ren_sdk_free_string).
#[unsafe(no_mangle)]
pub extern "C" fn ren_sdk_generate_salt() -> *mut c_char {
    catch_ptr(|| into_c_string(ren::crypto::generate_salt()?))
}

/// Base64 of 12 fresh random bytes, or null on failure.
/// Caller must free with [`ren_sdk_free_string`](crate::ren_sdk_free_string).
#[unsafe(no_mangle)]
pub extern "C" fn ren_sdk_generate_nonce() -> *mut c_char {
    catch_ptr(|| into_c_string(ren::crypto::generate_nonce()?))
}

/// Base64 of the 32-byte master key derived from `password` and the base64 `salt_b64`
/// (Argon2id), or null on failure. The same inputs always give the same key.
/// Caller must free with [`ren_sdk_free_string`](crate::ren_sdk_free_string).
///
/// # Safety
///
/// `password` and `salt_b64` must be null or valid NUL-terminated strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ren_sdk_derive_master_key(
    password: *const c_char,
    salt_b64: *const c_char,
) -> *mut c_char {
    catch_ptr(|| {
        let password = unsafe { c_str_to_string(password, "password")? };
        let salt = unsafe { c_str_to_string(salt_b64, "salt")? };
        into_c_string(ren::crypto::derive_master_key(&password, &salt)?)
    })
}
