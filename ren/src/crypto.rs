//! Stateless key and randomness utilities.
//!
//! Random values are drawn fresh from the operating system CSPRNG. Keys, salts and nonces
//! travel as standard base64. Nothing here touches a [`Client`](crate::Client) or the
//! network, and all functions are safe to call from any thread.

use std::fmt;

use argon2::Argon2;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// Length of an X25519 key in bytes.
pub const KEY_LEN: usize = 32;

/// Length of a password-hashing salt in bytes.
pub const SALT_LEN: usize = 16;

/// Length of an AEAD nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Length of a master key derived from a password.
pub const MASTER_KEY_LEN: usize = 32;

/// Shortest salt Argon2 accepts.
const MIN_SALT_LEN: usize = 8;

/// An X25519 key pair, both halves base64-encoded.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct KeyPair {
    /// Public half, shareable.
    pub public_key: String,
    /// Private half, never leaves the device unencrypted.
    pub private_key: String,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Generate a fresh X25519 key pair.
pub fn generate_key_pair() -> Result<KeyPair> {
    let secret = StaticSecret::from(random_bytes::<KEY_LEN>()?);
    let public = PublicKey::from(&secret);
    Ok(KeyPair {
        public_key: STANDARD.encode(public.as_bytes()),
        private_key: STANDARD.encode(secret.as_bytes()),
    })
}

/// Generate a base64 salt of [`SALT_LEN`] random bytes.
pub fn generate_salt() -> Result<String> {
    Ok(STANDARD.encode(random_bytes::<SALT_LEN>()?))
}

/// Generate a base64 nonce of [`NONCE_LEN`] random bytes.
pub fn generate_nonce() -> Result<String> {
    Ok(STANDARD.encode(random_bytes::<NONCE_LEN>()?))
}

/// Recompute the base64 public key belonging to a base64 private key.
pub fn derive_public_key(private_key_b64: &str) -> Result<String> {
    let raw = STANDARD
        .decode(private_key_b64.trim())
        .map_err(|e| Error::InvalidArgument(format!("private key is not base64: {e}")))?;
    let bytes: [u8; KEY_LEN] = raw.as_slice().try_into().map_err(|_| {
        Error::InvalidArgument(format!(
            "private key must be {KEY_LEN} bytes, got {}",
            raw.len()
        ))
    })?;
    let secret = StaticSecret::from(bytes);
    Ok(STANDARD.encode(PublicKey::from(&secret).as_bytes()))
}

/// Derive the base64 master key of a password and a base64 salt with Argon2id.
///
/// The salt is normally one produced by [`generate_salt`] and stored next to the
/// account. The same password and salt always give the same key.
pub fn derive_master_key(password: &str, salt_b64: &str) -> Result<String> {
    if password.is_empty() {
        return Err(Error::InvalidArgument("password is empty".into()));
    }
    let salt = STANDARD
        .decode(salt_b64.trim())
        .map_err(|e| Error::InvalidArgument(format!("salt is not base64: {e}")))?;
    if salt.len() < MIN_SALT_LEN {
        return Err(Error::InvalidArgument(format!(
            "salt must be at least {MIN_SALT_LEN} bytes, got {}",
            salt.len()
        )));
    }
    let mut key = Zeroizing::new([0u8; MASTER_KEY_LEN]);
    Argon2::default()
        .hash_password_into(password.as_bytes(), &salt, &mut key[..])
        .map_err(|e| Error::Crypto(format!("argon2: {e}")))?;
    Ok(STANDARD.encode(&key[..]))
}

fn random_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    getrandom::fill(&mut buf).map_err(|e| Error::Crypto(format!("rng: {e}")))?;
    Ok(buf)
}
