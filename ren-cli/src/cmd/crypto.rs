//! Offline key and randomness commands.

use serde_json::json;

use super::session::print_json;

/// Print a fresh key pair.
pub fn keypair() -> ren::Result<()> {
    print_json(&ren::crypto::generate_key_pair()?)
}

/// Print a fresh salt.
pub fn salt() -> ren::Result<()> {
    println!("{}", ren::crypto::generate_salt()?);
    Ok(())
}

/// Print a fresh nonce.
pub fn nonce() -> ren::Result<()> {
    println!("{}", ren::crypto::generate_nonce()?);
    Ok(())
}

/// Print the public key belonging to `private_key`.
pub fn derive_public(private_key: &str) -> ren::Result<()> {
    let public_key = ren::crypto::derive_public_key(private_key)?;
    print_json(&json!({ "public_key": public_key }))
}

/// Print the master key derived from `password` and `salt`.
pub fn derive_key(password: &str, salt: &str) -> ren::Result<()> {
    let master_key = ren::crypto::derive_master_key(password, salt)?;
    print_json(&json!({ "master_key": master_key }))
}
