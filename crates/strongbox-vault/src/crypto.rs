// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level AES-256-GCM seal/open operations.
//!
//! Every call to [`seal`] generates a fresh random 96-bit nonce via the system
//! CSPRNG. Nonce reuse would be catastrophic for GCM security.

use ring::aead::{AES_256_GCM, Aad, LessSafeKey, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};
use strongbox_core::StrongboxError;

/// GCM nonce length in bytes.
pub const IV_LEN: usize = 12;

/// Fill an `N`-byte array from the system CSPRNG.
pub fn random_bytes<const N: usize>() -> Result<[u8; N], StrongboxError> {
    let mut out = [0u8; N];
    SystemRandom::new()
        .fill(&mut out)
        .map_err(|_| StrongboxError::Vault("system random generator failed".to_string()))?;
    Ok(out)
}

fn aead_key(key: &[u8; 32]) -> Result<LessSafeKey, StrongboxError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| StrongboxError::Vault("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt plaintext with AES-256-GCM using a random 96-bit nonce.
///
/// Returns `(ciphertext_with_tag, nonce_bytes)`.
pub fn seal(key: &[u8; 32], plaintext: &[u8]) -> Result<(Vec<u8>, [u8; IV_LEN]), StrongboxError> {
    let sealing = aead_key(key)?;
    let nonce_bytes: [u8; IV_LEN] = random_bytes()?;

    let mut in_out = plaintext.to_vec();
    sealing
        .seal_in_place_append_tag(
            Nonce::assume_unique_for_key(nonce_bytes),
            Aad::empty(),
            &mut in_out,
        )
        .map_err(|_| StrongboxError::Vault("AES-256-GCM encryption failed".to_string()))?;

    Ok((in_out, nonce_bytes))
}

/// Decrypt ciphertext with AES-256-GCM.
///
/// `ciphertext` must include the 16-byte authentication tag. Fails if the key
/// is wrong or the data was tampered with.
pub fn open(
    key: &[u8; 32],
    nonce_bytes: &[u8; IV_LEN],
    ciphertext: &[u8],
) -> Result<Vec<u8>, StrongboxError> {
    let opening = aead_key(key)?;
    let mut in_out = ciphertext.to_vec();
    let plaintext = opening
        .open_in_place(
            Nonce::assume_unique_for_key(*nonce_bytes),
            Aad::empty(),
            &mut in_out,
        )
        .map_err(|_| {
            StrongboxError::Vault(
                "AES-256-GCM decryption failed -- wrong key or corrupted data".to_string(),
            )
        })?;
    Ok(plaintext.to_vec())
}
