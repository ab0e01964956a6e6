// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PBKDF2-HMAC-SHA256 key derivation for envelope keys.
//!
//! Parameters are fixed: changing any of them makes every previously
//! persisted envelope undecryptable.

use std::num::NonZeroU32;

use ring::pbkdf2;
use strongbox_core::StrongboxError;
use zeroize::Zeroizing;

use crate::crypto::random_bytes;

/// PBKDF2 iteration count.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Per-envelope salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Derived key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

const ITERATIONS: NonZeroU32 = match NonZeroU32::new(PBKDF2_ITERATIONS) {
    Some(n) => n,
    None => panic!("PBKDF2 iteration count must be non-zero"),
};

/// Derive a 32-byte AES key from `password` and an envelope salt.
///
/// The returned key is wrapped in [`Zeroizing`] for automatic memory zeroing
/// on drop.
pub fn derive_key(password: &[u8], salt: &[u8; SALT_LEN]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        ITERATIONS,
        salt,
        password,
        key.as_mut(),
    );
    key
}

/// Generate a random 16-byte envelope salt.
pub fn generate_salt() -> Result<[u8; SALT_LEN], StrongboxError> {
    random_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_key_is_deterministic() {
        let salt = [1u8; SALT_LEN];
        assert_eq!(*derive_key(b"abc123", &salt), *derive_key(b"abc123", &salt));
    }

    #[test]
    fn different_password_or_salt_changes_key() {
        let salt = [2u8; SALT_LEN];
        let base = derive_key(b"abc123", &salt);
        assert_ne!(*base, *derive_key(b"xyz789", &salt));
        assert_ne!(*base, *derive_key(b"abc123", &[3u8; SALT_LEN]));
    }

    #[test]
    fn matches_pbkdf2_verify() {
        let salt = [4u8; SALT_LEN];
        let key = derive_key(b"pw", &salt);
        assert!(
            pbkdf2::verify(pbkdf2::PBKDF2_HMAC_SHA256, ITERATIONS, &salt, b"pw", key.as_ref())
                .is_ok()
        );
    }

    #[test]
    fn generate_salt_produces_random_values() {
        assert_ne!(generate_salt().unwrap(), generate_salt().unwrap());
    }
}
