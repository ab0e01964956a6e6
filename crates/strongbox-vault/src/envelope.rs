// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-record envelope encryption.
//!
//! Each [`Envelope`] carries its own PBKDF2 salt and GCM nonce, so it can be
//! opened with nothing but itself and the master password. Decryption never
//! fails loudly: any structural, authentication or parse problem yields
//! `None`, which lets batch callers skip a bad record and keep going.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use strongbox_core::{Envelope, StrongboxError};
use tracing::trace;
use zeroize::Zeroizing;

use crate::{crypto, kdf};

/// Result of decrypting a batch of stored or downloaded envelopes.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome<T> {
    pub decrypted: Vec<T>,
    pub failed: usize,
}

/// Serialize `plaintext` to JSON and seal it under a key derived from
/// `password` with a fresh salt and nonce.
pub fn encrypt<T: Serialize>(plaintext: &T, password: &str) -> Result<Envelope, StrongboxError> {
    let json = Zeroizing::new(serde_json::to_vec(plaintext)?);
    let salt = kdf::generate_salt()?;
    let key = kdf::derive_key(password.as_bytes(), &salt);
    let (ciphertext, iv) = crypto::seal(&key, &json)?;
    Ok(Envelope {
        ciphertext,
        iv,
        salt,
    })
}

/// Open `envelope` with `password`, returning `None` on any failure.
pub fn decrypt<T: DeserializeOwned>(envelope: &Envelope, password: &str) -> Option<T> {
    let key = kdf::derive_key(password.as_bytes(), &envelope.salt);
    let plaintext = Zeroizing::new(
        crypto::open(&key, &envelope.iv, &envelope.ciphertext).ok()?,
    );
    match serde_json::from_slice(&plaintext) {
        Ok(value) => Some(value),
        Err(e) => {
            trace!(error = %e, "decrypted envelope is not valid JSON for the target type");
            None
        }
    }
}

/// Structurally validate an untyped envelope.
///
/// Accepts the legacy form where the envelope object was itself stored as a
/// JSON string.
pub fn parse_envelope(value: &Value) -> Option<Envelope> {
    match value {
        Value::String(inner) => serde_json::from_str(inner).ok(),
        Value::Object(_) => serde_json::from_value(value.clone()).ok(),
        _ => None,
    }
}

/// [`parse_envelope`] followed by [`decrypt`].
pub fn decrypt_value<T: DeserializeOwned>(value: &Value, password: &str) -> Option<T> {
    decrypt(&parse_envelope(value)?, password)
}

/// Decrypt every element independently, counting the ones that fail.
pub fn decrypt_batch<T: DeserializeOwned>(values: &[Value], password: &str) -> BatchOutcome<T> {
    let mut decrypted = Vec::with_capacity(values.len());
    let mut failed = 0;
    for value in values {
        match decrypt_value(value, password) {
            Some(record) => decrypted.push(record),
            None => failed += 1,
        }
    }
    BatchOutcome { decrypted, failed }
}
