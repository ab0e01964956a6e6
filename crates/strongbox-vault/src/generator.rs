// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Random password generator.

use rand::Rng;
use rand::rngs::OsRng;
use strongbox_config::model::GeneratorConfig;
use zeroize::Zeroizing;

const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
const NUMBERS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()-_=+[]{}|;:,.<>?";

/// Generate a password from the enabled character classes using the OS
/// CSPRNG. Falls back to lowercase letters when no class is enabled.
pub fn generate_password(config: &GeneratorConfig) -> Zeroizing<String> {
    let mut alphabet = String::new();
    for (enabled, class) in [
        (config.uppercase, UPPER),
        (config.lowercase, LOWER),
        (config.numbers, NUMBERS),
        (config.symbols, SYMBOLS),
    ] {
        if enabled {
            alphabet.push_str(class);
        }
    }
    if alphabet.is_empty() {
        alphabet.push_str(LOWER);
    }

    let alphabet = alphabet.as_bytes();
    let mut rng = OsRng;
    Zeroizing::new(
        (0..config.length)
            .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
            .collect(),
    )
}
