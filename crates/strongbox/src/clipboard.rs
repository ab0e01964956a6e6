// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Clipboard writer using the OSC 52 terminal escape sequence.
//!
//! Works over SSH and inside most terminal emulators without a native
//! clipboard library. The terminal owns the clipboard; nothing is read back.

use std::io::{IsTerminal, Write};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use strongbox_core::{ClipboardWriter, StrongboxError};
use zeroize::Zeroizing;

/// Build the escape sequence that sets the system clipboard to `text`.
pub fn osc52_sequence(text: &str) -> Zeroizing<String> {
    let encoded = Zeroizing::new(STANDARD.encode(text.as_bytes()));
    if std::env::var_os("TMUX").is_some() {
        // tmux only forwards the sequence inside a passthrough wrapper.
        Zeroizing::new(format!("\x1bPtmux;\x1b\x1b]52;c;{}\x07\x1b\\", encoded.as_str()))
    } else {
        Zeroizing::new(format!("\x1b]52;c;{}\x07", encoded.as_str()))
    }
}

/// Writes OSC 52 sequences to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct Osc52Clipboard;

#[async_trait]
impl ClipboardWriter for Osc52Clipboard {
    async fn write_text(&self, text: &str) -> Result<(), StrongboxError> {
        let mut stdout = std::io::stdout();
        if !stdout.is_terminal() {
            return Err(StrongboxError::Clipboard(
                "stdout is not a terminal".to_string(),
            ));
        }
        let sequence = osc52_sequence(text);
        stdout
            .write_all(sequence.as_bytes())
            .and_then(|()| stdout.flush())
            .map_err(|e| StrongboxError::Clipboard(format!("terminal write failed: {e}")))
    }
}
