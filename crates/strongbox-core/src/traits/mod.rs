// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions.
//!
//! The persistence and cloud adapters extend the [`PluginAdapter`] base
//! trait and use `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod clipboard;
pub mod clock;
pub mod cloud;
pub mod store;
pub mod totp;

pub use adapter::PluginAdapter;
pub use clipboard::ClipboardWriter;
pub use clock::{Clock, SystemClock};
pub use cloud::CloudStore;
pub use store::KeyValueStore;
pub use totp::TotpGenerator;
