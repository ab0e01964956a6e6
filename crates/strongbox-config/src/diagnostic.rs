// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Config errors rendered through miette.
//!
//! Figment reports every problem in a file at once. Each one becomes a
//! [`ConfigError`]; unknown keys point at their line when the file is known
//! and are matched against the sections of the default config.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use std::fmt::Write as _;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::model::StrongboxConfig;

const SUGGESTION_THRESHOLD: f64 = 0.8;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown key `{key}` in {location}")]
    #[diagnostic(code(strongbox::config::unknown_key), help("{hint}"))]
    UnknownKey {
        key: String,
        /// `[section]`, or "the top level".
        location: String,
        suggestion: Option<String>,
        hint: String,
        #[label("not a strongbox setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: {detail}")]
    #[diagnostic(code(strongbox::config::invalid_type))]
    InvalidType { key: String, detail: String },

    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(strongbox::config::missing_key),
        help("add `{key} = <value>` to strongbox.toml")
    )]
    MissingKey { key: String },

    #[error("invalid setting: {message}")]
    #[diagnostic(code(strongbox::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(strongbox::config::other))]
    Other(String),
}

/// Convert every error inside a `figment::Error`.
///
/// `toml_sources` holds `(path, content)` pairs; an error whose origin is
/// one of these files gets a source span.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| convert(error, toml_sources))
        .collect()
}

fn convert(error: figment::error::Error, toml_sources: &[(String, String)]) -> ConfigError {
    use figment::error::Kind;

    let section = error.path.first().map(String::as_str);
    match &error.kind {
        Kind::UnknownField(field, accepted) => {
            let suggestion = suggest_key(field, accepted);
            let (span, src) = match locate(&error, toml_sources, section, field) {
                Some((span, src)) => (Some(span), Some(src)),
                None => (None, None),
            };
            ConfigError::UnknownKey {
                key: field.clone(),
                location: section.map_or_else(|| "the top level".to_string(), |s| format!("[{s}]")),
                hint: unknown_key_hint(field, section, suggestion.as_deref(), accepted),
                suggestion,
                span,
                src,
            }
        }
        Kind::MissingField(field) => ConfigError::MissingKey {
            key: field.to_string(),
        },
        Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
            key: error.path.join("."),
            detail: format!("found {actual}, expected {expected}"),
        },
        _ => ConfigError::Other(error.to_string()),
    }
}

fn unknown_key_hint(
    field: &str,
    section: Option<&str>,
    suggestion: Option<&str>,
    accepted: &[&str],
) -> String {
    if let Some(home) = home_section(field).filter(|home| Some(home.as_str()) != section) {
        return format!("`{field}` belongs in [{home}]");
    }
    match suggestion {
        Some(s) => format!("did you mean `{s}`?"),
        None => format!("accepted here: {}", accepted.join(", ")),
    }
}

/// Section of the default config that defines `key`.
fn home_section(key: &str) -> Option<String> {
    let defaults = toml::Value::try_from(StrongboxConfig::default()).ok()?;
    defaults
        .as_table()?
        .iter()
        .find(|(_, body)| body.as_table().is_some_and(|t| t.contains_key(key)))
        .map(|(name, _)| name.clone())
}

fn locate(
    error: &figment::error::Error,
    toml_sources: &[(String, String)],
    section: Option<&str>,
    field: &str,
) -> Option<(SourceSpan, NamedSource<String>)> {
    let Some(figment::Source::File(origin)) = error.metadata.as_ref()?.source.as_ref() else {
        return None;
    };
    let origin = origin.display().to_string();
    let (name, content) = toml_sources.iter().find(|(path, _)| *path == origin)?;
    let offset = find_key_offset(content, section, field)?;
    Some((
        SourceSpan::new(offset.into(), field.len()),
        NamedSource::new(name, content.clone()),
    ))
}

/// Byte offset of `field` as a key under `[section]`, or before any header
/// when `section` is `None`.
pub fn find_key_offset(content: &str, section: Option<&str>, field: &str) -> Option<usize> {
    let mut current: Option<&str> = None;
    let mut line_start = 0;
    for line in content.split_inclusive('\n') {
        let start = line_start;
        line_start += line.len();

        let body = line.trim_start();
        if let Some(header) = body.strip_prefix('[') {
            current = header.split(']').next().map(str::trim);
            continue;
        }
        if current != section {
            continue;
        }
        if let Some((key, _)) = body.split_once('=')
            && key.trim_end() == field
        {
            return Some(start + line.len() - body.len());
        }
    }
    None
}

/// Closest of `valid_keys` to `unknown` by Jaro-Winkler, if close enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Print every error to stderr, graphically when miette can render it.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    let mut out = String::new();
    if errors.len() > 1 {
        let _ = writeln!(out, "strongbox found {} configuration problems:", errors.len());
    }
    for error in errors {
        if handler.render_report(&mut out, error).is_err() {
            let _ = writeln!(out, "error: {error}");
        }
    }
    eprint!("{out}");
}
