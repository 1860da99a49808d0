// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns figment extraction failures into miette diagnostics.
//!
//! Unknown keys are pointed at in the offending file when it can be found,
//! and carry a "did you mean" hint ranked by Jaro-Winkler similarity.

#![allow(unused_assignments)] // emitted by the miette Diagnostic derive

use figment::error::{Error as FigmentError, Kind};
use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

/// Similarity a candidate key must exceed before it is offered as a hint.
const HINT_THRESHOLD: f64 = 0.75;

/// One problem found while loading or validating `kibitz.toml`.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("`{key}` is not a recognized setting")]
    #[diagnostic(
        code(kibitz::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        /// Closest known key, if any is close enough.
        suggestion: Option<String>,
        /// Known keys for the enclosing table, comma separated.
        valid_keys: String,
        #[label("unrecognized")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: {detail}")]
    #[diagnostic(
        code(kibitz::config::invalid_type),
        help("use a value of type {expected}")
    )]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    /// Value outside an enumerated set, such as an unknown provider name.
    #[error("`{key}` has an unsupported value: {detail}")]
    #[diagnostic(code(kibitz::config::invalid_value))]
    InvalidValue { key: String, detail: String },

    #[error("`{key}` is required")]
    #[diagnostic(
        code(kibitz::config::missing_key),
        help("set `{key}` in kibitz.toml")
    )]
    MissingKey { key: String },

    /// Well-formed but semantically unusable settings.
    #[error("invalid configuration: {message}")]
    #[diagnostic(code(kibitz::config::validation))]
    Validation { message: String },

    #[error("could not load configuration: {0}")]
    #[diagnostic(code(kibitz::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    let known = format!("known keys here: {valid_keys}");
    match suggestion {
        Some(hint) => format!("perhaps `{hint}`? {known}"),
        None => known,
    }
}

/// Expands one figment failure into diagnostics, one per underlying error.
///
/// `sources` pairs each file path figment may have read with its contents,
/// so unknown keys can be labelled in place.
pub fn figment_to_config_errors(
    err: FigmentError,
    sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter().map(|e| convert(&e, sources)).collect()
}

fn convert(error: &FigmentError, sources: &[(String, String)]) -> ConfigError {
    let key_path = || error.path.join(".");

    match &error.kind {
        Kind::UnknownField(field, expected) => {
            let (span, src) = match locate(error, field, sources) {
                Some((offset, name, content)) => (
                    Some(SourceSpan::new(offset.into(), field.len())),
                    Some(NamedSource::new(name, content.to_string())),
                ),
                None => (None, None),
            };
            ConfigError::UnknownKey {
                key: field.clone(),
                suggestion: suggest_key(field, *expected),
                valid_keys: expected.join(", "),
                span,
                src,
            }
        }
        Kind::MissingField(field) => ConfigError::MissingKey {
            key: field.to_string(),
        },
        Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
            key: key_path(),
            detail: format!("got {actual}"),
            expected: expected.clone(),
        },
        Kind::UnknownVariant(actual, expected) => {
            let options = expected.join(", ");
            let detail = match suggest_key(actual, *expected) {
                Some(hint) => format!("`{actual}` (perhaps `{hint}`?); choose one of {options}"),
                None => format!("`{actual}`; choose one of {options}"),
            };
            ConfigError::InvalidValue {
                key: key_path(),
                detail,
            }
        }
        _ => ConfigError::Other(error.to_string()),
    }
}

/// Finds the file an error came from and the byte offset of `field` in it.
fn locate<'a>(
    error: &FigmentError,
    field: &str,
    sources: &'a [(String, String)],
) -> Option<(usize, &'a str, &'a str)> {
    let figment::Source::File(origin) = error.metadata.as_ref()?.source.as_ref()? else {
        return None;
    };
    let origin = origin.display().to_string();
    let (name, content) = sources.iter().find(|(name, _)| *name == origin)?;
    let offset = find_key_offset(content, &error.path, field)?;
    Some((offset, name.as_str(), content.as_str()))
}

/// Byte offset of `field` within the table named by the first element of
/// `path`, or within the whole document when `path` is empty.
///
/// Both `[table]` and `[[table]]` headers are recognized.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let start = match path.first() {
        None => 0,
        Some(table) => table_body_start(content, table)?,
    };

    let mut offset = start;
    for line in content[start..].split_inclusive('\n') {
        let key = line.trim_start();
        if let Some(rest) = key.strip_prefix(field)
            && rest.starts_with([' ', '\t', '='])
        {
            return Some(offset + (line.len() - key.len()));
        }
        offset += line.len();
    }
    None
}

fn table_body_start(content: &str, table: &str) -> Option<usize> {
    [format!("[[{table}]]"), format!("[{table}]")]
        .iter()
        .find_map(|header| content.find(header.as_str()).map(|at| at + header.len()))
}

/// Closest entry of `candidates` to `unknown`, if it is similar enough.
pub fn suggest_key<S: AsRef<str>>(unknown: &str, candidates: &[S]) -> Option<String> {
    candidates
        .iter()
        .map(|c| (strsim::jaro_winkler(unknown, c.as_ref()), c.as_ref()))
        .filter(|(score, _)| *score > HINT_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Prints each diagnostic to stderr with miette's graphical renderer.
pub fn render_errors(errors: &[ConfigError]) {
    let renderer = GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match renderer.render_report(&mut out, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
}
