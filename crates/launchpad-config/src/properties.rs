//! Flat `key=value` properties files.
//!
//! Accepted format:
//! - blank lines and lines starting with `#` or `!` are ignored
//! - the first `=` or `:` separates key from value
//! - whitespace around keys and values is trimmed
//! - a line with no separator is a key with an empty value

use std::path::Path;

use crate::error::{ConfigError, ConfigResult};

/// Maximum properties file size in bytes (1 MB).
const MAX_PROPERTIES_FILE_SIZE: u64 = 1024 * 1024;

/// Parse properties text into ordered `(key, value)` pairs.
///
/// `origin` is only used in error messages.
///
/// # Errors
///
/// Returns [`ConfigError::ParseError`] for a line with an empty key.
pub fn parse_properties(content: &str, origin: &str) -> ConfigResult<Vec<(String, String)>> {
    let mut pairs = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let (key, value) = match line.find(['=', ':']) {
            Some(at) => (line[..at].trim(), line[at..].get(1..).unwrap_or("").trim()),
            None => (line, ""),
        };

        if key.is_empty() {
            return Err(ConfigError::ParseError {
                path: origin.to_owned(),
                line: index.saturating_add(1),
                message: "missing key before separator".to_owned(),
            });
        }

        pairs.push((key.to_owned(), value.to_owned()));
    }

    Ok(pairs)
}

/// Read a properties file if it exists.
///
/// Returns `Ok(None)` when the file does not exist.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file exists but cannot be read, is larger
/// than 1 MB, or fails to parse.
pub fn load_properties_file(path: &Path) -> ConfigResult<Option<Vec<(String, String)>>> {
    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };

    if metadata.len() > MAX_PROPERTIES_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "properties file is {} bytes, exceeding the {} byte limit",
                metadata.len(),
                MAX_PROPERTIES_FILE_SIZE
            ),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_properties(&content, &path.display().to_string()).map(Some)
}

/// Parse a single `key=value` definition as given on the command line.
///
/// Usable directly as a `clap` value parser.
///
/// # Errors
///
/// Returns a message if there is no `=` or the key is empty.
pub fn parse_definition(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in definition '{raw}'"));
    }
    Ok((key.to_owned(), value.to_owned()))
}
