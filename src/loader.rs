//! Document loading from various sources.
//!
//! An API description can be handed over already parsed, as a file path, as
//! raw JSON or YAML text, or as an HTTP URL. Text is tried as JSON first and
//! then as YAML; anything that doesn't yield a mapping is rejected.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::LoadError;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Where a document comes from.
#[derive(Debug, Clone)]
pub enum Source {
    /// An already-parsed document tree.
    Document(Value),
    /// A JSON or YAML file on disk.
    File(PathBuf),
    /// Raw JSON or YAML text.
    Text(String),
    /// An HTTP/HTTPS URL serving JSON or YAML.
    #[cfg(feature = "remote")]
    Url(String),
}

impl Source {
    /// Classify a command-line style input.
    ///
    /// Existing files win, then URLs; anything else is treated as raw text.
    pub fn detect(input: &str) -> Self {
        if Path::new(input).is_file() {
            return Source::File(PathBuf::from(input));
        }
        #[cfg(feature = "remote")]
        {
            if is_url(input) {
                return Source::Url(input.to_string());
            }
        }
        Source::Text(input.to_string())
    }
}

impl From<Value> for Source {
    fn from(value: Value) -> Self {
        Source::Document(value)
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Source::File(path.to_path_buf())
    }
}

/// Load a document from any supported source.
///
/// # Errors
///
/// Returns `LoadError::Unsupported` if the input isn't a JSON or YAML mapping,
/// or an IO/network error if it cannot be read.
pub fn load_document(source: Source) -> Result<Value, LoadError> {
    match source {
        Source::Document(value) => ensure_mapping(value),
        Source::File(path) => load_file(&path),
        Source::Text(content) => load_str(&content),
        #[cfg(feature = "remote")]
        Source::Url(url) => load_url(&url),
    }
}

/// Load a document from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// or `LoadError::Unsupported` if its content isn't JSON or YAML.
pub fn load_file(path: &Path) -> Result<Value, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    load_str(&content)
}

/// Load a document from JSON or YAML text.
///
/// # Errors
///
/// Returns `LoadError::Unsupported` if the text parses as neither, or if
/// the parsed value isn't a mapping.
pub fn load_str(content: &str) -> Result<Value, LoadError> {
    let parsed = match serde_json::from_str::<Value>(content) {
        Ok(value) => value,
        Err(json_err) => {
            tracing::debug!("not JSON ({}), trying YAML", json_err);
            serde_yaml::from_str::<Value>(content).map_err(|yaml_err| {
                tracing::debug!("not YAML: {}", yaml_err);
                LoadError::Unsupported
            })?
        }
    };
    ensure_mapping(parsed)
}

/// Load a document from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `LoadError::NetworkError` if the request fails or the server
/// answers with an error status, or `LoadError::Unsupported` if the body
/// isn't JSON or YAML.
#[cfg(feature = "remote")]
pub fn load_url(url: &str) -> Result<Value, LoadError> {
    let network_error = |source| LoadError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network_error)?;

    let body = client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.text())
        .map_err(network_error)?;

    load_str(&body)
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Navigate a local JSON Pointer fragment (e.g. `#/definitions/Pet`).
///
/// Returns `None` when the pointer is not local to the document or
/// doesn't lead anywhere.
pub fn navigate_fragment<'a>(document: &'a Value, fragment: &str) -> Option<&'a Value> {
    let path = fragment.strip_prefix('#')?.trim_start_matches('/');
    if path.is_empty() {
        return Some(document);
    }

    let mut current = document;
    for part in path.split('/') {
        // Unescape JSON Pointer encoding (~1 = /, ~0 = ~)
        let key = part.replace("~1", "/").replace("~0", "~");
        current = match current {
            Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
            other => other.get(&key)?,
        };
    }
    Some(current)
}

fn ensure_mapping(value: Value) -> Result<Value, LoadError> {
    if value.is_object() {
        Ok(value)
    } else {
        Err(LoadError::Unsupported)
    }
}
