//! Error types for loading and checking API descriptions.

use std::path::PathBuf;
use thiserror::Error;

/// Message used whenever an input cannot be turned into a document.
pub const UNSUPPORTED_INPUT: &str =
    "Only filenames or raw or parsed strings of JSON or YAML are supported.";

/// Errors while turning an input into a document tree.
///
/// These are the only fatal errors: once a document is parsed, every
/// problem with its content is reported as a warning instead.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Input looked like a path but nothing is there. Exit code 3.
    #[error("no such API description file: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read API description {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to download API description from {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Neither JSON nor YAML, or not a mapping at the top. Exit code 2.
    #[error("{}", UNSUPPORTED_INPUT)]
    Unsupported,
}

impl LoadError {
    /// Process exit code for the CLI: 3 for IO and network, 2 for bad input.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            LoadError::Unsupported => 2,
        }
    }
}

/// Single meta-schema finding with path context.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SchemaError {
    /// JSON Pointer (RFC 6901) to the offending node.
    pub path: String,
    /// What the meta-schema rejected.
    pub message: String,
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}
