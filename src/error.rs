//! Error types for the reporting client.
//!
//! Failures fall into three groups: the service answered with an error
//! document (`Api`), the exchange itself broke (`Http`, `Xml`, missing
//! elements or headers), or the local setup is unusable (`Config`, `Io`,
//! `Yaml`).

use std::io;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Non-200 answer carrying a `Code`/`Message` error document
    #[error("Got error from reporter: {code}, {message}")]
    Api { code: String, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body is not well-formed XML
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Missing element '{path}' in response")]
    MissingElement { path: String },

    #[error("Missing response header '{name}'")]
    MissingHeader { name: String },

    /// Command arguments are joined with commas and cannot contain one
    #[error("Invalid command argument '{value}': commas are not allowed")]
    InvalidArgument { value: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn missing_element(path: impl Into<String>) -> Self {
        Self::MissingElement { path: path.into() }
    }

    pub fn missing_header(name: impl Into<String>) -> Self {
        Self::MissingHeader { name: name.into() }
    }

    /// Whether the service itself rejected the request
    pub fn is_api_error(&self) -> bool {
        matches!(self, Self::Api { .. })
    }
}
