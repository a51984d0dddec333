//! Results of the lenient operations.
//!
//! Most client operations never fail: any error is turned into its display
//! text and handed back in place of the data. `Reply` carries either the
//! decoded data or that text, and prints both the same way the command line
//! echoes them.

use crate::error::Result;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Reply<T> {
    Data(T),
    /// Display text of the error that ended the operation
    Text(String),
}

impl<T> Reply<T> {
    pub fn data(self) -> Option<T> {
        match self {
            Reply::Data(data) => Some(data),
            Reply::Text(_) => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Reply::Data(_) => None,
            Reply::Text(text) => Some(text),
        }
    }
}

impl<T> From<Result<T>> for Reply<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Reply::Data(data),
            Err(err) => {
                tracing::debug!(error = %err, "Operation failed, returning error text");
                Reply::Text(err.to_string())
            }
        }
    }
}

impl<T: Serialize> fmt::Display for Reply<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Data(data) => {
                let json = serde_json::to_string_pretty(data).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
            Reply::Text(text) => f.write_str(text),
        }
    }
}
