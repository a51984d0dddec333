//! Logging setup and redaction of outgoing payloads.

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

const SENSITIVE_KEYS: [&str; 3] = ["password", "accesstoken", "token"];

/// Log level for a `-v` count.
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber writing to stderr. `RUST_LOG` overrides the
/// level picked from the verbosity.
pub fn init(verbosity: u8) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbosity >= 2)
        .compact()
        .try_init()
        .map_err(|e| Error::config(format!("failed to initialize logging: {e}")))
}

/// JSON text of a query payload with credentials masked.
pub fn redact_payload(payload: &Map<String, Value>) -> String {
    let redacted: Map<String, Value> = payload
        .iter()
        .map(|(key, value)| {
            if SENSITIVE_KEYS.contains(&key.to_lowercase().as_str()) {
                (key.clone(), Value::String("***".into()))
            } else {
                (key.clone(), value.clone())
            }
        })
        .collect();
    Value::Object(redacted).to_string()
}
