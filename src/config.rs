//! Credential file handling.
//!
//! The client reads its identity from a small YAML file:
//!
//! ```yaml
//! email: finance@example.com
//! password: app-specific-password
//! mode: Robot.XML
//! token: 4a1b9a2c-...
//! ```
//!
//! `sales_endpoint` and `finance_endpoint` may be added to point the client
//! at another deployment. The file is rewritten after a token is generated.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

pub const SALES_ENDPOINT: &str = "https://reportingitc-reporter.apple.com/reportservice/sales/v1";
pub const FINANCE_ENDPOINT: &str =
    "https://reportingitc-reporter.apple.com/reportservice/finance/v1";

/// Response mode requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    #[serde(rename = "Robot.XML")]
    RobotXml,
    Normal,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::RobotXml => "Robot.XML",
            Mode::Normal => "Normal",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contents of the credential file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account e-mail, sent as the `userid` of every query
    pub email: String,
    pub password: String,
    pub mode: Mode,
    /// Access token issued by `generate-token`
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finance_endpoint: Option<String>,
    /// Keys this client does not use, written back unchanged
    #[serde(flatten)]
    pub extra: serde_yaml::Mapping,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            mode: Mode::default(),
            token: None,
            sales_endpoint: None,
            finance_endpoint: None,
            extra: serde_yaml::Mapping::new(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn endpoints(&self) -> Endpoints {
        let defaults = Endpoints::default();
        Endpoints {
            sales: self.sales_endpoint.clone().unwrap_or(defaults.sales),
            finance: self.finance_endpoint.clone().unwrap_or(defaults.finance),
        }
    }
}

/// The two service URLs queries are posted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub sales: String,
    pub finance: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            sales: SALES_ENDPOINT.to_string(),
            finance: FINANCE_ENDPOINT.to_string(),
        }
    }
}

/// Credentials together with the file they were read from.
///
/// A store without a path lives only in memory; `save` is then a no-op.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: Option<PathBuf>,
    credentials: Credentials,
}

impl CredentialStore {
    pub fn in_memory(credentials: Credentials) -> Self {
        Self {
            path: None,
            credentials,
        }
    }

    /// Load the credential file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let credentials: Credentials = serde_yaml::from_str(&content)?;

        if credentials.email.is_empty() {
            return Err(Error::config(format!(
                "{}: 'email' must not be empty",
                path.display()
            )));
        }
        if !credentials.token.as_deref().is_some_and(|t| !t.is_empty()) {
            tracing::warn!(path = %path.display(), "No access token configured");
        }

        tracing::debug!(path = %path.display(), mode = %credentials.mode, "Loaded credentials");
        Ok(Self {
            path: Some(path.to_path_buf()),
            credentials,
        })
    }

    /// Resolve the credential file location: an explicit path wins, then
    /// `config.yaml` in the working directory, then the user config dir.
    pub fn locate(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return local;
        }
        dirs::config_dir()
            .map(|d| d.join("reporter").join(DEFAULT_CONFIG_FILE))
            .filter(|p| p.exists())
            .unwrap_or(local)
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn token(&self) -> Option<&str> {
        self.credentials.token.as_deref()
    }

    pub fn has_token(&self) -> bool {
        self.token().is_some_and(|t| !t.is_empty())
    }

    /// Replace the access token and write the file back.
    pub fn set_token(&mut self, token: impl Into<String>) -> Result<()> {
        self.credentials.token = Some(token.into());
        self.save()
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let yaml = serde_yaml::to_string(&self.credentials)?;
        fs::write(path, yaml)?;
        tracing::info!(path = %path.display(), "Saved credentials");
        Ok(())
    }
}
