//! Query construction.
//!
//! Every request is a form with a single `jsonRequest` field holding a JSON
//! object. The object always starts with `userid`, `mode`, `version` and
//! `queryInput`; the last one is the command string
//! `[p=Reporter.properties, <Service>.<operation>, <arg>,<arg>,...]`.

use crate::config::Credentials;
use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::fmt;

/// Protocol version sent with every query
pub const VERSION: &str = "2.2";

const PROPERTIES: &str = "p=Reporter.properties";

/// Reporting service a command belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[value(rename_all = "PascalCase")]
pub enum Service {
    Sales,
    Finance,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Sales => "Sales",
            Service::Finance => "Finance",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A service instruction with its positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    service: Service,
    operation: &'static str,
    args: Vec<String>,
}

impl Command {
    pub fn new(service: Service, operation: &'static str) -> Self {
        Self {
            service,
            operation,
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn service(&self) -> Service {
        self.service
    }

    /// Arguments are joined without escaping, so a comma would shift every
    /// argument after it.
    pub fn validate(&self) -> Result<()> {
        match self.args.iter().find(|a| a.contains(',')) {
            Some(value) => Err(Error::InvalidArgument {
                value: value.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}.{}", PROPERTIES, self.service, self.operation)?;
        if !self.args.is_empty() {
            write!(f, ", {}", self.args.join(","))?;
        }
        f.write_str("]")
    }
}

/// Builds the form body for one request.
#[derive(Debug)]
pub struct QueryBuilder<'a> {
    credentials: &'a Credentials,
    command: Command,
    params: Vec<(&'static str, String)>,
    url_params: Vec<(&'static str, String)>,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(credentials: &'a Credentials, command: Command) -> Self {
        Self {
            credentials,
            command,
            params: Vec::new(),
            url_params: Vec::new(),
        }
    }

    /// Add a field to the JSON payload.
    pub fn param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.params.push((key, value.into()));
        self
    }

    /// Add the stored access token, or nothing when none is configured.
    /// The service rejects the request in that case.
    pub fn access_token(self) -> Self {
        match self.credentials.token.clone() {
            Some(token) => self.param("accesstoken", token),
            None => self,
        }
    }

    pub fn password(self) -> Self {
        let password = self.credentials.password.clone();
        self.param("password", password)
    }

    /// Add a form field outside the JSON payload.
    pub fn url_param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.url_params.push((key, value.into()));
        self
    }

    pub fn build(self) -> Result<Query> {
        self.command.validate()?;

        let mut payload = Map::new();
        payload.insert("userid".into(), Value::String(self.credentials.email.clone()));
        payload.insert("mode".into(), Value::String(self.credentials.mode.to_string()));
        payload.insert("version".into(), Value::String(VERSION.into()));
        payload.insert("queryInput".into(), Value::String(self.command.to_string()));
        for (key, value) in self.params {
            payload.insert(key.into(), Value::String(value));
        }

        Ok(Query {
            command: self.command,
            payload,
            url_params: self.url_params,
        })
    }
}

/// A fully built request.
#[derive(Debug, Clone)]
pub struct Query {
    pub command: Command,
    pub payload: Map<String, Value>,
    pub url_params: Vec<(&'static str, String)>,
}

impl Query {
    /// Form fields in send order: `jsonRequest` first, then URL params.
    pub fn form(&self) -> Result<Vec<(String, String)>> {
        let mut form = vec![(
            "jsonRequest".to_string(),
            serde_json::to_string(&self.payload)?,
        )];
        form.extend(
            self.url_params
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone())),
        );
        Ok(form)
    }
}
