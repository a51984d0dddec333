//! HTTP transport.
//!
//! `Transport` is the seam between query building and the network: the
//! client hands it an endpoint and form fields and gets back the raw status,
//! headers and body. `HttpTransport` is the blocking reqwest implementation;
//! tests provide their own.

use crate::error::{Error, Result};
use reqwest::blocking::Client;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::borrow::Cow;

/// Header carrying the request id of the first token handshake step
pub const SERVICE_REQUEST_ID: &str = "service_request_id";
/// Header naming a downloaded report
pub const FILENAME: &str = "filename";

/// One POST of form-encoded data.
pub trait Transport {
    fn post(&self, endpoint: &str, form: &[(String, String)]) -> Result<RawResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn post(&self, endpoint: &str, form: &[(String, String)]) -> Result<RawResponse> {
        (**self).post(endpoint, form)
    }
}

/// Undecoded answer from the service.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// Attach a header; names and values that are not valid HTTP are skipped.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            reqwest::header::HeaderName::from_bytes(name.as_bytes()),
            reqwest::header::HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == StatusCode::OK
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Value of a header that must be present.
    pub fn header(&self, name: &str) -> Result<&str> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| Error::missing_header(name))
    }

    /// Suggested file name of a report download.
    pub fn filename(&self) -> Result<&str> {
        self.header(FILENAME)
    }
}

/// Blocking reqwest transport.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("reporter-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post(&self, endpoint: &str, form: &[(String, String)]) -> Result<RawResponse> {
        let res = self.client.post(endpoint).form(form).send()?;
        let status = res.status();
        let headers = res.headers().clone();
        let body = res.bytes()?.to_vec();
        tracing::debug!(%endpoint, %status, bytes = body.len(), "Received response");
        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
