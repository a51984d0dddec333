// Library root
// -----------
// The binary (`main.rs`) is a thin shell around these modules.
//
// Module responsibilities:
// - `api`: `ReportingClient`, one method per service operation.
// - `query`: command strings and the `jsonRequest` form body.
// - `transport`: the `Transport` seam and its reqwest implementation.
// - `decode`: XML response shapes and their decoders.
// - `config`: the YAML credential file.
// - `reply`: results of operations that report failures as text.
// - `cli` and `ui`: argument definitions and the terminal flows.
pub mod api;
pub mod cli;
pub mod config;
pub mod decode;
pub mod error;
pub mod logging;
pub mod query;
pub mod reply;
pub mod transport;
pub mod ui;

pub use api::ReportingClient;
pub use config::{CredentialStore, Credentials, Endpoints, Mode};
pub use error::{Error, Result};
pub use query::Service;
pub use reply::Reply;
pub use transport::{HttpTransport, RawResponse, Transport};
