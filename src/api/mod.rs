pub mod client;
pub mod http;
pub mod models;
pub mod powerdns;

pub use client::{ApiRequest, RawResponse, Transport, TransportError, TransportErrorKind};
pub use http::HttpTransport;
pub use models::*;
pub use powerdns::PowerDnsClient;
