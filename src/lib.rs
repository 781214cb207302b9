//! Client for the zone and RRset endpoints of the PowerDNS authoritative
//! server HTTP API.
//!
//! ```no_run
//! use powerdns_client::{ClientConfig, PowerDnsClient, Zone, ZoneKind};
//!
//! # async fn example() -> Result<(), powerdns_client::Error> {
//! let client = PowerDnsClient::new(ClientConfig::new("http://127.0.0.1:8081/api/v1/", "changeme"))?;
//!
//! let created = client.create_zone(&Zone::new("test2.org.", ZoneKind::Native)).await?;
//! println!("{:?}", created);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;

pub use api::{
    ApiRequest, ApiResult, ChangeType, Comment, HttpTransport, PowerDnsClient, RRSetChange,
    RRSetPatch, RawResponse, Record, Transport, TransportError, TransportErrorKind, Zone,
    ZoneKind, TRANSPORT_ERROR_CODE,
};
pub use config::{ClientConfig, API_KEY_HEADER};
pub use error::{ConfigurationError, Error, Result};

#[cfg(test)]
mod tests;
