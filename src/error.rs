use thiserror::Error;

/// Faults that are not HTTP outcomes. Anything the server or the network
/// answers with is reported as [`crate::ApiResult::Failure`] instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("expected a JSON object for {0}")]
    NotAnObject(&'static str),

    #[error("{0:?} is not a usable zone id")]
    InvalidZoneId(String),

    #[error("zone {0} was served without an entity tag")]
    MissingEntityTag(String),
}

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("client is not initialized, call initialize() before issuing requests")]
    NotInitialized,

    #[error("client is already initialized")]
    AlreadyInitialized,

    #[error("base URI is not set")]
    MissingBaseUri,

    #[error("invalid base URI {uri}: {reason}")]
    InvalidBaseUri { uri: String, reason: String },

    #[error("invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,

    #[error("invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    #[error("failed to build HTTP client: {0}")]
    Http(#[source] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
