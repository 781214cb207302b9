use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs::File, io::Read, path::Path, time::Duration};
use validator::{Validate, ValidationError};

pub const API_KEY_HEADER: &str = "X-API-Key";

const JSON_MEDIA_TYPE: &str = "application/json";

// The PowerDNS API rejects requests missing any of these.
const REQUIRED_HEADERS: [&str; 3] = [API_KEY_HEADER, "Accept", "Content-Type"];

/// Connection settings for a PowerDNS HTTP API endpoint.
///
/// The YAML form mirrors the struct:
///
/// ```yaml
/// base_uri: "http://127.0.0.1:8081/api/v1/"
/// timeout_ms: 2500
/// headers:
///   X-API-Key: "changeme"
///   Accept: "application/json"
///   Content-Type: "application/json"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ClientConfig {
    #[validate(url(message = "Base URI must be an absolute URL"))]
    pub base_uri: String,

    #[serde(default)]
    #[validate(custom(function = "validate_headers"))]
    pub headers: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "Timeout must be greater than 0"))]
    pub timeout_ms: Option<u64>,
}

impl ClientConfig {
    /// Builds a config carrying the API key plus JSON `Accept` and
    /// `Content-Type` headers.
    pub fn new(base_uri: impl Into<String>, api_key: impl Into<String>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(API_KEY_HEADER.to_string(), api_key.into());
        headers.insert("Accept".to_string(), JSON_MEDIA_TYPE.to_string());
        headers.insert("Content-Type".to_string(), JSON_MEDIA_TYPE.to_string());

        Self {
            base_uri: base_uri.into(),
            headers,
            timeout_ms: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }
}

fn validate_headers(headers: &BTreeMap<String, String>) -> Result<(), ValidationError> {
    // Header names are case-insensitive on the wire, only one spelling may win
    let mut seen = BTreeMap::new();
    for name in headers.keys() {
        if let Some(previous) = seen.insert(name.to_ascii_lowercase(), name) {
            let mut error = ValidationError::new("duplicate_header");
            error.message =
                Some(format!("Headers {} and {} differ only in case", previous, name).into());
            return Err(error);
        }
    }

    for required in REQUIRED_HEADERS {
        let present = headers
            .iter()
            .any(|(name, value)| name.eq_ignore_ascii_case(required) && !value.trim().is_empty());
        if !present {
            let mut error = ValidationError::new("missing_header");
            error.message = Some(format!("Header {} is required", required).into());
            return Err(error);
        }
    }
    Ok(())
}
