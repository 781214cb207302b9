use super::client::{ApiRequest, RawResponse, Transport, TransportError};
use crate::config::ClientConfig;
use crate::error::ConfigurationError;
use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ETAG, IF_MATCH};
use reqwest::Url;
use std::time::Duration;

/// [`Transport`] backed by a `reqwest::Client` bound to one base URI and
/// header set.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_uri: Url,
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, TransportError> {
        let url = self.url_for(&request);
        debug!("{} {}", request.method, url);

        let mut builder = self.client.request(request.method, url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(etag) = &request.if_match {
            builder = builder.header(IF_MATCH, etag);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        Ok(RawResponse { status, etag, body })
    }
}

impl HttpTransport {
    /// `timeout` is applied to every request as given; the config's own
    /// `timeout_ms` is not consulted.
    pub fn new(
        config: &ClientConfig,
        timeout: Option<Duration>,
    ) -> Result<Self, ConfigurationError> {
        let base_uri = Url::parse(&config.base_uri).map_err(|e| {
            ConfigurationError::InvalidBaseUri {
                uri: config.base_uri.clone(),
                reason: e.to_string(),
            }
        })?;
        if base_uri.cannot_be_a_base() {
            return Err(ConfigurationError::InvalidBaseUri {
                uri: config.base_uri.clone(),
                reason: "URI cannot carry a path".to_string(),
            });
        }

        let mut builder = reqwest::Client::builder().default_headers(build_headers(config)?);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ConfigurationError::Http)?;

        Ok(Self { client, base_uri })
    }

    /// Appends the request segments to the base path, treating a base with
    /// or without a trailing slash alike.
    pub fn url_for(&self, request: &ApiRequest) -> Url {
        let mut url = self.base_uri.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(&request.segments);
        }
        url
    }
}

fn build_headers(config: &ClientConfig) -> Result<HeaderMap, ConfigurationError> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.headers {
        let invalid = |reason: String| ConfigurationError::InvalidHeader {
            name: name.clone(),
            reason,
        };
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}
