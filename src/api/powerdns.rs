use super::client::{ApiRequest, RawResponse, Transport, TransportError};
use super::http::HttpTransport;
use super::models::{ApiResult, ErrorBody, TRANSPORT_ERROR_CODE};
use crate::config::ClientConfig;
use crate::error::{ConfigurationError, Error, Result};
use log::{debug, info, warn};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};
use std::{collections::BTreeMap, sync::Arc, time::Duration};
use validator::Validate;

/// Client for the zone endpoints of a PowerDNS authoritative server.
///
/// Either build it ready to use with [`PowerDnsClient::new`], or start from
/// [`PowerDnsClient::default`], configure it and call
/// [`PowerDnsClient::initialize`]. Operations on a client that was never
/// initialized fail with [`ConfigurationError::NotInitialized`] and never
/// reach the network.
///
/// HTTP and transport failures are returned as [`ApiResult::Failure`], never
/// as `Err`.
#[derive(Default)]
pub struct PowerDnsClient {
    base_uri: Option<String>,
    headers: BTreeMap<String, String>,
    timeout: Option<Duration>,
    transport: Option<Arc<dyn Transport>>,
}

impl std::fmt::Debug for PowerDnsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PowerDnsClient")
            .field("base_uri", &self.base_uri)
            .field("timeout", &self.timeout)
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

impl PowerDnsClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let timeout = config.timeout();
        let mut client = Self::default();
        client.configure(config.base_uri, config.headers)?;
        client.timeout = timeout;
        client.initialize()?;
        Ok(client)
    }

    /// Wraps an already built transport. The client is initialized.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport: Some(transport),
            ..Self::default()
        }
    }

    pub fn configure(
        &mut self,
        base_uri: impl Into<String>,
        headers: BTreeMap<String, String>,
    ) -> Result<()> {
        self.set_base_uri(base_uri)?;
        self.set_headers(headers)
    }

    pub fn set_base_uri(&mut self, base_uri: impl Into<String>) -> Result<()> {
        self.ensure_pending()?;
        self.base_uri = Some(base_uri.into());
        Ok(())
    }

    pub fn set_headers(&mut self, headers: BTreeMap<String, String>) -> Result<()> {
        self.ensure_pending()?;
        self.headers = headers;
        Ok(())
    }

    pub fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.ensure_pending()?;
        self.timeout = Some(timeout);
        Ok(())
    }

    /// Validates the staged settings and binds an HTTP transport to them.
    pub fn initialize(&mut self) -> Result<()> {
        self.ensure_pending()?;
        let base_uri = self
            .base_uri
            .clone()
            .ok_or(ConfigurationError::MissingBaseUri)?;

        if self.timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(ConfigurationError::ZeroTimeout.into());
        }

        let config = ClientConfig {
            base_uri,
            headers: self.headers.clone(),
            timeout_ms: None,
        };
        config.validate().map_err(ConfigurationError::from)?;

        let transport = HttpTransport::new(&config, self.timeout)?;
        info!("Initialized PowerDNS client for {}", config.base_uri);
        self.transport = Some(Arc::new(transport));
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn is_initialized(&self) -> bool {
        self.transport.is_some()
    }

    pub async fn create_zone<T: Serialize + ?Sized>(&self, data: &T) -> Result<ApiResult> {
        let request = ApiRequest::zones(Method::POST).with_body(encode(data)?);
        self.call(request).await
    }

    pub async fn get_zone(&self, id: &str) -> Result<ApiResult> {
        self.call(zone_request(Method::GET, id)?).await
    }

    /// Fetches the zone, overlays the top-level keys of `data` and writes the
    /// result back.
    ///
    /// Nothing stops another writer from changing the zone between the GET
    /// and the PUT; such a change is overwritten. Use
    /// [`PowerDnsClient::update_zone_if_match`] when the server hands out
    /// entity tags.
    pub async fn update_zone<T: Serialize + ?Sized>(
        &self,
        id: &str,
        data: &T,
    ) -> Result<ApiResult> {
        let changes = into_object(encode(data)?, "zone update")?;
        let current = match self.get_zone(id).await? {
            ApiResult::Success(current) => current,
            failure => return Ok(failure),
        };

        let merged = merge(current, changes)?;
        self.call(zone_request(Method::PUT, id)?.with_body(merged))
            .await
    }

    /// Same as [`PowerDnsClient::update_zone`], but the PUT carries the
    /// `ETag` of the fetched zone in `If-Match`, so the server rejects it if
    /// the zone changed in between.
    pub async fn update_zone_if_match<T: Serialize + ?Sized>(
        &self,
        id: &str,
        data: &T,
    ) -> Result<ApiResult> {
        let changes = into_object(encode(data)?, "zone update")?;
        let (path, outcome) = self.round_trip(zone_request(Method::GET, id)?).await?;
        let etag = outcome.as_ref().ok().and_then(|response| response.etag.clone());
        let current = match normalize(&path, outcome)? {
            ApiResult::Success(current) => current,
            failure => return Ok(failure),
        };
        let etag = etag.ok_or_else(|| Error::MissingEntityTag(id.to_string()))?;

        let merged = merge(current, changes)?;
        let request = zone_request(Method::PUT, id)?
            .with_body(merged)
            .with_if_match(etag);
        self.call(request).await
    }

    pub async fn delete_zone(&self, id: &str) -> Result<ApiResult> {
        match self.call(zone_request(Method::DELETE, id)?).await? {
            ApiResult::Success(_) => {
                info!("Zone {} deleted", id);
                Ok(ApiResult::Success(Value::String(format!(
                    "Zone: {} has been deleted",
                    id
                ))))
            }
            failure => Ok(failure),
        }
    }

    /// Sends an RRset patch; with `changetype` REPLACE the matching RRsets
    /// are replaced by the submitted ones.
    pub async fn patch_record<T: Serialize + ?Sized>(
        &self,
        zone_id: &str,
        data: &T,
    ) -> Result<ApiResult> {
        self.patch_zone(zone_id, data).await
    }

    /// Sends an RRset patch; with `changetype` DELETE the matching RRsets are
    /// removed. The request is the same PATCH as [`PowerDnsClient::patch_record`].
    pub async fn delete_record<T: Serialize + ?Sized>(
        &self,
        zone_id: &str,
        data: &T,
    ) -> Result<ApiResult> {
        self.patch_zone(zone_id, data).await
    }

    async fn patch_zone<T: Serialize + ?Sized>(
        &self,
        zone_id: &str,
        data: &T,
    ) -> Result<ApiResult> {
        let request = zone_request(Method::PATCH, zone_id)?.with_body(encode(data)?);
        self.call(request).await
    }

    async fn call(&self, request: ApiRequest) -> Result<ApiResult> {
        let (path, outcome) = self.round_trip(request).await?;
        normalize(&path, outcome)
    }

    async fn round_trip(
        &self,
        request: ApiRequest,
    ) -> Result<(String, std::result::Result<RawResponse, TransportError>)> {
        let transport = self
            .transport
            .as_deref()
            .ok_or(ConfigurationError::NotInitialized)?;

        let path = request.path();
        debug!("Sending {} {}", request.method, path);
        let outcome = transport.send(request).await;
        Ok((path, outcome))
    }

    fn ensure_pending(&self) -> Result<()> {
        if self.is_initialized() {
            return Err(ConfigurationError::AlreadyInitialized.into());
        }
        Ok(())
    }
}

fn normalize(
    path: &str,
    outcome: std::result::Result<RawResponse, TransportError>,
) -> Result<ApiResult> {
    let response = match outcome {
        Ok(response) => response,
        Err(e) => {
            warn!("Request to {} failed: {}", path, e);
            return Ok(ApiResult::failure(TRANSPORT_ERROR_CODE, e.to_string()));
        }
    };

    if !(200..300).contains(&response.status) {
        let message = error_message(&response);
        warn!("{} answered {}: {}", path, response.status, message);
        return Ok(ApiResult::failure(i64::from(response.status), message));
    }

    // 204 No Content
    if response.body.trim().is_empty() {
        return Ok(ApiResult::Success(Value::Null));
    }

    serde_json::from_str(&response.body)
        .map(ApiResult::Success)
        .map_err(|source| Error::Decode {
            path: path.to_string(),
            source,
        })
}

fn error_message(response: &RawResponse) -> String {
    if let Ok(body) = serde_json::from_str::<ErrorBody>(&response.body) {
        return body.error;
    }

    let text = response.body.trim();
    if !text.is_empty() {
        return text.to_string();
    }

    StatusCode::from_u16(response.status)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or("Unknown error")
        .to_string()
}

/// Empty, `.` and `..` ids would be dropped or collapsed when joined onto the
/// base URI, turning a zone call into a call on the zone collection.
fn zone_request(method: Method, id: &str) -> Result<ApiRequest> {
    if matches!(id, "" | "." | "..") {
        return Err(Error::InvalidZoneId(id.to_string()));
    }
    Ok(ApiRequest::zone(method, id))
}

fn encode<T: Serialize + ?Sized>(data: &T) -> Result<Value> {
    serde_json::to_value(data).map_err(Error::Encode)
}

fn into_object(value: Value, what: &'static str) -> Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(Error::NotAnObject(what)),
    }
}

/// Shallow merge, keys of `changes` win.
fn merge(current: Value, changes: Map<String, Value>) -> Result<Value> {
    let mut merged = into_object(current, "current zone")?;
    merged.extend(changes);
    Ok(Value::Object(merged))
}
