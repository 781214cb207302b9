use crate::api::{ApiRequest, ApiResult, HttpTransport, PowerDnsClient, Zone, ZoneKind};
use crate::config::ClientConfig;
use reqwest::Method;
use serde_json::json;
use std::time::{Duration, Instant};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test_key";

fn client_for(server: &MockServer) -> PowerDnsClient {
    super::init_logging();
    let config = ClientConfig::new(format!("{}/api/v1", server.uri()), API_KEY);
    PowerDnsClient::new(config).unwrap()
}

#[tokio::test]
async fn test_create_zone_scenario() {
    let server = MockServer::start().await;
    let zone = json!({
        "name": "test2.org",
        "kind": "Native",
        "masters": [],
        "nameservers": []
    });

    Mock::given(method("POST"))
        .and(path("/api/v1/servers/localhost/zones"))
        .and(header("X-API-Key", API_KEY))
        .and(header("Accept", "application/json"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(&zone))
        .respond_with(ResponseTemplate::new(201).set_body_json(&zone))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client
        .create_zone(&Zone::new("test2.org", ZoneKind::Native))
        .await
        .unwrap();

    let created = result.success().unwrap();
    assert_eq!(created["name"], "test2.org");
}

#[tokio::test]
async fn test_get_zone_not_found_scenario() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/servers/localhost/zones/test2.org"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Not Found"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.get_zone("test2.org").await.unwrap();

    assert_eq!(result, ApiResult::failure(404, "Not Found"));
}

#[tokio::test]
async fn test_update_zone_puts_merged_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/servers/localhost/zones/test2.org."))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "test2.org.",
            "kind": "Native",
            "masters": [],
            "serial": 7
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/servers/localhost/zones/test2.org."))
        .and(body_json(json!({
            "name": "test2.org.",
            "kind": "Slave",
            "masters": ["192.0.2.1"],
            "serial": 7
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client
        .update_zone(
            "test2.org.",
            &json!({"kind": "Slave", "masters": ["192.0.2.1"]}),
        )
        .await
        .unwrap();

    assert!(result.is_success());
}

#[tokio::test]
async fn test_update_zone_if_match_round_trips_etag() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/servers/localhost/zones/test2.org."))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"abc123\"")
                .set_body_json(json!({"name": "test2.org.", "kind": "Native"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/servers/localhost/zones/test2.org."))
        .and(header("If-Match", "\"abc123\""))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client
        .update_zone_if_match("test2.org.", &json!({"kind": "Master"}))
        .await
        .unwrap();

    assert_eq!(result, ApiResult::Success(serde_json::Value::Null));
}

#[tokio::test]
async fn test_delete_zone_scenario() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/servers/localhost/zones/test2.org."))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.delete_zone("test2.org.").await.unwrap();

    assert_eq!(
        result,
        ApiResult::Success(json!("Zone: test2.org. has been deleted"))
    );
}

#[tokio::test]
async fn test_patch_record_scenario() {
    let server = MockServer::start().await;
    let patch = json!({
        "rrsets": [{
            "name": "www.test2.org.",
            "type": "A",
            "changetype": "REPLACE",
            "ttl": 3600,
            "records": [{"content": "192.0.2.10", "disabled": false}],
            "comments": []
        }]
    });

    Mock::given(method("PATCH"))
        .and(path("/api/v1/servers/localhost/zones/test2.org."))
        .and(body_json(&patch))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/api/v1/servers/localhost/zones/missing.org."))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "zone not found"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);

    let result = client.patch_record("test2.org.", &patch).await.unwrap();
    assert!(result.is_success());

    let result = client.delete_record("missing.org.", &patch).await.unwrap();
    assert_eq!(result, ApiResult::failure(404, "zone not found"));
}

#[tokio::test]
async fn test_server_error_is_normalized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.get_zone("test2.org.").await.unwrap();

    assert_eq!(result, ApiResult::failure(500, "Internal Server Error"));
}

fn failure_message(result: ApiResult) -> String {
    match result {
        ApiResult::Failure { message, .. } => message,
        ApiResult::Success(value) => panic!("expected a failure, got {}", value),
    }
}

#[tokio::test]
async fn test_unreachable_host_is_failure() {
    super::init_logging();
    // Nothing listens on port 1
    let config = ClientConfig::new("http://127.0.0.1:1/api/v1/", API_KEY)
        .with_timeout(Duration::from_secs(2));
    let client = PowerDnsClient::new(config).unwrap();

    let result = client.get_zone("test2.org.").await.unwrap();
    assert_eq!(result.error_code(), Some(0));
    assert!(failure_message(result).starts_with("connection failed: "));

    let result = client
        .create_zone(&Zone::new("test2.org.", ZoneKind::Native))
        .await
        .unwrap();
    assert_eq!(result.error_code(), Some(0));
}

#[tokio::test]
async fn test_sub_second_timeout_is_applied() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let config =
        ClientConfig::new(server.uri(), API_KEY).with_timeout(Duration::from_millis(250));
    let client = PowerDnsClient::new(config).unwrap();

    let started = Instant::now();
    let result = client.get_zone("test2.org.").await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(result.error_code(), Some(0));
    assert!(failure_message(result).starts_with("request timed out: "));
    // Rounding up to a whole second would hold the call for at least 1s
    assert!(elapsed < Duration::from_millis(900), "took {:?}", elapsed);
}

#[tokio::test]
async fn test_extra_config_header_reaches_server() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/servers/localhost/zones/test2.org."))
        .and(header("X-API-Key", API_KEY))
        .and(header("X-Request-Source", "zone-sync"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "test2.org."})))
        .expect(1)
        .mount(&server)
        .await;

    let config =
        ClientConfig::new(server.uri(), API_KEY).with_header("X-Request-Source", "zone-sync");
    let client = PowerDnsClient::new(config).unwrap();

    let result = client.get_zone("test2.org.").await.unwrap();
    assert_eq!(result.success().unwrap()["name"], "test2.org.");
}

#[test]
fn test_url_for_ignores_trailing_slash() {
    let request = ApiRequest::zone(Method::GET, "test2.org.");

    let with_slash = HttpTransport::new(
        &ClientConfig::new("http://127.0.0.1:8081/api/v1/", API_KEY),
        None,
    )
    .unwrap();
    let without_slash = HttpTransport::new(
        &ClientConfig::new("http://127.0.0.1:8081/api/v1", API_KEY),
        None,
    )
    .unwrap();

    let expected = "http://127.0.0.1:8081/api/v1/servers/localhost/zones/test2.org.";
    assert_eq!(with_slash.url_for(&request).as_str(), expected);
    assert_eq!(without_slash.url_for(&request).as_str(), expected);
}

#[test]
fn test_url_for_encodes_zone_id() {
    let transport =
        HttpTransport::new(&ClientConfig::new("http://localhost:8081/", API_KEY), None).unwrap();
    let request = ApiRequest::zone(Method::GET, "bad zone/.org");

    assert_eq!(
        transport.url_for(&request).as_str(),
        "http://localhost:8081/servers/localhost/zones/bad%20zone%2F.org"
    );
}
