//! `ApiClient` against a mock HTTP server.
//!
//! The client is blocking, so the mock server is driven from a separate tokio
//! runtime and the client is called outside of it.

use std::time::Duration;

use amplipi::models::{GroupCreate, GroupUpdate, MultiZoneUpdate, ZoneUpdate};
use amplipi::{AmpError, ApiClient, DeviceApi, GroupId, SourceId, ZoneId};
use serde_json::json;
use tokio::runtime::Runtime;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sample_status() -> serde_json::Value {
    json!({
        "sources": [
            {"id": 0, "name": "Turntable", "input": "local"},
            {"id": 1, "name": "Radio", "input": "stream=1000"}
        ],
        "zones": [
            {"id": 0, "name": "Kitchen", "source_id": 0, "vol_f": 0.25, "mute": false, "disabled": false},
            {"id": 1, "name": "Patio", "source_id": -1, "vol_f": 0.5, "mute": true, "disabled": false}
        ],
        "groups": [
            {"id": 100, "name": "Downstairs", "source_id": 0, "zones": [0, 1], "vol_f": 0.375, "mute": false}
        ],
        "streams": [{"id": 1000, "name": "Jazz", "type": "internetradio"}],
        "info": {"version": "0.4.0", "online": true}
    })
}

// `server` is declared first so its expectations are verified before the
// runtime shuts down.
struct TestServer {
    server: MockServer,
    runtime: Runtime,
}

impl TestServer {
    fn start() -> Self {
        let runtime = Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());
        Self { server, runtime }
    }

    fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    fn client(&self) -> ApiClient {
        ApiClient::new(&self.server.uri(), Duration::from_secs(2)).unwrap()
    }
}

#[test]
fn test_status_parses_snapshot() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("GET"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_status())),
    );

    let status = server.client().status().unwrap();

    assert_eq!(status.sources.len(), 2);
    assert_eq!(status.zones[0].source_id, Some(SourceId(0)));
    assert_eq!(status.zones[1].source_id, None);
    assert!(status.zones[1].mute);
    assert_eq!(status.groups[0].zones, vec![ZoneId(0), ZoneId(1)]);
    assert_eq!(status.streams[0].kind, "internetradio");
    assert!(status.info.online);
}

#[test]
fn test_update_zones_sends_delta_body() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("PATCH"))
            .and(path("/api/zones"))
            .and(body_json(json!({
                "zones": [0, 1],
                "update": {"vol_delta_f": 0.25}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_status()))
            .expect(1),
    );

    let update = MultiZoneUpdate::volume_delta(vec![ZoneId(0), ZoneId(1)], 0.25);
    let status = server.client().update_zones(&update).unwrap();

    assert_eq!(status.zones.len(), 2);
}

#[test]
fn test_update_zone_and_group_paths() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("PATCH"))
            .and(path("/api/zones/1"))
            .and(body_json(json!({"mute": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_status()))
            .expect(1),
    );
    server.mount(
        Mock::given(method("PATCH"))
            .and(path("/api/groups/100"))
            .and(body_json(json!({"mute": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_status()))
            .expect(1),
    );

    let client = server.client();
    client.update_zone(ZoneId(1), &ZoneUpdate::mute(false)).unwrap();
    client
        .update_group(GroupId(100), &GroupUpdate::mute(true))
        .unwrap();
}

#[test]
fn test_create_and_delete_group() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("POST"))
            .and(path("/api/group"))
            .and(body_json(json!({"name": "Upstairs", "zones": [2, 3]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 101, "name": "Upstairs", "zones": [2, 3]
            }))),
    );
    server.mount(
        Mock::given(method("DELETE"))
            .and(path("/api/groups/101"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_status())),
    );

    let client = server.client();
    let group = client
        .create_group(&GroupCreate {
            name: "Upstairs".to_string(),
            zones: vec![ZoneId(2), ZoneId(3)],
        })
        .unwrap();
    assert_eq!(group.id, GroupId(101));
    assert_eq!(group.zones, vec![ZoneId(2), ZoneId(3)]);

    client.delete_group(group.id).unwrap();
}

#[test]
fn test_error_status_is_http_error() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("PATCH"))
            .and(path("/api/zones/7"))
            .respond_with(ResponseTemplate::new(404).set_body_string("zone 7 not found")),
    );

    let result = server.client().update_zone(ZoneId(7), &ZoneUpdate::volume(0.5));

    match result {
        Err(AmpError::Http { status, body }) => {
            assert_eq!(status, 404);
            assert!(body.contains("not found"));
        }
        other => panic!("Expected Http error, got {:?}", other),
    }
}

#[test]
fn test_malformed_body_is_decode_error() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("GET"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>")),
    );

    let result = server.client().status();

    assert!(matches!(result, Err(AmpError::Decode(_))));
}

#[test]
fn test_unreachable_device_is_transient() {
    let client = ApiClient::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();

    let err = client.status().unwrap_err();

    assert!(matches!(err, AmpError::Communication(_)));
    assert!(err.is_transient());
}
