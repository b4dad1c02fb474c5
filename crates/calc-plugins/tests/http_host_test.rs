//! Wire-level tests for `HttpPluginHost` against a simulated plugin host.

use calc_core::{HostConfig, PluginName};
use calc_plugins::{HttpPluginHost, PluginHost, UploadRequest};
use serde_json::json;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BASE: &str = "/api/calculator";

fn host_for(server: &MockServer) -> HttpPluginHost {
    HttpPluginHost::new(&HostConfig {
        base_url: format!("{}{BASE}", server.uri()),
        request_timeout_secs: 5,
    })
    .unwrap()
}

fn name(s: &str) -> PluginName {
    PluginName::new(s).unwrap()
}

// ── Listing ─────────────────────────────────────────────────────

#[tokio::test]
async fn list_plugins_reads_object_keys() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{BASE}/plugins")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Square": "com.example.Square",
            "Cube": {"version": 2}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let registry = host_for(&server).list_plugins().await.unwrap();

    let names: Vec<_> = registry.names().map(PluginName::as_str).collect();
    assert_eq!(names, ["Cube", "Square"]);
    assert_eq!(
        registry.metadata(&name("Cube")),
        Some(&json!({"version": 2}))
    );
}

#[tokio::test]
async fn list_plugins_rejects_non_object() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{BASE}/plugins")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["Square"])))
        .mount(&server)
        .await;

    let err = host_for(&server).list_plugins().await.unwrap_err();
    assert_eq!(err.kind(), calc_core::ErrorKind::InvalidResponse);
}

#[tokio::test]
async fn list_plugins_maps_status_to_host_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{BASE}/plugins")))
        .respond_with(ResponseTemplate::new(500).set_body_string("registry offline"))
        .mount(&server)
        .await;

    let err = host_for(&server).list_plugins().await.unwrap_err();
    match err {
        calc_core::Error::HostRejected { status, body, .. } => {
            assert_eq!(status, 500);
            assert_eq!(body, "registry offline");
        }
        other => panic!("expected HostRejected, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_host_is_network_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let host = HttpPluginHost::new(&HostConfig {
        base_url: format!("http://127.0.0.1:{port}{BASE}"),
        request_timeout_secs: 5,
    })
    .unwrap();

    let err = host.list_plugins().await.unwrap_err();
    assert!(err.is_network_error(), "{err:?}");
    assert!(err.is_transient());
}

// ── Upload ──────────────────────────────────────────────────────

#[tokio::test]
async fn upload_sends_name_as_query_and_source_as_body() {
    let server = MockServer::start().await;
    let source = "public class Square { }";
    Mock::given(method("POST"))
        .and(path(format!("{BASE}/upload-plugin")))
        .and(query_param("className", "Square"))
        .and(header("content-type", "text/plain; charset=utf-8"))
        .and(body_string(source))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    host_for(&server)
        .upload_plugin(&UploadRequest::new(name("Square"), source))
        .await
        .unwrap();
}

#[tokio::test]
async fn upload_rejection_carries_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{BASE}/upload-plugin")))
        .respond_with(ResponseTemplate::new(400).set_body_string("compilation failed"))
        .mount(&server)
        .await;

    let err = host_for(&server)
        .upload_plugin(&UploadRequest::new(name("Broken"), "class {"))
        .await
        .unwrap_err();
    assert!(err.is_host_rejected());
    assert!(err.to_string().contains("compilation failed"));
}

// ── Invocation ──────────────────────────────────────────────────

#[tokio::test]
async fn calculate_sends_operand_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{BASE}/calculate/Square")))
        .and(query_param("value", "1.50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(2.25)))
        .expect(1)
        .mount(&server)
        .await;

    let value = host_for(&server)
        .calculate(&name("Square"), "1.50")
        .await
        .unwrap();
    assert!((value - 2.25).abs() < f64::EPSILON);
}

#[tokio::test]
async fn calculate_accepts_numeric_like_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{BASE}/calculate/AsString")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("-7.5")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{BASE}/calculate/Bare")))
        .respond_with(ResponseTemplate::new(200).set_body_string("Infinity"))
        .mount(&server)
        .await;

    let host = host_for(&server);
    let from_string = host.calculate(&name("AsString"), "1").await.unwrap();
    assert!((from_string + 7.5).abs() < f64::EPSILON);
    let bare = host.calculate(&name("Bare"), "1").await.unwrap();
    assert!(bare.is_infinite());
}

#[tokio::test]
async fn calculate_rejects_non_numeric_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{BASE}/calculate/Square")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": 4})))
        .mount(&server)
        .await;

    let err = host_for(&server)
        .calculate(&name("Square"), "2")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), calc_core::ErrorKind::InvalidResponse);
}

#[tokio::test]
async fn calculate_encodes_plugin_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{BASE}/calculate/Half%20Up")))
        .respond_with(ResponseTemplate::new(200).set_body_string("3"))
        .expect(1)
        .mount(&server)
        .await;

    let value = host_for(&server)
        .calculate(&name("Half Up"), "5")
        .await
        .unwrap();
    assert!((value - 3.0).abs() < f64::EPSILON);
}
