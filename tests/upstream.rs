use axum::{http::header, routing::post, Router};
use borproxy::{
    jsonrpc::{JsonRpcRequest, JsonRpcResponsePayload, INTERNAL_ERROR_CODE},
    upstream::UpstreamClient,
};
use serde_json::json;
use tokio::net::TcpListener;

fn request() -> JsonRpcRequest {
    JsonRpcRequest::from_bytes(
        br#"{"jsonrpc":"2.0","method":"mev_sendBundle","params":{"bundleGasPrice":"100"},"id":9}"#,
    )
    .unwrap()
}

/// Serve a canned response body with the given content type on `/`.
async fn spawn_responder(content_type: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();

    let router = Router::new()
        .route("/", post(move || async move { ([(header::CONTENT_TYPE, content_type)], body) }));
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{address}")
}

fn assert_synthetic_error(payload: JsonRpcResponsePayload, message: &str) {
    let JsonRpcResponsePayload::Error(error) = payload else {
        panic!("expected synthetic error payload");
    };
    assert_eq!(error.code, INTERNAL_ERROR_CODE);
    assert_eq!(error.message, message);
}

#[tokio::test(flavor = "multi_thread")]
async fn transport_failure_becomes_unreachable_error() {
    let client = UpstreamClient::new("http://127.0.0.1:1".to_owned());
    let response = client.call(&request()).await;
    assert_eq!(response.id, json!(9));
    assert_synthetic_error(response.payload, "Upstream unreachable");
}

#[tokio::test(flavor = "multi_thread")]
async fn non_json_content_type_becomes_response_error() {
    let url = spawn_responder("text/plain", r#"{"jsonrpc":"2.0","result":null,"id":9}"#).await;
    let client = UpstreamClient::new(url);
    let response = client.call(&request()).await;
    assert_eq!(response.id, json!(9));
    assert_synthetic_error(response.payload, "Upstream response error");
}

#[tokio::test(flavor = "multi_thread")]
async fn undecodable_body_becomes_response_error() {
    let url = spawn_responder("application/json", "not json").await;
    let client = UpstreamClient::new(url);
    let response = client.call(&request()).await;
    assert_synthetic_error(response.payload, "Upstream response error");
}

#[tokio::test(flavor = "multi_thread")]
async fn version_mismatch_becomes_response_error() {
    let url = spawn_responder("application/json", r#"{"jsonrpc":"1.0","result":null,"id":9}"#).await;
    let client = UpstreamClient::new(url);
    let response = client.call(&request()).await;
    assert_synthetic_error(response.payload, "Upstream response error");
}

#[tokio::test(flavor = "multi_thread")]
async fn upstream_result_is_passed_through() {
    let url = spawn_responder("application/json", r#"{"jsonrpc":"2.0","result":"ok","id":9}"#).await;
    let client = UpstreamClient::new(url);
    let response = client.call(&request()).await;
    assert_eq!(response.id, json!(9));
    assert_eq!(response.payload, JsonRpcResponsePayload::Result(json!("ok")));
}
