// Common test utilities and types
// This module is shared across all integration tests

use alloy_primitives::{hex, keccak256, Address};
use alloy_signer::SignerSync as _;
use alloy_signer_local::PrivateKeySigner;
use axum::{extract::State, routing::post, Json, Router};
use borproxy::{
    cli::GatewayArgs,
    consts::{BUNDLE_SIGNING_PREFIX, MARLIN_SIGNATURE_HEADER},
    jsonrpc::{JsonRpcRequest, JsonRpcResponse},
};
use reqwest::header;
use serde_json::{json, Value};
use std::{net::SocketAddr, time::Duration};
use tokio::{net::TcpListener, sync::mpsc};

pub(crate) struct GatewayClient {
    pub(crate) url: String,
    pub(crate) client: reqwest::Client,
    pub(crate) signer: PrivateKeySigner,
}

/// Spawn the gateway backed by a mock subgraph that whitelists the returned
/// client's signer.
pub(crate) async fn spawn_gateway(args: GatewayArgs) -> GatewayClient {
    let signer = PrivateKeySigner::random();
    let whitelist = vec![signer.address()];
    spawn_gateway_with_whitelist(args, signer, whitelist).await
}

pub(crate) async fn spawn_gateway_with_whitelist(
    args: GatewayArgs,
    signer: PrivateKeySigner,
    whitelist: Vec<Address>,
) -> GatewayClient {
    let subgraph_url = spawn_subgraph(whitelist).await;
    let args = args.subgraph_base_url(subgraph_url).whitelist_refresh_secs(1);

    let listener = TcpListener::bind(args.listen_addr).await.unwrap();
    let address = listener.local_addr().unwrap();

    tokio::spawn(async move {
        borproxy::run_with_listener(args, listener).await.unwrap();
    });

    GatewayClient {
        url: format!("http://{address}"),
        client: reqwest::Client::default(),
        signer,
    }
}

/// Serve a fixed keystore list on any path, mimicking the subgraph endpoint.
async fn spawn_subgraph(whitelist: Vec<Address>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();

    let keystores: Vec<Value> =
        whitelist.iter().map(|address| json!({ "key": format!("{address:#x}") })).collect();
    let body = json!({ "data": { "keystores": keystores } });

    async fn serve(State(body): State<Value>) -> Json<Value> {
        Json(body)
    }

    let router = Router::new().fallback(serve).with_state(body);
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{address}")
}

impl GatewayClient {
    /// Sign the raw `params` bytes the way searchers do: keccak over the Bor
    /// bundle prefix plus the params, compact `r || s || v` hex with a `0x`
    /// prefix. `v` uses the {27,28} convention.
    pub(crate) fn signature_header(&self, params: &[u8]) -> String {
        let mut message = BUNDLE_SIGNING_PREFIX.to_vec();
        message.extend_from_slice(params);
        let signature = self.signer.sign_hash_sync(&keccak256(&message)).unwrap();

        let mut raw = [0u8; 65];
        raw[..32].copy_from_slice(&signature.r().to_be_bytes::<32>());
        raw[32..64].copy_from_slice(&signature.s().to_be_bytes::<32>());
        raw[64] = 27 + signature.v() as u8;
        format!("0x{}", hex::encode(raw))
    }

    pub(crate) async fn send_body(
        &self,
        body: String,
        signature: Option<String>,
    ) -> reqwest::Response {
        let mut request = self
            .client
            .post(&self.url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(signature) = signature {
            request = request.header(MARLIN_SIGNATURE_HEADER, signature);
        }
        request.send().await.unwrap()
    }

    pub(crate) async fn send_rpc(&self, method: &str, params: &Value, id: u64) -> reqwest::Response {
        let params_raw = serde_json::to_string(params).unwrap();
        let body =
            format!(r#"{{"jsonrpc":"2.0","method":"{method}","params":{params_raw},"id":{id}}}"#);
        let signature = self.signature_header(params_raw.as_bytes());
        self.send_body(body, Some(signature)).await
    }

    pub(crate) async fn send_bundle(&self, bundle_gas_price: &str, id: u64) -> reqwest::Response {
        let params = json!({ "bundleGasPrice": bundle_gas_price, "txs": ["0x02deadbeef"] });
        self.send_rpc("eth_sendBundle", &params, id).await
    }

    /// The whitelist publisher picks up the mock subgraph asynchronously.
    /// Poll with a signed no-op request until the gateway recognizes the
    /// signer.
    pub(crate) async fn wait_until_whitelisted(&self) {
        for _ in 0..200 {
            let response = self.send_rpc("net_version", &json!([]), 0).await;
            if response.status().is_success() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        panic!("gateway never picked up the whitelist");
    }
}

pub(crate) struct UpstreamReceiver {
    pub(crate) local_addr: SocketAddr,
    pub(crate) receiver: mpsc::Receiver<JsonRpcRequest>,
}

impl UpstreamReceiver {
    /// Spawn a mock validator RPC that records every dispatched request.
    pub(crate) async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        let (sender, receiver) = mpsc::channel(128);

        let router = Router::new().route("/", post(Self::receive)).with_state(sender);
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        UpstreamReceiver { local_addr: address, receiver }
    }

    pub(crate) fn url(&self) -> String {
        format!("http://{}", self.local_addr)
    }

    /// Receive the next dispatched request, failing the test on a stall.
    pub(crate) async fn recv(&mut self) -> JsonRpcRequest {
        tokio::time::timeout(Duration::from_secs(10), self.receiver.recv())
            .await
            .expect("timed out waiting for upstream dispatch")
            .expect("upstream receiver channel closed")
    }

    async fn receive(
        State(sender): State<mpsc::Sender<JsonRpcRequest>>,
        body: axum::body::Bytes,
    ) -> JsonRpcResponse {
        let request = JsonRpcRequest::from_bytes(&body).unwrap();
        let id = request.id.clone();
        sender.send(request).await.unwrap();
        JsonRpcResponse::result(id, Value::Null)
    }
}
