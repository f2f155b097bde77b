use crate::{
    consts::{DEFAULT_HTTP_TIMEOUT_SECS, MAX_RESPONSE_BODY_BYTES},
    jsonrpc::{is_json_content_type, JsonRpcRequest, JsonRpcResponse, INTERNAL_ERROR_CODE, JSONRPC_VERSION_2},
    utils::read_body_capped,
};
use axum::http::header;
use std::time::Duration;
use tracing::debug;

const UPSTREAM: &str = "upstream";

/// Failure modes of an upstream call. Never surfaced to searchers, only
/// collapsed into the synthetic response message.
#[derive(Debug, thiserror::Error)]
enum UpstreamError {
    /// The request never produced an HTTP response.
    #[error("Upstream unreachable")]
    Unreachable(#[source] reqwest::Error),
    /// The response violated the JSON-RPC contract.
    #[error("Upstream response error")]
    Response,
}

/// Client for the upstream validator RPC.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    inner: reqwest::Client,
    url: String,
}

impl UpstreamClient {
    /// Create a new upstream client with a fixed HTTP timeout.
    pub fn new(url: String) -> Self {
        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))
            .build()
            .expect("to build reqwest client");
        Self { inner, url }
    }

    /// Forward a JSON-RPC request upstream. Always yields a response: any
    /// transport or protocol failure becomes a synthetic `-32603` error
    /// echoing the request id. Retry policy lives with the epoch scheduler,
    /// not here.
    pub async fn call(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        match self.try_call(request).await {
            Ok(response) => response,
            Err(error) => {
                debug!(target: UPSTREAM, %error, url = %self.url, "Upstream call failed");
                JsonRpcResponse::error(request.id.clone(), INTERNAL_ERROR_CODE, error.to_string())
            }
        }
    }

    async fn try_call(&self, request: &JsonRpcRequest) -> Result<JsonRpcResponse, UpstreamError> {
        let response = self
            .inner
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(UpstreamError::Unreachable)?;

        let is_json = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(is_json_content_type);
        if !is_json {
            return Err(UpstreamError::Response);
        }

        let body = read_body_capped(response, MAX_RESPONSE_BODY_BYTES)
            .await
            .map_err(|_| UpstreamError::Response)?;
        let decoded: JsonRpcResponse =
            serde_json::from_slice(&body).map_err(|_| UpstreamError::Response)?;
        if decoded.jsonrpc != JSONRPC_VERSION_2 {
            return Err(UpstreamError::Response);
        }

        Ok(decoded)
    }
}
