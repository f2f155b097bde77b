//! Searcher-facing JSON-RPC ingress.

use crate::{
    consts::{BUNDLE_SIGNING_PREFIX, ETH_SEND_BUNDLE_METHOD, MARLIN_SIGNATURE_HEADER, QUEUED_FOR_DISPATCH_RESULT},
    jsonrpc::{
        is_json_content_type, JsonRpcRequest, JsonRpcResponse, METHOD_NOT_FOUND_CODE,
    },
    queue::{BundleItem, BundleQueue},
    whitelist::WhitelistHandle,
};
use alloy_consensus::crypto::secp256k1::recover_signer;
use alloy_primitives::{hex, keccak256, Address, U256};
use alloy_signer::Signature;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, trace};

pub mod error;
use error::IngressError;

const INGRESS: &str = "ingress";

/// Shared state of the searcher ingress: the whitelist snapshot handle and
/// the pending bundle queue.
#[derive(Debug)]
pub struct BundleIngress {
    pub whitelist: WhitelistHandle,
    pub queue: Arc<BundleQueue>,
}

impl BundleIngress {
    /// Axum handler for `/`. Rejections map to plain 4xx responses; anything
    /// that passes the gate gets a JSON-RPC response at HTTP 200.
    pub async fn handle(
        State(ingress): State<Arc<Self>>,
        method: Method,
        headers: HeaderMap,
        body: Bytes,
    ) -> Response {
        match ingress.handle_rpc(method, &headers, body.as_ref()) {
            Ok(response) => response.into_response(),
            Err(error) => {
                trace!(target: INGRESS, %error, "Rejecting request");
                error.into_response()
            }
        }
    }

    fn handle_rpc(
        &self,
        method: Method,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<JsonRpcResponse, IngressError> {
        if method != Method::POST {
            return Err(IngressError::NotFound);
        }

        let body_length = validate_content_headers(headers)?;
        let body = &body[..body.len().min(body_length)];

        let request =
            JsonRpcRequest::from_bytes(body).map_err(|_| IngressError::RequestDecode)?;

        let signer = recover_bundle_signer(headers, request.params_bytes())?;

        // The gate. A stable snapshot is held for the whole membership check.
        let whitelist = self.whitelist.load();
        if whitelist.binary_search(&signer).is_err() {
            return Err(IngressError::NotWhitelisted);
        }
        debug!(target: INGRESS, address = %signer, method = request.method, "Bundle received");

        if request.method == ETH_SEND_BUNDLE_METHOD {
            self.enqueue_bundle(request)
        } else {
            Ok(JsonRpcResponse::error(request.id, METHOD_NOT_FOUND_CODE, "Method not found"))
        }
    }

    fn enqueue_bundle(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse, IngressError> {
        let bundle_gas_price = parse_bundle_gas_price(request.params_bytes())?;
        let id = request.id.clone();

        self.queue
            .push(BundleItem { request, bundle_gas_price, retry_count: 0 })
            .map_err(|_| IngressError::QueueFull)?;

        trace!(target: INGRESS, %bundle_gas_price, "Bundle enqueued");
        Ok(JsonRpcResponse::result(id, Value::String(QUEUED_FOR_DISPATCH_RESULT.to_owned())))
    }
}

/// Require a JSON content type and a positive content length, returning the
/// length. Header name and value matching are case-insensitive per RFC 7230.
fn validate_content_headers(headers: &HeaderMap) -> Result<usize, IngressError> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(is_json_content_type);

    let length = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|&length| length > 0);

    match (is_json, length) {
        (true, Some(length)) => Ok(length),
        _ => Err(IngressError::InvalidContentType),
    }
}

/// Recover the sender address from the signature header and the raw `params`
/// bytes.
///
/// The signed message is `keccak256(prefix || params)` over the bytes exactly
/// as received, never a re-serialization. The recovered address is the keccak
/// of the uncompressed public key, last 20 bytes.
fn recover_bundle_signer(headers: &HeaderMap, params: &[u8]) -> Result<Address, IngressError> {
    let header = headers
        .get(MARLIN_SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(IngressError::SignatureDecode)?;
    let raw = header
        .strip_prefix("0x")
        .ok_or(IngressError::SignatureDecode)
        .and_then(|sig| hex::decode(sig).map_err(|_| IngressError::SignatureDecode))?;

    let signature = parse_compact_signature(&raw).ok_or(IngressError::SignatureRecovery)?;

    let mut message = Vec::with_capacity(BUNDLE_SIGNING_PREFIX.len() + params.len());
    message.extend_from_slice(BUNDLE_SIGNING_PREFIX);
    message.extend_from_slice(params);
    let message_hash = keccak256(&message);

    recover_signer(&signature, message_hash).map_err(|_| IngressError::SignatureRecovery)
}

/// Parse a 65-byte compact `r || s || v` signature. Both the {0,1} and
/// {27,28} recovery id conventions are accepted.
fn parse_compact_signature(raw: &[u8]) -> Option<Signature> {
    let raw: &[u8; 65] = raw.try_into().ok()?;
    let parity = match raw[64] {
        0 | 27 => false,
        1 | 28 => true,
        _ => return None,
    };
    let r = U256::from_be_slice(&raw[..32]);
    let s = U256::from_be_slice(&raw[32..64]);
    Some(Signature::new(r, s, parity))
}

/// Bundle params as far as the gateway cares: the declared gas price. The
/// rest of the bundle is opaque and forwarded untouched.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BundleParams {
    bundle_gas_price: String,
}

fn parse_bundle_gas_price(params: &[u8]) -> Result<U256, IngressError> {
    let params: BundleParams =
        serde_json::from_slice(params).map_err(|_| IngressError::InvalidBundleParams)?;
    U256::from_str_radix(&params.bundle_gas_price, 10)
        .map_err(|_| IngressError::InvalidBundleParams)
}
