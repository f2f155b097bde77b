use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{value::RawValue, Value};

/// Supported JSON-RPC version 2.0.
pub const JSONRPC_VERSION_2: &str = "2.0";

/// JSON-RPC error code for method not found.
pub const METHOD_NOT_FOUND_CODE: i64 = -32601;

/// JSON-RPC error code for internal errors. Also used for synthetic upstream
/// failure responses.
pub const INTERNAL_ERROR_CODE: i64 = -32603;

/// JSON-RPC request object.
/// Spec: <https://www.jsonrpc.org/specification#request_object>.
///
/// `params` is kept as raw JSON so the bytes that get signature-verified are
/// exactly the bytes received on the wire. `id` may be any JSON value and is
/// echoed back untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// A String specifying the version of the JSON-RPC protocol. MUST be exactly "2.0".
    pub jsonrpc: String,
    /// A String containing the name of the method to be invoked.
    pub method: String,
    /// The parameter values to be used during the invocation of the method,
    /// preserved byte-exact. This member MAY be omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Box<RawValue>>,
    /// An identifier established by the client.
    #[serde(default)]
    pub id: Value,
}

impl JsonRpcRequest {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, JsonRpcDecodeError> {
        let request: Self = serde_json::from_slice(bytes)?;
        if request.jsonrpc != JSONRPC_VERSION_2 {
            return Err(JsonRpcDecodeError::Version);
        }
        Ok(request)
    }

    /// The raw `params` bytes as received. Empty if the member was omitted.
    pub fn params_bytes(&self) -> &[u8] {
        self.params.as_ref().map(|params| params.get().as_bytes()).unwrap_or_default()
    }
}

/// Failure to decode a JSON-RPC 2.0 message.
#[derive(Debug, thiserror::Error)]
pub enum JsonRpcDecodeError {
    #[error(transparent)]
    Parse(#[from] serde_json::Error),
    #[error("unsupported JSON-RPC version")]
    Version,
}

/// JSON-RPC response object.
/// Spec: <https://www.jsonrpc.org/specification#response_object>.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(flatten)]
    pub payload: JsonRpcResponsePayload,
    pub id: Value,
}

impl JsonRpcResponse {
    pub fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION_2.to_owned(),
            payload: JsonRpcResponsePayload::Result(result),
            id,
        }
    }

    pub fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION_2.to_owned(),
            payload: JsonRpcResponsePayload::Error(JsonRpcErrorObject {
                code,
                message: message.into(),
                data: None,
            }),
            id,
        }
    }
}

impl IntoResponse for JsonRpcResponse {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self) {
            Ok(body) => {
                let headers = [(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static(mime::APPLICATION_JSON.as_ref()),
                )];
                // RPC-level errors still ship with HTTP 200. Transport-level
                // failures are signalled through 4xx before a response object
                // is ever built.
                (StatusCode::OK, headers, body).into_response()
            }
            Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

/// JSON-RPC response payload.
/// Either the result member or error member MUST be included, but both members
/// MUST NOT be included.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonRpcResponsePayload {
    Result(Value),
    Error(JsonRpcErrorObject),
}

/// JSON-RPC error object.
/// Spec: <https://www.jsonrpc.org/specification#error_object>.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Whether a `Content-Type` header value denotes JSON. Matching is
/// case-insensitive and tolerates parameters such as `; charset=utf-8`, per
/// RFC 7231.
pub fn is_json_content_type(value: &str) -> bool {
    value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .eq_ignore_ascii_case(mime::APPLICATION_JSON.as_ref())
}
