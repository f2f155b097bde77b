use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Rejection taxonomy for inbound requests. These are adversarial inputs, so
/// they surface as 4xx and are logged at trace level only.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum IngressError {
    /// Wrong HTTP method or path.
    #[error("no such route")]
    NotFound,
    /// Missing JSON content type or unusable content length.
    #[error("invalid content type")]
    InvalidContentType,
    /// Body is not a JSON-RPC 2.0 request.
    #[error("request decode error")]
    RequestDecode,
    /// Signature header missing, unprefixed or not valid hex.
    #[error("signature decode error")]
    SignatureDecode,
    /// Signature bytes do not recover to a public key.
    #[error("signature recovery error")]
    SignatureRecovery,
    /// Recovered sender is not in the whitelist snapshot.
    #[error("sender not whitelisted")]
    NotWhitelisted,
    /// Bundle params missing a parseable `bundleGasPrice`.
    #[error("invalid bundle params")]
    InvalidBundleParams,
    /// Pending queue at capacity.
    #[error("bundle queue at capacity")]
    QueueFull,
}

impl IngressError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InvalidContentType |
            Self::RequestDecode |
            Self::SignatureDecode |
            Self::SignatureRecovery |
            Self::NotWhitelisted |
            Self::InvalidBundleParams |
            Self::QueueFull => StatusCode::BAD_REQUEST,
        }
    }

    /// Plain-text body sent with the rejection. Authorization and capacity
    /// rejections are deliberately silent.
    pub fn body(&self) -> &'static str {
        match self {
            Self::InvalidContentType => "Invalid content type",
            Self::RequestDecode => "Request decode error",
            Self::SignatureDecode => "Signature decode error",
            Self::SignatureRecovery => "Signature recovery error",
            Self::NotFound | Self::NotWhitelisted | Self::InvalidBundleParams | Self::QueueFull => {
                ""
            }
        }
    }
}

impl IntoResponse for IngressError {
    fn into_response(self) -> Response {
        (self.status_code(), self.body()).into_response()
    }
}
