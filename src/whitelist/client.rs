use crate::{
    consts::{DEFAULT_HTTP_TIMEOUT_SECS, KEYSTORE_QUERY, MAX_RESPONSE_BODY_BYTES},
    jsonrpc::is_json_content_type,
    utils::read_body_capped,
};
use axum::http::{header, HeaderValue};
use serde::Deserialize;
use std::time::Duration;

/// Errors that can occur when fetching the whitelist from the subgraph.
#[derive(Debug, thiserror::Error)]
pub enum SubgraphError {
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("response content type mismatch")]
    ContentType,
    #[error("response decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Response shape of the keystore query.
#[derive(Debug, Deserialize)]
struct KeystoreResponse {
    data: KeystoreData,
}

#[derive(Debug, Deserialize)]
struct KeystoreData {
    keystores: Vec<Keystore>,
}

#[derive(Debug, Deserialize)]
struct Keystore {
    key: String,
}

/// GraphQL client for the whitelist subgraph.
#[derive(Debug)]
pub struct SubgraphClient {
    inner: reqwest::Client,
    url: String,
}

impl SubgraphClient {
    /// Create a new subgraph client for the given endpoint URL.
    pub fn new(url: String) -> Self {
        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))
            .build()
            .expect("to build reqwest client");
        Self { inner, url }
    }

    /// Fetch the raw whitelist keys. Key-to-address parsing and ordering are
    /// the publisher's concern.
    pub async fn fetch_keys(&self) -> Result<Vec<String>, SubgraphError> {
        let response = self
            .inner
            .post(&self.url)
            .header(header::CONTENT_TYPE, HeaderValue::from_static(mime::APPLICATION_JSON.as_ref()))
            .body(KEYSTORE_QUERY)
            .send()
            .await?;

        let is_json = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(is_json_content_type);
        if !is_json {
            return Err(SubgraphError::ContentType);
        }

        let body = read_body_capped(response, MAX_RESPONSE_BODY_BYTES).await?;
        let decoded: KeystoreResponse = serde_json::from_slice(&body)?;

        Ok(decoded.data.keystores.into_iter().map(|keystore| keystore.key).collect())
    }
}
