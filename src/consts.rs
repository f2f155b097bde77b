/// Header name for the searcher bundle signature.
pub const MARLIN_SIGNATURE_HEADER: &str = "X-Marlin-Signature";

/// Prefix prepended to the raw `params` bytes before keccak hashing for
/// signature verification.
pub const BUNDLE_SIGNING_PREFIX: &[u8] = b"\x19Bor Signed MEV TxBundle:\n";

/// JSON-RPC method name for submitting bundles.
pub const ETH_SEND_BUNDLE_METHOD: &str = "eth_sendBundle";

/// JSON-RPC method name bundles are dispatched upstream as.
pub const MEV_SEND_BUNDLE_METHOD: &str = "mev_sendBundle";

/// Result string returned to searchers on a successful enqueue.
pub const QUEUED_FOR_DISPATCH_RESULT: &str = "queued for proxy dispatch";

/// Base URL for the hosted subgraph service. The configured subgraph path is
/// appended to this.
pub const SUBGRAPH_BASE_URL: &str = "https://api.thegraph.com/subgraphs/name";

/// GraphQL query body fetching the whitelisted searcher keys.
pub const KEYSTORE_QUERY: &str = r#"{"query": "query { keystores { key } }"}"#;

/// Maximum number of response body bytes read from upstream or the subgraph.
pub const MAX_RESPONSE_BODY_BYTES: usize = 1_000_000;

/// Default HTTP timeout in seconds for outbound requests.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 5;
