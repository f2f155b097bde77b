//! Whitelist snapshot publishing.
//!
//! One writer periodically replaces the whole snapshot; request handlers load
//! it without coordination. Readers hold an `Arc` to the list they loaded, so
//! a concurrent swap never invalidates an in-flight membership check.

use alloy_primitives::Address;
use arc_swap::ArcSwap;
use std::{str::FromStr as _, sync::Arc, time::Duration};
use tracing::{debug, warn};

pub mod client;
use client::SubgraphClient;

const WHITELIST: &str = "whitelist";

/// Shared handle to the current whitelist snapshot.
///
/// The snapshot is a sorted list of searcher addresses. Sorting by address
/// bytes is equivalent to sorting the lowercase hex renderings
/// lexicographically, so binary search against a recovered address matches
/// the subgraph's string ordering.
#[derive(Debug, Clone, Default)]
pub struct WhitelistHandle {
    snapshot: Arc<ArcSwap<Vec<Address>>>,
}

impl WhitelistHandle {
    /// Load the current snapshot. The returned list stays valid for as long
    /// as the caller holds it, regardless of concurrent publishes.
    pub fn load(&self) -> Arc<Vec<Address>> {
        self.snapshot.load_full()
    }

    /// Atomically replace the snapshot. `addresses` must already be sorted.
    fn store(&self, addresses: Vec<Address>) {
        debug_assert!(addresses.is_sorted());
        self.snapshot.store(Arc::new(addresses));
    }
}

/// Background task keeping the whitelist snapshot in sync with the subgraph.
#[derive(Debug)]
pub struct WhitelistPublisher {
    client: SubgraphClient,
    handle: WhitelistHandle,
    refresh: Duration,
}

impl WhitelistPublisher {
    pub fn new(client: SubgraphClient, handle: WhitelistHandle, refresh: Duration) -> Self {
        Self { client, handle, refresh }
    }

    /// Fetch-and-publish loop. The first fetch happens immediately so the
    /// empty initial snapshot is replaced as soon as the subgraph answers.
    /// Fetch failures leave the previous snapshot serving.
    pub async fn run(self) {
        loop {
            match self.client.fetch_keys().await {
                Ok(keys) => {
                    let mut addresses = parse_keys(keys);
                    addresses.sort_unstable();
                    debug!(target: WHITELIST, len = addresses.len(), "Publishing whitelist snapshot");
                    self.handle.store(addresses);
                }
                Err(error) => {
                    warn!(target: WHITELIST, %error, "Whitelist fetch failed, keeping previous snapshot");
                }
            }

            tokio::time::sleep(self.refresh).await;
        }
    }
}

/// Parse subgraph keys into addresses. Keys that are not 20-byte hex
/// addresses could never equal a recovered signer, so they are dropped.
fn parse_keys(keys: Vec<String>) -> Vec<Address> {
    keys.into_iter()
        .filter_map(|key| match Address::from_str(&key) {
            Ok(address) => Some(address),
            Err(error) => {
                warn!(target: WHITELIST, key, %error, "Skipping malformed whitelist key");
                None
            }
        })
        .collect()
}
