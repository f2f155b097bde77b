//! Epoch-driven bundle dispatch.

use crate::{
    consts::MEV_SEND_BUNDLE_METHOD, jsonrpc::JsonRpcResponsePayload, queue::BundleQueue,
    upstream::UpstreamClient,
};
use futures::future::join_all;
use std::{sync::Arc, time::Duration};
use tokio::time::Instant;
use tracing::{debug, info, trace};

const SCHEDULER: &str = "scheduler";

/// Once per epoch: drain the pending queue, forward the top-priced bundles
/// upstream and retain losers for the next epoch up to the retry cap.
#[derive(Debug)]
pub struct EpochScheduler {
    queue: Arc<BundleQueue>,
    upstream: UpstreamClient,
    epoch_duration: Duration,
    bundles_per_epoch: usize,
    max_bundle_retries: u32,
}

impl EpochScheduler {
    pub fn new(
        queue: Arc<BundleQueue>,
        upstream: UpstreamClient,
        epoch_duration: Duration,
        bundles_per_epoch: usize,
        max_bundle_retries: u32,
    ) -> Self {
        Self { queue, upstream, epoch_duration, bundles_per_epoch, max_bundle_retries }
    }

    pub async fn run(self) {
        info!(
            target: SCHEDULER,
            epoch = ?self.epoch_duration,
            bundles_per_epoch = self.bundles_per_epoch,
            max_bundle_retries = self.max_bundle_retries,
            "Starting epoch scheduler"
        );

        loop {
            // The deadline is fixed up front. If dispatch overruns the epoch,
            // the sleep below returns immediately and the next epoch starts
            // with no further drift compensation.
            let next_epoch = Instant::now() + self.epoch_duration;

            self.dispatch_epoch().await;

            tokio::time::sleep_until(next_epoch).await;
        }
    }

    /// Select and dispatch one epoch's winners. The queue lock is released
    /// before any upstream I/O starts, so producers are never blocked on slow
    /// RPCs.
    async fn dispatch_epoch(&self) {
        let selected = self.queue.drain_epoch(self.bundles_per_epoch, self.max_bundle_retries);
        if selected.is_empty() {
            return;
        }

        debug!(target: SCHEDULER, count = selected.len(), "Dispatching epoch winners");

        let dispatches = selected.into_iter().map(|mut item| {
            item.request.method = MEV_SEND_BUNDLE_METHOD.to_owned();
            let upstream = &self.upstream;
            async move {
                let response = upstream.call(&item.request).await;
                // Searchers were already answered at enqueue time, so the
                // outcome is only worth a log line.
                match response.payload {
                    JsonRpcResponsePayload::Result(_) => {
                        trace!(target: SCHEDULER, bundle_gas_price = %item.bundle_gas_price, "Bundle accepted upstream");
                    }
                    JsonRpcResponsePayload::Error(error) => {
                        debug!(
                            target: SCHEDULER,
                            code = error.code,
                            message = %error.message,
                            bundle_gas_price = %item.bundle_gas_price,
                            "Upstream rejected bundle"
                        );
                    }
                }
            }
        });

        join_all(dispatches).await;
    }
}
