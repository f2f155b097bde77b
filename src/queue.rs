//! Bounded queue of pending bundles.
//!
//! Producers get cheap FIFO admission; the epoch scheduler pays the sort cost
//! once per drain. One mutex serializes enqueue against drain-plus-reinsert,
//! and the critical section never awaits.

use crate::jsonrpc::JsonRpcRequest;
use alloy_primitives::U256;
use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard},
};

/// A pending bundle. Created on enqueue, owned exclusively by the scheduler
/// after a drain.
#[derive(Debug, Clone)]
pub struct BundleItem {
    /// The original searcher request. The method is rewritten to
    /// `mev_sendBundle` only at dispatch time.
    pub request: JsonRpcRequest,
    /// Searcher-declared payment metric used to rank competing bundles.
    /// Gas prices routinely exceed 64 bits, hence the 256-bit type.
    pub bundle_gas_price: U256,
    /// Number of epochs this bundle has already lost.
    pub retry_count: u32,
}

/// Enqueue rejection: the queue is at capacity.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("bundle queue at capacity")]
pub struct QueueFull;

/// Bounded FIFO of pending bundles.
#[derive(Debug)]
pub struct BundleQueue {
    items: Mutex<VecDeque<BundleItem>>,
    capacity: usize,
}

impl BundleQueue {
    pub fn new(capacity: usize) -> Self {
        Self { items: Mutex::new(VecDeque::with_capacity(capacity)), capacity }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<BundleItem>> {
        self.items.lock().expect("bundle queue lock poisoned")
    }

    /// Enqueue a bundle in arrival order. The capacity check and the insert
    /// happen under one lock acquisition.
    pub fn push(&self, item: BundleItem) -> Result<(), QueueFull> {
        let mut items = self.lock();
        if items.len() >= self.capacity {
            return Err(QueueFull);
        }
        items.push_back(item);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drain the whole queue and return the up-to-`bundles_per_epoch` items
    /// with the highest gas price. Losers go back with their retry count
    /// bumped, except those that have already lost `max_bundle_retries`
    /// epochs, which are discarded. Equal prices keep their arrival order.
    ///
    /// The lock covers drain, selection and reinsert, so producers observe
    /// either the full pre-drain queue or the full post-drain queue.
    pub fn drain_epoch(&self, bundles_per_epoch: usize, max_bundle_retries: u32) -> Vec<BundleItem> {
        let mut items = self.lock();
        let mut pending: Vec<BundleItem> = items.drain(..).collect();

        // Stable sort keeps arrival order among equal gas prices.
        pending.sort_by(|a, b| b.bundle_gas_price.cmp(&a.bundle_gas_price));

        let selected_len = bundles_per_epoch.min(pending.len());
        let losers = pending.split_off(selected_len);
        for mut item in losers {
            if item.retry_count >= max_bundle_retries {
                continue;
            }
            item.retry_count += 1;
            items.push_back(item);
        }

        pending
    }
}
