//! Authenticated MEV bundle gateway for Bor validators.
//!
//! Searchers POST signed `eth_sendBundle` requests; the gateway verifies the
//! signer against a subgraph-sourced whitelist, queues accepted bundles and
//! forwards the highest-paying ones to the upstream validator once per epoch.

use axum::{http::StatusCode, routing::any, Router};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing::info;

pub mod cli;
use cli::GatewayArgs;

pub mod ingress;
use ingress::BundleIngress;

pub mod consts;
pub mod jsonrpc;

pub mod queue;
use queue::BundleQueue;

pub mod scheduler;
use scheduler::EpochScheduler;

pub mod upstream;
use upstream::UpstreamClient;

pub mod utils;

pub mod whitelist;
use whitelist::{client::SubgraphClient, WhitelistHandle, WhitelistPublisher};

pub async fn run(args: GatewayArgs) -> eyre::Result<()> {
    let listener = TcpListener::bind(args.listen_addr).await?;
    run_with_listener(args, listener).await
}

pub async fn run_with_listener(args: GatewayArgs, listener: TcpListener) -> eyre::Result<()> {
    // The handle starts out holding an empty sorted snapshot, so handlers
    // always have something to load even before the first subgraph fetch.
    let whitelist = WhitelistHandle::default();
    let subgraph = SubgraphClient::new(args.subgraph_url());
    let publisher = WhitelistPublisher::new(
        subgraph,
        whitelist.clone(),
        Duration::from_secs(args.whitelist_refresh_secs),
    );
    tokio::spawn(publisher.run());

    let queue = Arc::new(BundleQueue::new(args.bundle_chan));
    let upstream = UpstreamClient::new(args.rpc_addr.clone());
    let scheduler = EpochScheduler::new(
        queue.clone(),
        upstream,
        Duration::from_millis(args.epoch_time),
        args.bundles_per_epoch,
        args.max_bundle_retries,
    );
    tokio::spawn(scheduler.run());

    let ingress = Arc::new(BundleIngress { whitelist, queue });
    let router = Router::new()
        .route("/", any(BundleIngress::handle))
        .fallback(|| async { StatusCode::NOT_FOUND })
        .with_state(ingress);

    let addr = listener.local_addr()?;
    info!(target: "gateway", ?addr, rpc_addr = %args.rpc_addr, "Starting bundle gateway");
    axum::serve(listener, router).await?;

    Ok(())
}
