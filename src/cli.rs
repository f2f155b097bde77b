use crate::consts::SUBGRAPH_BASE_URL;
use clap::{Parser, ValueHint};
use std::net::SocketAddr;

#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct GatewayArgs {
    /// Listen socket address for searcher JSON-RPC traffic.
    #[clap(long, env = "LISTEN_ADDR", id = "LISTEN_ADDR", default_value = "127.0.0.1:18545")]
    pub listen_addr: SocketAddr,

    /// Upstream validator RPC URL.
    #[clap(
        long,
        value_hint = ValueHint::Url,
        env = "RPC_ADDR",
        id = "RPC_ADDR",
        default_value = "http://127.0.0.1:8545"
    )]
    pub rpc_addr: String,

    /// Base URL of the hosted subgraph service. Fixed, not a flag; tests
    /// override it through the builder setter to point at a local mock.
    #[clap(skip = SUBGRAPH_BASE_URL.to_owned())]
    pub subgraph_base_url: String,

    /// Suffix appended to the subgraph base URL when fetching the whitelist.
    #[clap(
        long,
        env = "SUBGRAPH_PATH",
        id = "SUBGRAPH_PATH",
        default_value = "/marlinprotocol/mev-bor"
    )]
    pub subgraph_path: String,

    /// Pending bundle queue capacity.
    #[clap(long, default_value_t = 1000)]
    pub bundle_chan: usize,

    /// Epoch duration in milliseconds.
    #[clap(long, default_value_t = 5)]
    pub epoch_time: u64,

    /// Bundles to allow per epoch to the validator.
    #[clap(long, default_value_t = 2)]
    pub bundles_per_epoch: usize,

    /// Number of epochs before a bundle drops due to low gas price.
    #[clap(long, default_value_t = 3)]
    pub max_bundle_retries: u32,

    /// Whitelist refresh period in seconds.
    #[clap(long, default_value_t = 60)]
    pub whitelist_refresh_secs: u64,

    /// Outputs logs in JSON format if enabled.
    #[clap(long = "log.json", default_value_t = false, env = "LOG_JSON", id = "LOG_JSON")]
    pub log_json: bool,

    /// The number of IO worker threads used in Tokio.
    #[clap(long, default_value_t = 4, env = "IO_THREADS", id = "IO_THREADS")]
    pub io_threads: usize,
}

impl Default for GatewayArgs {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:0".parse().expect("valid socket address"),
            rpc_addr: String::from("http://127.0.0.1:8545"),
            subgraph_base_url: String::from(SUBGRAPH_BASE_URL),
            subgraph_path: String::from("/marlinprotocol/mev-bor"),
            bundle_chan: 1000,
            epoch_time: 5,
            bundles_per_epoch: 2,
            max_bundle_retries: 3,
            whitelist_refresh_secs: 60,
            log_json: false,
            io_threads: 4,
        }
    }
}

impl GatewayArgs {
    /// The full subgraph endpoint URL.
    pub fn subgraph_url(&self) -> String {
        format!("{}{}", self.subgraph_base_url, self.subgraph_path)
    }

    /// Set the upstream RPC URL.
    pub fn rpc_addr(mut self, url: impl Into<String>) -> Self {
        self.rpc_addr = url.into();
        self
    }

    /// Point the whitelist fetcher at a different subgraph host. Test hook.
    pub fn subgraph_base_url(mut self, url: impl Into<String>) -> Self {
        self.subgraph_base_url = url.into();
        self
    }

    /// Set the queue capacity.
    pub fn bundle_chan(mut self, capacity: usize) -> Self {
        self.bundle_chan = capacity;
        self
    }

    /// Set the epoch duration in milliseconds.
    pub fn epoch_time(mut self, millis: u64) -> Self {
        self.epoch_time = millis;
        self
    }

    /// Set the number of bundles dispatched per epoch.
    pub fn bundles_per_epoch(mut self, count: usize) -> Self {
        self.bundles_per_epoch = count;
        self
    }

    /// Set the retry cap.
    pub fn max_bundle_retries(mut self, retries: u32) -> Self {
        self.max_bundle_retries = retries;
        self
    }

    /// Set the whitelist refresh period in seconds.
    pub fn whitelist_refresh_secs(mut self, secs: u64) -> Self {
        self.whitelist_refresh_secs = secs;
        self
    }
}
