use borproxy::cli::GatewayArgs;
use clap::Parser;
use std::future::Future;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter};

fn main() -> eyre::Result<()> {
    dotenvy::dotenv().ok();
    let args = GatewayArgs::parse();
    init_tracing(args.log_json);

    let tokio_runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(args.io_threads)
        .enable_all()
        .build()?;

    tokio_runtime.block_on(run_until_ctrl_c(borproxy::run(args)))
}

fn init_tracing(log_json: bool) {
    let registry = tracing_subscriber::registry().with(
        EnvFilter::builder().with_default_directive(LevelFilter::INFO.into()).from_env_lossy(),
    );
    if log_json {
        let _ = registry.with(tracing_subscriber::fmt::layer().json()).try_init();
    } else {
        let _ = registry.with(tracing_subscriber::fmt::layer()).try_init();
    }
}

/// Runs the future to completion or until:
/// - `ctrl-c` is received.
/// - `SIGTERM` is received.
async fn run_until_ctrl_c<F>(fut: F) -> eyre::Result<()>
where
    F: Future<Output = eyre::Result<()>>,
{
    let ctrl_c = tokio::signal::ctrl_c();

    let mut stream = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    let sigterm = stream.recv();
    let sigterm = Box::pin(sigterm);
    let ctrl_c = Box::pin(ctrl_c);
    let fut = Box::pin(fut);

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received ctrl-c");
        },
        _ = sigterm => {
            tracing::info!("Received SIGTERM");
        },
        res = fut => res?,
    }

    Ok(())
}
