use std::time::{Duration, Instant};

use anyhow::Context;
use posedash_server::{
    app::{create_router, AppState},
    config, data,
    logging::setup_logging,
};
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    #[cfg(debug_assertions)]
    dotenvy::from_path(std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(".env")).ok();
    #[cfg(not(debug_assertions))]
    dotenvy::dotenv().ok();

    setup_logging();

    let config = config::load_config().context("loading configuration")?;
    let addr = std::net::SocketAddr::new(config.host, config.port);
    let shutdown_timeout = Duration::from_secs(u64::from(config.shutdown_timeout_seconds));

    let store = data::connect(&config).await.context("connecting to storage")?;
    info!(store = store.kind().as_str(), "Storage ready");

    let app = create_router(AppState::new(config, store));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "Listening");

    let (tx_signal, rx_signal) = watch::channel::<Option<Instant>>(None);
    tokio::spawn(async move {
        let signaled_at = shutdown_signal().await;
        let _ = tx_signal.send(Some(signaled_at));
    });

    let mut rx_for_server = rx_signal.clone();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = rx_for_server.wait_for(Option::is_some).await;
    });

    let mut rx_for_timeout = rx_signal.clone();
    let timeout = async move {
        if rx_for_timeout.wait_for(Option::is_some).await.is_err() {
            return std::future::pending().await;
        }
        tokio::time::sleep(shutdown_timeout).await;
    };

    tokio::select! {
        res = server => {
            res.context("serving requests")?;
            if let Some(signaled_at) = *rx_signal.borrow() {
                let remaining = shutdown_timeout.saturating_sub(signaled_at.elapsed());
                info!(?remaining, "Graceful shutdown complete");
            }
            Ok(())
        }
        _ = timeout => {
            error!(?shutdown_timeout, "Shutdown timeout elapsed, forcing exit");
            std::process::exit(1);
        }
    }
}

async fn shutdown_signal() -> Instant {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = sigterm => {}
    }
    Instant::now()
}
