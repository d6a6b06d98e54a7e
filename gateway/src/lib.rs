//! HTTP gateway for the Ligue 1 vote contract.
//!
//! # Surface
//! - `/api/*` JSON reads straight from the ledger, plus `/api/stats` from the mirror
//! - `/sandbox/*` account and vote submission against the local ledger host
//!
//! # Mirror
//! A background task copies every `VoteCast` notification into the
//! [`mirror::MirrorStore`]. The mirror is for analytics only; whether an
//! address has voted is always asked of the ledger.
//!
//! # Running
//! ```sh
//! RUST_LOG=info MIRROR_JOURNAL=./votes.jsonl cargo run -p ligue1-gateway
//! ```

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use ligue1_ledger::{SandboxConfig, SandboxLedger, VoteFeed};

pub mod config;
pub mod error;
pub mod handlers;
pub mod listener;
pub mod mirror;
pub mod routes;
pub mod state;
pub mod types;

use config::GatewayConfig;
use error::GatewayError;
use listener::spawn_mirror_listener;
use mirror::MirrorStore;
use routes::create_router;
use state::AppState;

/// Install the global `fmt` subscriber. `RUST_LOG` wins over `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt().with_env_filter(filter).init();
}

pub async fn run(config: GatewayConfig) -> Result<(), GatewayError> {
    info!("Initializing mirror...");
    let mirror = Arc::new(match &config.mirror_journal {
        Some(path) => MirrorStore::open(path)?,
        None => MirrorStore::in_memory(),
    });

    info!("Deploying sandbox ledger...");
    let ledger = SandboxLedger::start(SandboxConfig {
        network: config.network.clone(),
        ..SandboxConfig::default()
    })
    .await?;

    let listener_task = spawn_mirror_listener(ledger.subscribe(), mirror.clone());

    let address = format!("{}:{}", config.host, config.port);
    let sandbox = config.sandbox_rpc.then(|| ledger.clone());
    let state = Arc::new(AppState::new(config, Arc::new(ledger.clone()), sandbox, mirror));
    let app = create_router(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| GatewayError::Bind {
            address: address.clone(),
            source,
        })?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    listener_task.abort();
    if let Err(e) = ledger.shutdown().await {
        error!(error = %e, "Sandbox ledger did not stop cleanly");
    }
    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
