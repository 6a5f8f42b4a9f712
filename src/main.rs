use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use gateq::config::Config;
use gateq::http;
use gateq::queue::{AdmissionControl, KeySpace, ThrottleScheduler};
use gateq::store::MemoryStore;
use gateq::telemetry;

const SCHEDULER_GRACE_SECS: u64 = 5;

/// Create a shutdown signal handler
async fn shutdown_signal(shutdown_tx: broadcast::Sender<()>) {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                warn!(error = %e, "Failed to install Ctrl+C handler, continuing without it");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler, continuing without it");
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

    info!("Shutdown signal received, starting graceful shutdown...");
    let _ = shutdown_tx.send(());
}

#[tokio::main]
async fn main() {
    telemetry::init();

    let config = Config::from_env();

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    tokio::spawn(shutdown_signal(shutdown_tx.clone()));

    let store = Arc::new(MemoryStore::new());
    let keys = KeySpace::new(config.namespace.clone());
    let admission = Arc::new(AdmissionControl::new(
        store.clone(),
        keys.clone(),
        config.proceed_ttl,
        config.wait_ttl,
    ));

    let scheduler = ThrottleScheduler::new(
        Arc::clone(&admission),
        store,
        keys,
        config.tick_interval,
        config.quota_policy,
        shutdown_tx.subscribe(),
    );
    let scheduler_handle = tokio::spawn(scheduler.run());

    let router = http::create_router(admission);
    let listener = match tokio::net::TcpListener::bind(("0.0.0.0", config.http_port)).await {
        Ok(l) => l,
        Err(e) => {
            error!(port = config.http_port, error = %e, "Failed to bind HTTP listener");
            std::process::exit(1);
        }
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = config.http_port,
        endpoint = %format!("http://0.0.0.0:{}", config.http_port),
        "gateQ server ready"
    );

    let mut shutdown_rx = shutdown_tx.subscribe();
    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
        })
        .await
    {
        error!(error = %e, "HTTP server error");
    }

    // Let the in-flight scheduler tick finish, bounded by a grace period.
    let _ = shutdown_tx.send(());
    match tokio::time::timeout(Duration::from_secs(SCHEDULER_GRACE_SECS), scheduler_handle).await {
        Ok(_) => info!("Shutdown complete"),
        Err(_) => warn!(
            grace_secs = SCHEDULER_GRACE_SECS,
            "Scheduler did not stop within grace period, forcing exit"
        ),
    }
}
