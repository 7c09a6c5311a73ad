//! HTTP Gateway
//!
//! Thin axum boundary over the ledger core. Handlers decode requests, call
//! the account service or the transfer engine, and map the ledger error
//! category to an HTTP status. No business rule lives here.

pub mod handlers;
pub mod state;
pub mod types;

use axum::{
    Router,
    routing::{get, post},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::store::LedgerStore;
pub use state::AppState;

/// Build the gateway router over `state`
pub fn router<S: LedgerStore>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route(
            "/accounts",
            post(handlers::create_account::<S>).get(handlers::list_accounts::<S>),
        )
        .route("/accounts/{account_id}", get(handlers::get_account::<S>))
        .route(
            "/accounts/{account_id}/transactions",
            get(handlers::get_account_transactions::<S>),
        )
        .route(
            "/transactions",
            post(handlers::create_transfer::<S>).get(handlers::list_transactions::<S>),
        )
        .route(
            "/transactions/{transaction_id}",
            get(handlers::get_transaction::<S>),
        )
        .route("/healthz", get(handlers::health_check::<S>))
        .fallback(handlers::not_found)
        .with_state(state)
}

/// Serve on an already-bound listener until `shutdown` resolves.
pub async fn serve<S, F>(
    listener: TcpListener,
    state: Arc<AppState<S>>,
    shutdown: F,
) -> std::io::Result<()>
where
    S: LedgerStore,
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Start HTTP Gateway server
///
/// Binds `host:port` and serves until SIGINT or SIGTERM; in-flight
/// requests are allowed to finish.
pub async fn run_server<S: LedgerStore>(
    host: &str,
    port: u16,
    state: Arc<AppState<S>>,
) -> std::io::Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        tracing::error!(%addr, error = %e, "Failed to bind gateway listener");
        e
    })?;

    tracing::info!(%addr, store = state.store.name(), "Gateway listening");
    serve(listener, state, shutdown_signal()).await?;
    tracing::info!("Gateway stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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
    tracing::info!("Shutdown signal received");
}
