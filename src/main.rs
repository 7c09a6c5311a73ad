//! Transfer Ledger service
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────┐    ┌──────────┐
//! │  Config  │───▶│ Gateway  │───▶│ Transfer │───▶│  Ledger  │
//! │  (YAML)  │    │  (axum)  │    │  Engine  │    │  Store   │
//! └──────────┘    └──────────┘    └──────────┘    └──────────┘
//! ```
//!
//! Flags:
//! - `--env <name>`  config file `config/<name>.yaml` (default `dev`)
//! - `--port <n>`    overrides `gateway.port` and `PORT`
//! - `--memory`      in-process store instead of PostgreSQL (nothing persists)

use std::sync::Arc;

use anyhow::Context;

use transfer_ledger::config::AppConfig;
use transfer_ledger::db::Database;
use transfer_ledger::gateway::{self, AppState};
use transfer_ledger::observer::{LedgerObserver, TracingObserver};
use transfer_ledger::store::{LedgerStore, MemoryLedgerStore, PgLedgerStore};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

fn use_memory_store() -> bool {
    std::env::args().any(|a| a == "--memory")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut config = AppConfig::load(&env).context("loading configuration")?;
    if let Some(port) = get_port_override() {
        config.gateway.port = port;
    }
    let _log_guard = transfer_ledger::logging::init_logging(&config);

    tracing::info!(
        env = %env,
        build = env!("LEDGER_BUILD_HASH"),
        "Starting transfer ledger"
    );

    let observer: Arc<dyn LedgerObserver> = Arc::new(TracingObserver);

    if use_memory_store() {
        tracing::warn!("Using in-memory store; balances are lost on exit");
        serve(&config, Arc::new(MemoryLedgerStore::new()), observer).await
    } else {
        let url = config.database_url()?;
        let db = Database::connect(
            url,
            config.database.max_connections,
            config.database.acquire_timeout(),
        )
        .await
        .context("connecting to PostgreSQL")?;
        db.init_schema().await.context("applying ledger schema")?;

        let store = Arc::new(PgLedgerStore::new(db.pool().clone()));
        serve(&config, store, observer).await
    }
}

async fn serve<S: LedgerStore>(
    config: &AppConfig,
    store: Arc<S>,
    observer: Arc<dyn LedgerObserver>,
) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(
        store,
        observer,
        config.ledger.transfer_timeout(),
    ));
    gateway::run_server(&config.gateway.host, config.gateway.port, state)
        .await
        .context("gateway server")?;
    Ok(())
}
