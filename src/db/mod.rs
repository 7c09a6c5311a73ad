//! Database connection management

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Ledger schema, applied idempotently at startup.
///
/// Balances and amounts are `NUMERIC(30,2)` so the column type enforces
/// the currency scale; the CHECK constraints are the last line of defence
/// behind the engine's own validation.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS accounts (
        account_id BIGINT PRIMARY KEY CHECK (account_id > 0),
        balance NUMERIC(30, 2) NOT NULL CHECK (balance >= 0),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS transactions (
        id BIGSERIAL PRIMARY KEY,
        source_account_id BIGINT NOT NULL REFERENCES accounts(account_id),
        destination_account_id BIGINT NOT NULL REFERENCES accounts(account_id),
        amount NUMERIC(30, 2) NOT NULL CHECK (amount > 0),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CHECK (source_account_id <> destination_account_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_transactions_source ON transactions(source_account_id)",
    "CREATE INDEX IF NOT EXISTS idx_transactions_destination ON transactions(destination_account_id)",
];

/// PostgreSQL database connection pool
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await?;

        tracing::info!(max_connections, "PostgreSQL connection pool established");
        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the ledger tables and indexes if they are missing
    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::info!("Ledger schema ready");
        Ok(())
    }
}
