//! PostgreSQL Ledger Store
//!
//! Units of work are sqlx transactions opened at `SERIALIZABLE`. Locked
//! reads use `SELECT ... FOR UPDATE`; a unit that is dropped without
//! commit is rolled back by sqlx when the connection returns to the pool.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use super::{LedgerStore, StoreError, UnitOfWork};
use crate::account::Account;
use crate::core_types::{AccountId, TransactionId};
use crate::transaction::{NewTransaction, TransactionRecord};

/// SQLSTATE codes the ledger reacts to
mod sqlstate {
    pub const UNIQUE_VIOLATION: &str = "23505";
    pub const SERIALIZATION_FAILURE: &str = "40001";
    pub const DEADLOCK_DETECTED: &str = "40P01";
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) => match db.code().as_deref() {
                Some(sqlstate::UNIQUE_VIOLATION) => StoreError::Duplicate,
                Some(sqlstate::SERIALIZATION_FAILURE) | Some(sqlstate::DEADLOCK_DETECTED) => {
                    StoreError::Conflict(db.message().to_string())
                }
                _ => StoreError::Backend(e.to_string()),
            },
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed => StoreError::Unavailable(e.to_string()),
            _ => StoreError::Backend(e.to_string()),
        }
    }
}

/// PostgreSQL-backed ledger store
#[derive(Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    /// Create a new store over an existing connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Unit of work over one PostgreSQL transaction
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn lock_balance(
        &mut self,
        account_id: AccountId,
    ) -> Result<Option<Decimal>, StoreError> {
        let balance = sqlx::query_scalar::<_, Decimal>(
            "SELECT balance FROM accounts WHERE account_id = $1 FOR UPDATE",
        )
        .bind(account_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(balance)
    }

    async fn write_balance(
        &mut self,
        account_id: AccountId,
        balance: Decimal,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE accounts SET balance = $1 WHERE account_id = $2")
            .bind(balance)
            .bind(account_id)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() != 1 {
            return Err(StoreError::Backend(format!(
                "balance update touched {} rows for account {}",
                result.rows_affected(),
                account_id
            )));
        }
        Ok(())
    }

    async fn insert_transaction(
        &mut self,
        entry: &NewTransaction,
    ) -> Result<TransactionRecord, StoreError> {
        let record = sqlx::query_as::<_, TransactionRecord>(
            r#"
            INSERT INTO transactions (source_account_id, destination_account_id, amount, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id, source_account_id, destination_account_id, amount, created_at
            "#,
        )
        .bind(entry.source_account_id)
        .bind(entry.destination_account_id)
        .bind(entry.amount)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(record)
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    type Unit = PgUnitOfWork;

    fn name(&self) -> &'static str {
        "postgres"
    }

    fn serializable(&self) -> bool {
        true
    }

    async fn begin(&self) -> Result<PgUnitOfWork, StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;
        debug!("Opened serializable unit of work");
        Ok(PgUnitOfWork { tx })
    }

    async fn insert_account(
        &self,
        account_id: AccountId,
        balance: Decimal,
    ) -> Result<Account, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (account_id, balance, created_at)
            VALUES ($1, $2, NOW())
            RETURNING account_id, balance, created_at
            "#,
        )
        .bind(account_id)
        .bind(balance)
        .fetch_one(&self.pool)
        .await?;

        Ok(account)
    }

    async fn fetch_account(&self, account_id: AccountId) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT account_id, balance, created_at FROM accounts WHERE account_id = $1",
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn account_exists(&self, account_id: AccountId) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE account_id = $1)",
        )
        .bind(account_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn fetch_balance(&self, account_id: AccountId) -> Result<Option<Decimal>, StoreError> {
        let balance =
            sqlx::query_scalar::<_, Decimal>("SELECT balance FROM accounts WHERE account_id = $1")
                .bind(account_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(balance)
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        let accounts = sqlx::query_as::<_, Account>(
            "SELECT account_id, balance, created_at FROM accounts ORDER BY account_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }

    async fn fetch_transaction(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Option<TransactionRecord>, StoreError> {
        let record = sqlx::query_as::<_, TransactionRecord>(
            r#"
            SELECT id, source_account_id, destination_account_id, amount, created_at
            FROM transactions WHERE id = $1
            "#,
        )
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn transactions_for_account(
        &self,
        account_id: AccountId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        let records = sqlx::query_as::<_, TransactionRecord>(
            r#"
            SELECT id, source_account_id, destination_account_id, amount, created_at
            FROM transactions
            WHERE source_account_id = $1 OR destination_account_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(account_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn list_transactions(&self) -> Result<Vec<TransactionRecord>, StoreError> {
        let records = sqlx::query_as::<_, TransactionRecord>(
            r#"
            SELECT id, source_account_id, destination_account_id, amount, created_at
            FROM transactions
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
