//! Ledger Store
//!
//! The transactional store the ledger core is written against. The core
//! never talks to a database directly; it asks a [`LedgerStore`] for a
//! [`UnitOfWork`] and performs every balance mutation and log append
//! inside it.
//!
//! # Contract
//!
//! 1. **All-or-nothing**: effects staged in a unit of work become visible
//!    only on [`UnitOfWork::commit`]. `rollback` - or simply dropping the
//!    unit - discards them.
//! 2. **Row lock**: [`UnitOfWork::lock_balance`] takes an exclusive lock on
//!    the account row that is held until the unit ends. Calling it again
//!    for a row the unit already holds must not block.
//! 3. **Isolation**: [`LedgerStore::begin`] opens the unit at the
//!    strongest isolation the backend offers. [`LedgerStore::serializable`]
//!    reports whether that is true serializability (with conflict
//!    detection). When it is not, callers must lock rows in ascending id
//!    order to stay deadlock-free.
//!
//! Implementations:
//! - [`postgres::PgLedgerStore`] - PostgreSQL via sqlx, `SERIALIZABLE` + `FOR UPDATE`
//! - [`memory::MemoryLedgerStore`] - in-process rows guarded by owned async mutexes

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::account::Account;
use crate::core_types::{AccountId, TransactionId};
use crate::transaction::{NewTransaction, TransactionRecord};

pub use memory::MemoryLedgerStore;
pub use postgres::PgLedgerStore;

/// Store-level failures, already classified by what the caller can do about them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Uniqueness violation (e.g. account id already present)
    #[error("duplicate key")]
    Duplicate,

    /// Serialization failure or deadlock detected by the store
    #[error("serialization conflict: {0}")]
    Conflict(String),

    /// Store unreachable, pool exhausted, connection dropped
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Any other backend failure
    #[error("store error: {0}")]
    Backend(String),
}

/// A single atomic unit of work against the ledger store.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Read an account balance under an exclusive row lock held until the
    /// unit ends. `None` when the account does not exist.
    async fn lock_balance(&mut self, account_id: AccountId)
    -> Result<Option<Decimal>, StoreError>;

    /// Overwrite the balance of a row previously locked by this unit.
    async fn write_balance(
        &mut self,
        account_id: AccountId,
        balance: Decimal,
    ) -> Result<(), StoreError>;

    /// Append one immutable log entry; the id and timestamp are assigned here.
    async fn insert_transaction(
        &mut self,
        entry: &NewTransaction,
    ) -> Result<TransactionRecord, StoreError>;

    async fn commit(self) -> Result<(), StoreError>;

    async fn rollback(self) -> Result<(), StoreError>;
}

/// Transactional store for accounts and the transfer log.
#[async_trait]
pub trait LedgerStore: Send + Sync + 'static {
    type Unit: UnitOfWork;

    /// Store name for logging
    fn name(&self) -> &'static str;

    /// Whether units of work run under true serializable isolation.
    fn serializable(&self) -> bool;

    /// Open a unit of work at the strongest isolation available.
    async fn begin(&self) -> Result<Self::Unit, StoreError>;

    /// Insert a new account row. `StoreError::Duplicate` if the id is taken.
    async fn insert_account(&self, account_id: AccountId, balance: Decimal)
    -> Result<Account, StoreError>;

    async fn fetch_account(&self, account_id: AccountId) -> Result<Option<Account>, StoreError>;

    async fn account_exists(&self, account_id: AccountId) -> Result<bool, StoreError>;

    async fn fetch_balance(&self, account_id: AccountId) -> Result<Option<Decimal>, StoreError>;

    /// All accounts ordered by id
    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError>;

    async fn fetch_transaction(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Option<TransactionRecord>, StoreError>;

    /// Entries where the account is source or destination, newest first.
    async fn transactions_for_account(
        &self,
        account_id: AccountId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TransactionRecord>, StoreError>;

    /// Whole log, newest first
    async fn list_transactions(&self) -> Result<Vec<TransactionRecord>, StoreError>;

    /// Cheap connectivity check
    async fn ping(&self) -> Result<(), StoreError>;
}
