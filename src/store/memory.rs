//! In-Memory Ledger Store
//!
//! Committed state lives behind one `RwLock`; every account row has its
//! own `tokio::sync::Mutex` that a unit of work holds (as an owned guard)
//! from its locked read until it ends. Writes and log entries are staged
//! in the unit and published under the write lock on commit, so readers
//! never see a half-applied transfer.
//!
//! There is no conflict detection, so [`MemoryLedgerStore::serializable`]
//! is `false`: callers must lock rows in ascending id order.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::OwnedMutexGuard;

use super::{LedgerStore, StoreError, UnitOfWork};
use crate::account::Account;
use crate::core_types::{AccountId, TransactionId};
use crate::transaction::{NewTransaction, TransactionRecord};

#[derive(Default)]
struct Committed {
    accounts: BTreeMap<AccountId, Account>,
    /// Ordered by id (ascending)
    log: Vec<TransactionRecord>,
}

struct Inner {
    committed: RwLock<Committed>,
    row_locks: Mutex<HashMap<AccountId, Arc<tokio::sync::Mutex<()>>>>,
    next_transaction_id: AtomicI64,
}

impl Inner {
    // Poisoning can only follow a panic while holding the lock; no code
    // path here leaves `Committed` half-updated, so recover the guard.
    fn read(&self) -> RwLockReadGuard<'_, Committed> {
        self.committed.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Committed> {
        self.committed.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn row_lock(&self, account_id: AccountId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.row_locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(account_id).or_default().clone()
    }
}

/// In-process ledger store
#[derive(Clone)]
pub struct MemoryLedgerStore {
    inner: Arc<Inner>,
}

impl Default for MemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                committed: RwLock::new(Committed::default()),
                row_locks: Mutex::new(HashMap::new()),
                next_transaction_id: AtomicI64::new(1),
            }),
        }
    }

    /// Sum of all committed balances
    pub fn total_balance(&self) -> Decimal {
        self.inner.read().accounts.values().map(|a| a.balance).sum()
    }

    /// Number of committed log entries
    pub fn transaction_count(&self) -> usize {
        self.inner.read().log.len()
    }
}

struct HeldRow {
    _guard: OwnedMutexGuard<()>,
    balance: Decimal,
    dirty: bool,
}

/// Unit of work over the in-memory store
pub struct MemoryUnitOfWork {
    inner: Arc<Inner>,
    held: HashMap<AccountId, HeldRow>,
    staged: Vec<TransactionRecord>,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn lock_balance(
        &mut self,
        account_id: AccountId,
    ) -> Result<Option<Decimal>, StoreError> {
        if let Some(row) = self.held.get(&account_id) {
            return Ok(Some(row.balance));
        }

        if !self.inner.read().accounts.contains_key(&account_id) {
            return Ok(None);
        }

        let guard = self.inner.row_lock(account_id).lock_owned().await;

        // Read after acquiring the lock so we see the last committed value
        let balance = match self.inner.read().accounts.get(&account_id) {
            Some(account) => account.balance,
            None => return Ok(None),
        };

        self.held.insert(
            account_id,
            HeldRow {
                _guard: guard,
                balance,
                dirty: false,
            },
        );
        Ok(Some(balance))
    }

    async fn write_balance(
        &mut self,
        account_id: AccountId,
        balance: Decimal,
    ) -> Result<(), StoreError> {
        let row = self.held.get_mut(&account_id).ok_or_else(|| {
            StoreError::Backend(format!(
                "account {} written without holding its row lock",
                account_id
            ))
        })?;
        row.balance = balance;
        row.dirty = true;
        Ok(())
    }

    async fn insert_transaction(
        &mut self,
        entry: &NewTransaction,
    ) -> Result<TransactionRecord, StoreError> {
        {
            let committed = self.inner.read();
            for account_id in [entry.source_account_id, entry.destination_account_id] {
                if !committed.accounts.contains_key(&account_id) {
                    return Err(StoreError::Backend(format!(
                        "foreign key violation: account {} does not exist",
                        account_id
                    )));
                }
            }
        }

        let id: TransactionId = self
            .inner
            .next_transaction_id
            .fetch_add(1, Ordering::SeqCst);
        let record = TransactionRecord {
            id,
            source_account_id: entry.source_account_id,
            destination_account_id: entry.destination_account_id,
            amount: entry.amount,
            created_at: Utc::now(),
        };
        self.staged.push(record.clone());
        Ok(record)
    }

    async fn commit(mut self) -> Result<(), StoreError> {
        {
            let mut committed = self.inner.write();
            for (account_id, row) in self.held.iter().filter(|(_, r)| r.dirty) {
                if let Some(account) = committed.accounts.get_mut(account_id) {
                    account.balance = row.balance;
                }
            }
            // Ids are handed out before commit, so a later id can land
            // first; keep the log ordered without resorting it.
            for record in self.staged.drain(..) {
                let at = committed.log.partition_point(|r| r.id < record.id);
                committed.log.insert(at, record);
            }
        }
        // Row guards drop here, after the new balances are published
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    type Unit = MemoryUnitOfWork;

    fn name(&self) -> &'static str {
        "memory"
    }

    fn serializable(&self) -> bool {
        false
    }

    async fn begin(&self) -> Result<MemoryUnitOfWork, StoreError> {
        Ok(MemoryUnitOfWork {
            inner: self.inner.clone(),
            held: HashMap::new(),
            staged: Vec::new(),
        })
    }

    async fn insert_account(
        &self,
        account_id: AccountId,
        balance: Decimal,
    ) -> Result<Account, StoreError> {
        let mut committed = self.inner.write();
        if committed.accounts.contains_key(&account_id) {
            return Err(StoreError::Duplicate);
        }
        let account = Account {
            account_id,
            balance,
            created_at: Utc::now(),
        };
        committed.accounts.insert(account_id, account.clone());
        Ok(account)
    }

    async fn fetch_account(&self, account_id: AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self.inner.read().accounts.get(&account_id).cloned())
    }

    async fn account_exists(&self, account_id: AccountId) -> Result<bool, StoreError> {
        Ok(self.inner.read().accounts.contains_key(&account_id))
    }

    async fn fetch_balance(&self, account_id: AccountId) -> Result<Option<Decimal>, StoreError> {
        Ok(self.inner.read().accounts.get(&account_id).map(|a| a.balance))
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        Ok(self.inner.read().accounts.values().cloned().collect())
    }

    async fn fetch_transaction(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Option<TransactionRecord>, StoreError> {
        let committed = self.inner.read();
        Ok(committed
            .log
            .binary_search_by_key(&transaction_id, |r| r.id)
            .ok()
            .map(|idx| committed.log[idx].clone()))
    }

    async fn transactions_for_account(
        &self,
        account_id: AccountId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        let committed = self.inner.read();
        Ok(committed
            .log
            .iter()
            .rev()
            .filter(|r| r.involves(account_id))
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn list_transactions(&self) -> Result<Vec<TransactionRecord>, StoreError> {
        Ok(self.inner.read().log.iter().rev().cloned().collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
