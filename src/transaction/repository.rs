//! Repository layer for the transaction log

use std::sync::Arc;

use super::models::{NewTransaction, TransactionRecord};
use crate::core_types::{AccountId, TransactionId};
use crate::error::LedgerError;
use crate::store::{LedgerStore, UnitOfWork};

/// Transaction log repository. No update or delete is exposed.
pub struct TransactionRepository<S: LedgerStore> {
    store: Arc<S>,
}

impl<S: LedgerStore> Clone for TransactionRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: LedgerStore> TransactionRepository<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Insert exactly one entry inside `uow` and return it with the
    /// store-assigned id.
    pub async fn append(
        &self,
        entry: &NewTransaction,
        uow: &mut S::Unit,
    ) -> Result<TransactionRecord, LedgerError> {
        Ok(uow.insert_transaction(entry).await?)
    }

    pub async fn get_by_id(
        &self,
        transaction_id: TransactionId,
    ) -> Result<TransactionRecord, LedgerError> {
        self.store
            .fetch_transaction(transaction_id)
            .await?
            .ok_or(LedgerError::TransactionNotFound(transaction_id))
    }

    /// Entries touching `account_id`, newest first
    pub async fn history(
        &self,
        account_id: AccountId,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<TransactionRecord>, LedgerError> {
        Ok(self
            .store
            .transactions_for_account(account_id, i64::from(limit), i64::from(offset))
            .await?)
    }

    /// Whole log, newest first (admin)
    pub async fn list_all(&self) -> Result<Vec<TransactionRecord>, LedgerError> {
        Ok(self.store.list_transactions().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryLedgerStore;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_append_visible_after_commit_only() {
        let store = Arc::new(MemoryLedgerStore::new());
        store.insert_account(1, Decimal::from(10)).await.unwrap();
        store.insert_account(2, Decimal::ZERO).await.unwrap();
        let repo = TransactionRepository::new(store.clone());

        let entry = NewTransaction {
            source_account_id: 1,
            destination_account_id: 2,
            amount: Decimal::new(250, 2),
        };

        let mut uow = store.begin().await.unwrap();
        let record = repo.append(&entry, &mut uow).await.unwrap();
        assert_eq!(record.amount, entry.amount);
        assert_eq!(
            repo.get_by_id(record.id).await.unwrap_err(),
            LedgerError::TransactionNotFound(record.id)
        );

        uow.commit().await.unwrap();
        assert_eq!(repo.get_by_id(record.id).await.unwrap(), record);
        assert_eq!(repo.history(2, 20, 0).await.unwrap(), vec![record.clone()]);
        assert_eq!(repo.list_all().await.unwrap(), vec![record]);
    }

    #[tokio::test]
    async fn test_ids_increase() {
        let store = Arc::new(MemoryLedgerStore::new());
        store.insert_account(1, Decimal::from(10)).await.unwrap();
        store.insert_account(2, Decimal::ZERO).await.unwrap();
        let repo = TransactionRepository::new(store.clone());

        let entry = NewTransaction {
            source_account_id: 1,
            destination_account_id: 2,
            amount: Decimal::ONE,
        };
        let mut uow = store.begin().await.unwrap();
        let first = repo.append(&entry, &mut uow).await.unwrap();
        let second = repo.append(&entry, &mut uow).await.unwrap();
        assert!(second.id > first.id);
    }
}
