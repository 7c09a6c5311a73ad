//! Repository layer for account rows

use std::sync::Arc;

use rust_decimal::Decimal;

use super::models::Account;
use crate::core_types::AccountId;
use crate::error::LedgerError;
use crate::money;
use crate::store::{LedgerStore, StoreError, UnitOfWork};

/// Account repository over a ledger store
pub struct AccountRepository<S: LedgerStore> {
    store: Arc<S>,
}

impl<S: LedgerStore> Clone for AccountRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: LedgerStore> AccountRepository<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Insert a new account row
    ///
    /// Fails with `AccountAlreadyExists` when the store reports a
    /// uniqueness violation for the id.
    pub async fn create(
        &self,
        account_id: AccountId,
        balance: Decimal,
    ) -> Result<Account, LedgerError> {
        match self.store.insert_account(account_id, balance).await {
            Ok(account) => Ok(account),
            Err(StoreError::Duplicate) => Err(LedgerError::AccountAlreadyExists(account_id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Get account by ID
    pub async fn get_by_id(&self, account_id: AccountId) -> Result<Account, LedgerError> {
        self.store
            .fetch_account(account_id)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))
    }

    /// Existence lookup; the raw store error is returned so the caller
    /// decides how to classify it.
    pub async fn exists(&self, account_id: AccountId) -> Result<bool, StoreError> {
        self.store.account_exists(account_id).await
    }

    pub async fn get_balance(&self, account_id: AccountId) -> Result<Decimal, LedgerError> {
        self.store
            .fetch_balance(account_id)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))
    }

    /// All accounts ordered by id
    pub async fn list_all(&self) -> Result<Vec<Account>, LedgerError> {
        Ok(self.store.list_accounts().await?)
    }

    /// Take the row lock without changing the balance.
    pub async fn lock_for_update(
        &self,
        account_id: AccountId,
        uow: &mut S::Unit,
    ) -> Result<Decimal, LedgerError> {
        uow.lock_balance(account_id)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))
    }

    /// Apply `delta` to an account balance inside `uow`.
    ///
    /// The row is read under an exclusive lock that is held until the unit
    /// of work ends, so nothing can change it between the read and the
    /// write. A result below zero fails with `InsufficientFunds`, one at or
    /// above [`money::AMOUNT_LIMIT`] with `BalanceLimitExceeded`; neither
    /// writes anything. Returns the new balance.
    pub async fn update_balance_tx(
        &self,
        account_id: AccountId,
        delta: Decimal,
        uow: &mut S::Unit,
    ) -> Result<Decimal, LedgerError> {
        let current = self.lock_for_update(account_id, uow).await?;

        let new_balance = match current.checked_add(delta) {
            Some(balance) if money::within_limit(balance) => balance,
            _ => {
                tracing::debug!(
                    account_id,
                    %current,
                    %delta,
                    "Balance update rejected: ledger limit"
                );
                return Err(LedgerError::BalanceLimitExceeded);
            }
        };
        if new_balance < Decimal::ZERO {
            tracing::debug!(
                account_id,
                %current,
                %delta,
                "Balance update rejected: insufficient funds"
            );
            return Err(LedgerError::InsufficientFunds);
        }

        uow.write_balance(account_id, new_balance).await?;
        Ok(new_balance)
    }
}
