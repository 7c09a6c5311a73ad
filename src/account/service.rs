//! Account service: creation and lookup with input checks

use std::sync::Arc;

use rust_decimal::Decimal;

use super::models::Account;
use super::repository::AccountRepository;
use crate::core_types::AccountId;
use crate::error::LedgerError;
use crate::money;
use crate::observer::{LedgerEvent, LedgerObserver};
use crate::store::LedgerStore;

pub struct AccountService<S: LedgerStore> {
    accounts: AccountRepository<S>,
    observer: Arc<dyn LedgerObserver>,
}

impl<S: LedgerStore> AccountService<S> {
    pub fn new(store: Arc<S>, observer: Arc<dyn LedgerObserver>) -> Self {
        Self {
            accounts: AccountRepository::new(store),
            observer,
        }
    }

    /// Create an account with a caller-supplied id.
    ///
    /// The id must be positive and the balance non-negative and below
    /// [`money::AMOUNT_LIMIT`]; all are checked before the store is
    /// touched. The stored balance is rounded to the currency scale.
    pub async fn create_account(
        &self,
        account_id: AccountId,
        initial_balance: Decimal,
    ) -> Result<Account, LedgerError> {
        let result = self.try_create(account_id, initial_balance).await;
        match &result {
            Ok(account) => self.observer.notify(&LedgerEvent::AccountCreated {
                account_id,
                balance: account.balance,
            }),
            Err(error) => self.observer.notify(&LedgerEvent::AccountRejected {
                account_id,
                error: error.clone(),
            }),
        }
        result
    }

    async fn try_create(
        &self,
        account_id: AccountId,
        initial_balance: Decimal,
    ) -> Result<Account, LedgerError> {
        if account_id <= 0 {
            return Err(LedgerError::InvalidAccountId);
        }
        if initial_balance < Decimal::ZERO {
            return Err(LedgerError::NegativeBalance);
        }
        let balance = money::normalize(initial_balance);
        if !money::within_limit(balance) {
            return Err(LedgerError::AmountOutOfRange);
        }

        self.accounts.create(account_id, balance).await
    }

    pub async fn get_account(&self, account_id: AccountId) -> Result<Account, LedgerError> {
        if account_id <= 0 {
            return Err(LedgerError::InvalidAccountId);
        }
        self.accounts.get_by_id(account_id).await
    }

    pub async fn list_accounts(&self) -> Result<Vec<Account>, LedgerError> {
        self.accounts.list_all().await
    }
}
