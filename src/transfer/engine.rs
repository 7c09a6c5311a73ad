//! Transfer Engine
//!
//! Drives one transfer through the FSM inside a single unit of work.
//! Debit, credit and log append commit together or not at all; every
//! failure rolls the unit back before the error is returned.

use std::sync::Arc;
use std::sync::atomic::{AtomicI16, Ordering};
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{debug, error, warn};

use super::state::TransferState;
use super::validation;
use crate::account::AccountRepository;
use crate::core_types::{AccountId, TransactionId};
use crate::error::LedgerError;
use crate::money;
use crate::observer::{LedgerEvent, LedgerObserver};
use crate::store::{LedgerStore, UnitOfWork};
use crate::transaction::{NewTransaction, TransactionRecord, TransactionRepository};

/// Default page size for account history
pub const DEFAULT_HISTORY_LIMIT: u32 = 20;
/// Largest page size a caller may request
pub const MAX_HISTORY_LIMIT: u32 = 100;

/// Current FSM position of one in-flight transfer.
///
/// Kept outside the transfer future so the state is still readable after
/// the future has been dropped by a timeout.
struct StateCell(AtomicI16);

impl StateCell {
    fn new() -> Self {
        Self(AtomicI16::new(TransferState::Validating.id()))
    }

    fn get(&self) -> TransferState {
        TransferState::from_id(self.0.load(Ordering::Acquire)).unwrap_or(TransferState::Validating)
    }

    /// Step to the next state on the success path; terminal states stay put.
    fn advance(&self) -> TransferState {
        let current = self.get();
        let next = current.next().unwrap_or(current);
        self.0.store(next.id(), Ordering::Release);
        next
    }

    /// Enter `Aborted` unless already terminal; returns the state the
    /// transfer failed in.
    fn abort(&self) -> TransferState {
        let failed_in = self.get();
        if !failed_in.is_terminal() {
            self.0.store(TransferState::Aborted.id(), Ordering::Release);
        }
        failed_in
    }
}

/// Transfer Engine - the only writer of account balances
pub struct TransferEngine<S: LedgerStore> {
    store: Arc<S>,
    accounts: AccountRepository<S>,
    transactions: TransactionRepository<S>,
    observer: Arc<dyn LedgerObserver>,
    timeout: Option<Duration>,
}

impl<S: LedgerStore> TransferEngine<S> {
    pub fn new(store: Arc<S>, observer: Arc<dyn LedgerObserver>) -> Self {
        Self {
            accounts: AccountRepository::new(store.clone()),
            transactions: TransactionRepository::new(store.clone()),
            store,
            observer,
            timeout: None,
        }
    }

    /// Bound the stages before commit by `timeout`.
    ///
    /// On expiry the open unit of work is dropped (rolled back) and the
    /// call fails `ServiceUnavailable`. Once commit has been issued it runs
    /// to completion, so a timeout never hides a commit that landed.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Move `amount` from `source` to `destination`.
    ///
    /// The amount is rounded to the currency scale once, up front; the
    /// debit, the credit and the log entry all use that value.
    pub async fn transfer(
        &self,
        source: AccountId,
        destination: AccountId,
        amount: Decimal,
    ) -> Result<TransactionRecord, LedgerError> {
        let amount = money::normalize(amount);
        let state = StateCell::new();

        let result = self.run(source, destination, amount, &state).await;

        match &result {
            Ok(record) => {
                self.observer.notify(&LedgerEvent::TransferCommitted {
                    transaction_id: record.id,
                    source,
                    destination,
                    amount,
                });
            }
            Err(e) => {
                self.observer.notify(&LedgerEvent::TransferAborted {
                    source,
                    destination,
                    amount,
                    state: state.abort(),
                    error: e.clone(),
                });
            }
        }
        result
    }

    async fn run(
        &self,
        source: AccountId,
        destination: AccountId,
        amount: Decimal,
        state: &StateCell,
    ) -> Result<TransactionRecord, LedgerError> {
        let prepared = self.prepare(source, destination, amount, state);
        let (uow, record) = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, prepared)
                .await
                .unwrap_or_else(|_| {
                    warn!(
                        source,
                        destination,
                        state = %state.get(),
                        timeout_ms = limit.as_millis() as u64,
                        "Transfer timed out before commit"
                    );
                    Err(LedgerError::ServiceUnavailable(format!(
                        "transfer timed out after {} ms",
                        limit.as_millis()
                    )))
                })?,
            None => prepared.await?,
        };

        if let Err(e) = uow.commit().await {
            // Rejected at commit (e.g. serialization failure); nothing was applied
            error!(
                source,
                destination,
                state = %state.get(),
                error = %e,
                "Commit failed"
            );
            return Err(LedgerError::DebitFailed);
        }
        state.advance();
        debug!(transaction_id = record.id, "Unit of work committed");
        Ok(record)
    }

    /// Validation through Recording. Returns the unit of work ready to
    /// commit; on failure it has already been rolled back.
    async fn prepare(
        &self,
        source: AccountId,
        destination: AccountId,
        amount: Decimal,
        state: &StateCell,
    ) -> Result<(S::Unit, TransactionRecord), LedgerError> {
        validation::validate(&self.accounts, source, destination, amount).await?;

        let mut uow = self.store.begin().await.map_err(|e| {
            error!(store = self.store.name(), error = %e, "Failed to open unit of work");
            LedgerError::ServiceUnavailable(e.to_string())
        })?;

        match self.apply(source, destination, amount, &mut uow, state).await {
            Ok(record) => Ok((uow, record)),
            Err(e) => {
                if let Err(rb) = uow.rollback().await {
                    warn!(error = %rb, "Rollback failed; unit of work discarded on drop");
                }
                Err(e)
            }
        }
    }

    async fn apply(
        &self,
        source: AccountId,
        destination: AccountId,
        amount: Decimal,
        uow: &mut S::Unit,
        state: &StateCell,
    ) -> Result<TransactionRecord, LedgerError> {
        state.advance(); // Debiting

        // Without conflict detection the debit-then-credit order could
        // deadlock against a transfer in the opposite direction; take both
        // row locks lowest id first.
        if !self.store.serializable() {
            let (first, second) = if source < destination {
                (source, destination)
            } else {
                (destination, source)
            };
            for account_id in [first, second] {
                self.accounts
                    .lock_for_update(account_id, uow)
                    .await
                    .map_err(|e| {
                        error!(account_id, error = %e, "Failed to lock account row");
                        LedgerError::DebitFailed
                    })?;
            }
        }

        match self.accounts.update_balance_tx(source, -amount, uow).await {
            Ok(balance) => debug!(source, %balance, "Source debited"),
            Err(LedgerError::InsufficientFunds) => return Err(LedgerError::InsufficientFunds),
            Err(e) => {
                error!(source, error = %e, "Debit failed");
                return Err(LedgerError::DebitFailed);
            }
        }

        state.advance(); // Crediting
        match self.accounts.update_balance_tx(destination, amount, uow).await {
            Ok(balance) => debug!(destination, %balance, "Destination credited"),
            Err(LedgerError::BalanceLimitExceeded) => {
                return Err(LedgerError::BalanceLimitExceeded);
            }
            Err(e) => {
                error!(destination, error = %e, "Credit failed");
                return Err(LedgerError::CreditFailed);
            }
        }

        state.advance(); // Recording
        let entry = NewTransaction {
            source_account_id: source,
            destination_account_id: destination,
            amount,
        };
        self.transactions.append(&entry, uow).await.map_err(|e| {
            error!(source, destination, error = %e, "Failed to record transaction");
            LedgerError::RecordFailed
        })
    }

    /// Entries touching `account_id`, newest first.
    ///
    /// `limit` defaults to [`DEFAULT_HISTORY_LIMIT`] and is clamped to
    /// `1..=MAX_HISTORY_LIMIT`.
    pub async fn transaction_history(
        &self,
        account_id: AccountId,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<TransactionRecord>, LedgerError> {
        if account_id <= 0 {
            return Err(LedgerError::InvalidAccountId);
        }
        if !self.accounts.exists(account_id).await? {
            return Err(LedgerError::AccountNotFound(account_id));
        }

        let limit = limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT);
        self.transactions
            .history(account_id, limit, offset.unwrap_or(0))
            .await
    }

    pub async fn get_transaction(
        &self,
        transaction_id: TransactionId,
    ) -> Result<TransactionRecord, LedgerError> {
        if transaction_id <= 0 {
            return Err(LedgerError::InvalidTransactionId);
        }
        self.transactions.get_by_id(transaction_id).await
    }

    /// Whole log, newest first (admin)
    pub async fn list_transactions(&self) -> Result<Vec<TransactionRecord>, LedgerError> {
        self.transactions.list_all().await
    }
}
