//! Ledger observability sink
//!
//! Business events are handed to an injected [`LedgerObserver`] instead of
//! being logged from inside the core. Production wires in
//! [`TracingObserver`]; tests substitute [`RecordingObserver`] to assert on
//! what happened, or [`NoopObserver`] to stay quiet.

use std::sync::{Mutex, PoisonError};

use rust_decimal::Decimal;
use tracing::{error, info, warn};

use crate::core_types::{AccountId, TransactionId};
use crate::error::{ErrorCategory, LedgerError};
use crate::transfer::TransferState;

/// Event emitted by the ledger core
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    AccountCreated {
        account_id: AccountId,
        balance: Decimal,
    },
    AccountRejected {
        account_id: AccountId,
        error: LedgerError,
    },
    TransferCommitted {
        transaction_id: TransactionId,
        source: AccountId,
        destination: AccountId,
        amount: Decimal,
    },
    /// `state` is the stage the transfer was in when it failed.
    TransferAborted {
        source: AccountId,
        destination: AccountId,
        amount: Decimal,
        state: TransferState,
        error: LedgerError,
    },
}

/// Observability sink passed explicitly to each component
pub trait LedgerObserver: Send + Sync {
    fn notify(&self, event: &LedgerEvent);
}

/// Emits every event as a `tracing` record
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl LedgerObserver for TracingObserver {
    fn notify(&self, event: &LedgerEvent) {
        match event {
            LedgerEvent::AccountCreated {
                account_id,
                balance,
            } => {
                info!(account_id, %balance, "Account created");
            }
            LedgerEvent::AccountRejected { account_id, error } => {
                warn!(account_id, code = error.code(), %error, "Account creation rejected");
            }
            LedgerEvent::TransferCommitted {
                transaction_id,
                source,
                destination,
                amount,
            } => {
                info!(
                    transaction_id,
                    source,
                    destination,
                    %amount,
                    "Transfer committed"
                );
            }
            LedgerEvent::TransferAborted {
                source,
                destination,
                amount,
                state,
                error,
            } => {
                if error.category() == ErrorCategory::Unavailable {
                    error!(
                        source,
                        destination,
                        %amount,
                        state = state.as_str(),
                        rolled_back = state.holds_unit_of_work(),
                        code = error.code(),
                        %error,
                        "Transfer aborted"
                    );
                } else {
                    warn!(
                        source,
                        destination,
                        %amount,
                        state = state.as_str(),
                        rolled_back = state.holds_unit_of_work(),
                        code = error.code(),
                        %error,
                        "Transfer aborted"
                    );
                }
            }
        }
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl LedgerObserver for NoopObserver {
    fn notify(&self, _event: &LedgerEvent) {}
}

/// Keeps every event in memory, in arrival order
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<LedgerEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LedgerEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn committed_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, LedgerEvent::TransferCommitted { .. }))
            .count()
    }

    /// Errors of all aborted transfers
    pub fn aborts(&self) -> Vec<(TransferState, LedgerError)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                LedgerEvent::TransferAborted { state, error, .. } => Some((state, error)),
                _ => None,
            })
            .collect()
    }
}

impl LedgerObserver for RecordingObserver {
    fn notify(&self, event: &LedgerEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}
