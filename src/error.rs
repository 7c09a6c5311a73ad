//! Ledger Error Taxonomy
//!
//! One closed enumeration for every failure the core can report. Each
//! variant belongs to exactly one [`ErrorCategory`]; the boundary layer
//! picks its response from the category, never from the message text.

use thiserror::Error;

use crate::core_types::{AccountId, TransactionId};
use crate::store::StoreError;

/// Response category a boundary layer can map to its own protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Caller's fault, no store access was attempted
    InvalidInput,
    /// A referenced account or transaction does not exist
    NotFound,
    /// Request collides with existing state (duplicate account)
    Conflict,
    /// Well-formed request, but a business rule refused it
    Unprocessable,
    /// Infrastructure failure before or at commit; the unit of work did not
    /// commit. Only a connection lost while the commit was in flight
    /// leaves the outcome unknown.
    Unavailable,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::InvalidInput => "INVALID_INPUT",
            ErrorCategory::NotFound => "NOT_FOUND",
            ErrorCategory::Conflict => "CONFLICT",
            ErrorCategory::Unprocessable => "UNPROCESSABLE",
            ErrorCategory::Unavailable => "UNAVAILABLE",
        }
    }

    /// Whether the same request may succeed if simply sent again.
    #[inline]
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Unavailable)
    }
}

/// Ledger error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    // === Input Errors ===
    #[error("cannot transfer to same account")]
    SameAccountTransfer,

    #[error("transfer amount must be positive")]
    NonPositiveAmount,

    #[error("invalid account IDs")]
    InvalidAccountIdentifier,

    #[error("account ID must be positive")]
    InvalidAccountId,

    #[error("account balance cannot be negative")]
    NegativeBalance,

    #[error("transaction ID must be positive")]
    InvalidTransactionId,

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("amount exceeds the ledger limit")]
    AmountOutOfRange,

    // === Not-Found Errors ===
    #[error("source account not found")]
    SourceAccountNotFound,

    #[error("destination account not found")]
    DestinationAccountNotFound,

    #[error("account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    // === Conflict Errors ===
    #[error("account already exists: {0}")]
    AccountAlreadyExists(AccountId),

    // === Business-Rule Errors ===
    #[error("insufficient funds")]
    InsufficientFunds,

    #[error("destination balance would exceed the ledger limit")]
    BalanceLimitExceeded,

    // === Infrastructure Errors ===
    #[error("failed to debit source account")]
    DebitFailed,

    #[error("failed to credit destination account")]
    CreditFailed,

    #[error("failed to record transaction")]
    RecordFailed,

    #[error("service temporarily unavailable: {0}")]
    ServiceUnavailable(String),
}

impl LedgerError {
    /// Kind-to-category table.
    pub fn category(&self) -> ErrorCategory {
        match self {
            LedgerError::SameAccountTransfer
            | LedgerError::NonPositiveAmount
            | LedgerError::InvalidAccountIdentifier
            | LedgerError::InvalidAccountId
            | LedgerError::NegativeBalance
            | LedgerError::InvalidTransactionId
            | LedgerError::MalformedPayload(_)
            | LedgerError::AmountOutOfRange => ErrorCategory::InvalidInput,
            LedgerError::SourceAccountNotFound
            | LedgerError::DestinationAccountNotFound
            | LedgerError::AccountNotFound(_)
            | LedgerError::TransactionNotFound(_) => ErrorCategory::NotFound,
            LedgerError::AccountAlreadyExists(_) => ErrorCategory::Conflict,
            LedgerError::InsufficientFunds | LedgerError::BalanceLimitExceeded => {
                ErrorCategory::Unprocessable
            }
            LedgerError::DebitFailed
            | LedgerError::CreditFailed
            | LedgerError::RecordFailed
            | LedgerError::ServiceUnavailable(_) => ErrorCategory::Unavailable,
        }
    }

    /// Stable error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::SameAccountTransfer => "SAME_ACCOUNT_TRANSFER",
            LedgerError::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            LedgerError::InvalidAccountIdentifier => "INVALID_ACCOUNT_IDENTIFIER",
            LedgerError::InvalidAccountId => "INVALID_ACCOUNT_ID",
            LedgerError::NegativeBalance => "NEGATIVE_BALANCE",
            LedgerError::InvalidTransactionId => "INVALID_TRANSACTION_ID",
            LedgerError::MalformedPayload(_) => "MALFORMED_PAYLOAD",
            LedgerError::AmountOutOfRange => "AMOUNT_OUT_OF_RANGE",
            LedgerError::SourceAccountNotFound => "SOURCE_ACCOUNT_NOT_FOUND",
            LedgerError::DestinationAccountNotFound => "DESTINATION_ACCOUNT_NOT_FOUND",
            LedgerError::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            LedgerError::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            LedgerError::AccountAlreadyExists(_) => "ACCOUNT_ALREADY_EXISTS",
            LedgerError::InsufficientFunds => "INSUFFICIENT_FUNDS",
            LedgerError::BalanceLimitExceeded => "BALANCE_LIMIT_EXCEEDED",
            LedgerError::DebitFailed => "DEBIT_FAILED",
            LedgerError::CreditFailed => "CREDIT_FAILED",
            LedgerError::RecordFailed => "RECORD_FAILED",
            LedgerError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

impl From<StoreError> for LedgerError {
    fn from(e: StoreError) -> Self {
        LedgerError::ServiceUnavailable(e.to_string())
    }
}
