//! Core types used throughout the ledger
//!
//! Plain aliases give the identifiers semantic meaning while keeping them
//! bindable as PostgreSQL `BIGINT` without conversion.

/// Account ID - caller-supplied, globally unique, never reassigned.
///
/// # Constraints:
/// - **Positive**: `0` and negative values are rejected before any store access
/// - **Immutable**: the row is never deleted by the ledger, so the id is never reused
pub type AccountId = i64;

/// Transaction ID - assigned by the store on append, monotonically increasing.
///
/// Ids are not dense: an aborted unit of work may consume one (same as a
/// PostgreSQL sequence).
pub type TransactionId = i64;

/// Fractional digits of the ledger currency.
///
/// Every amount and balance is normalized to this scale before it is
/// applied or recorded.
pub const CURRENCY_SCALE: u32 = 2;
