//! Account data model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::core_types::AccountId;

/// Ledger account
///
/// `balance` is never negative once a unit of work touching the account
/// commits; it changes only through the transfer engine's locked update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Account {
    pub account_id: AccountId,
    #[serde(serialize_with = "crate::money::as_string::serialize")]
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}
