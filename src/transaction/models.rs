//! Transaction log data model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::core_types::{AccountId, TransactionId};

/// Entry to append; id and timestamp are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub source_account_id: AccountId,
    pub destination_account_id: AccountId,
    /// Already normalized to the currency scale
    pub amount: Decimal,
}

/// Committed ledger entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub source_account_id: AccountId,
    pub destination_account_id: AccountId,
    #[serde(serialize_with = "crate::money::as_string::serialize")]
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Whether `account_id` is either side of this entry
    #[inline]
    pub fn involves(&self, account_id: AccountId) -> bool {
        self.source_account_id == account_id || self.destination_account_id == account_id
    }
}
