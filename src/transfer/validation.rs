//! Transfer request validation
//!
//! Store-independent checks run first so a request that can be refused
//! locally never costs a round-trip. Order is fixed:
//!
//! 1. same account        → `SameAccountTransfer`
//! 2. amount <= 0         → `NonPositiveAmount`
//!    amount >= limit     → `AmountOutOfRange`
//! 3. id <= 0 (either)    → `InvalidAccountIdentifier`
//! 4. source exists       → `SourceAccountNotFound`
//! 5. destination exists  → `DestinationAccountNotFound`
//!
//! A failing existence lookup is reported as not-found, not as an
//! infrastructure error; the lookup failure itself is logged.

use rust_decimal::Decimal;
use tracing::{error, warn};

use crate::account::AccountRepository;
use crate::core_types::AccountId;
use crate::error::LedgerError;
use crate::money;
use crate::store::LedgerStore;

/// Checks 1-3. Pure; no store access.
pub fn check_request(
    source: AccountId,
    destination: AccountId,
    amount: Decimal,
) -> Result<(), LedgerError> {
    if source == destination {
        return Err(LedgerError::SameAccountTransfer);
    }
    if amount <= Decimal::ZERO {
        return Err(LedgerError::NonPositiveAmount);
    }
    if !money::within_limit(amount) {
        return Err(LedgerError::AmountOutOfRange);
    }
    if source <= 0 || destination <= 0 {
        return Err(LedgerError::InvalidAccountIdentifier);
    }
    Ok(())
}

/// Full validation: local checks, then both existence lookups.
///
/// No side effects; safe to call repeatedly.
pub async fn validate<S: LedgerStore>(
    accounts: &AccountRepository<S>,
    source: AccountId,
    destination: AccountId,
    amount: Decimal,
) -> Result<(), LedgerError> {
    if let Err(e) = check_request(source, destination, amount) {
        warn!(source, destination, %amount, code = e.code(), "Transfer request rejected");
        return Err(e);
    }

    ensure_exists(accounts, source, LedgerError::SourceAccountNotFound).await?;
    ensure_exists(accounts, destination, LedgerError::DestinationAccountNotFound).await?;
    Ok(())
}

async fn ensure_exists<S: LedgerStore>(
    accounts: &AccountRepository<S>,
    account_id: AccountId,
    not_found: LedgerError,
) -> Result<(), LedgerError> {
    match accounts.exists(account_id).await {
        Ok(true) => Ok(()),
        Ok(false) => {
            warn!(account_id, code = not_found.code(), "Account not found");
            Err(not_found)
        }
        Err(e) => {
            error!(account_id, error = %e, "Account existence check failed");
            Err(not_found)
        }
    }
}
