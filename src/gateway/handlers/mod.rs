//! HTTP handlers
//!
//! Handlers are generic over the ledger store so the same router serves
//! PostgreSQL in production and the in-memory store in tests.

pub mod account;
pub mod health;
pub mod transfer;

pub use account::{create_account, get_account, get_account_transactions, list_accounts};
pub use health::health_check;
pub use transfer::{create_transfer, get_transaction, list_transactions};

use super::types::{ApiError, ApiResult};

/// Fallback for unknown routes
pub async fn not_found() -> ApiResult<()> {
    ApiError::new(
        axum::http::StatusCode::NOT_FOUND,
        super::types::error_codes::ROUTE_NOT_FOUND,
        "route not found",
    )
    .into_err()
}
