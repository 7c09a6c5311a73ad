//! Gateway types module
//!
//! ## Input Types
//! - [`StrictDecimal`]: Format-validated decimal for API input
//! - [`CreateAccountRequest`], [`TransferRequest`], [`HistoryQuery`]
//!
//! ## Output Types
//! - [`ApiResponse<T>`]: Unified API response wrapper
//! - [`ApiError`] / [`ApiResult<T>`]: Error path with category-derived status
//!
//! Amounts always travel as JSON strings.

pub mod money;
pub mod response;

pub use money::StrictDecimal;
pub use response::{ApiError, ApiResponse, ApiResult, created, error_codes, ok};

use serde::{Deserialize, Serialize};

use crate::core_types::AccountId;

/// POST /accounts body
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub account_id: AccountId,
    pub initial_balance: StrictDecimal,
}

/// POST /transactions body
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub source_account_id: AccountId,
    pub destination_account_id: AccountId,
    pub amount: StrictDecimal,
}

/// GET /accounts/{account_id}/transactions query
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// GET /healthz data
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub store: &'static str,
    pub timestamp_ms: u64,
}
