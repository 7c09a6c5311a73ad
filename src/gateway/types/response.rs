//! API Response types and error codes
//!
//! - `ApiResponse<T>`: Unified response wrapper
//! - `ApiError` / `ApiResult<T>`: handler error path
//! - `error_codes`: Standard error code constants

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::{ErrorCategory, LedgerError};

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// All API responses follow this structure:
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or null (error)
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            code: error_codes::SUCCESS,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    /// Create error response
    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

// ============================================================================
// Handler Result Types
// ============================================================================

pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

/// 200 OK with data
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(ApiResponse::success(data))))
}

/// 201 Created with data
pub fn created<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::success(data))))
}

/// Error half of [`ApiResult`]
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub msg: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: i32, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            msg: msg.into(),
        }
    }

    /// Request body, path or query could not be decoded
    pub fn malformed(detail: impl std::fmt::Display) -> Self {
        LedgerError::MalformedPayload(detail.to_string()).into()
    }

    pub fn into_err<T>(self) -> ApiResult<T> {
        Err(self)
    }
}

/// HTTP status for each error category
pub fn status_for(category: ErrorCategory) -> StatusCode {
    match category {
        ErrorCategory::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorCategory::NotFound => StatusCode::NOT_FOUND,
        ErrorCategory::Conflict => StatusCode::CONFLICT,
        ErrorCategory::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCategory::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        let msg = match &e {
            // Store detail stays in the logs
            LedgerError::ServiceUnavailable(_) => "service temporarily unavailable".to_string(),
            other => other.to_string(),
        };
        Self::new(status_for(e.category()), error_codes::for_error(&e), msg)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ApiResponse::<()>::error(self.code, self.msg)),
        )
            .into_response()
    }
}

// ============================================================================
// Error Codes
// ============================================================================

/// Standard API error codes
pub mod error_codes {
    use crate::error::LedgerError;

    // Success
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const SAME_ACCOUNT_TRANSFER: i32 = 1001;
    pub const NON_POSITIVE_AMOUNT: i32 = 1002;
    pub const INVALID_ACCOUNT_IDENTIFIER: i32 = 1003;
    pub const INVALID_ACCOUNT_ID: i32 = 1004;
    pub const NEGATIVE_BALANCE: i32 = 1005;
    pub const INVALID_TRANSACTION_ID: i32 = 1006;
    pub const MALFORMED_PAYLOAD: i32 = 1007;
    pub const AMOUNT_OUT_OF_RANGE: i32 = 1008;

    // Resource errors (4xxx)
    pub const SOURCE_ACCOUNT_NOT_FOUND: i32 = 4001;
    pub const DESTINATION_ACCOUNT_NOT_FOUND: i32 = 4002;
    pub const ACCOUNT_NOT_FOUND: i32 = 4003;
    pub const TRANSACTION_NOT_FOUND: i32 = 4004;
    pub const ROUTE_NOT_FOUND: i32 = 4005;
    pub const ACCOUNT_ALREADY_EXISTS: i32 = 4091;
    pub const INSUFFICIENT_FUNDS: i32 = 4221;
    pub const BALANCE_LIMIT_EXCEEDED: i32 = 4222;

    // Server errors (5xxx)
    pub const SERVICE_UNAVAILABLE: i32 = 5001;
    pub const DEBIT_FAILED: i32 = 5002;
    pub const CREDIT_FAILED: i32 = 5003;
    pub const RECORD_FAILED: i32 = 5004;

    pub fn for_error(e: &LedgerError) -> i32 {
        match e {
            LedgerError::SameAccountTransfer => SAME_ACCOUNT_TRANSFER,
            LedgerError::NonPositiveAmount => NON_POSITIVE_AMOUNT,
            LedgerError::InvalidAccountIdentifier => INVALID_ACCOUNT_IDENTIFIER,
            LedgerError::InvalidAccountId => INVALID_ACCOUNT_ID,
            LedgerError::NegativeBalance => NEGATIVE_BALANCE,
            LedgerError::InvalidTransactionId => INVALID_TRANSACTION_ID,
            LedgerError::MalformedPayload(_) => MALFORMED_PAYLOAD,
            LedgerError::AmountOutOfRange => AMOUNT_OUT_OF_RANGE,
            LedgerError::SourceAccountNotFound => SOURCE_ACCOUNT_NOT_FOUND,
            LedgerError::DestinationAccountNotFound => DESTINATION_ACCOUNT_NOT_FOUND,
            LedgerError::AccountNotFound(_) => ACCOUNT_NOT_FOUND,
            LedgerError::TransactionNotFound(_) => TRANSACTION_NOT_FOUND,
            LedgerError::AccountAlreadyExists(_) => ACCOUNT_ALREADY_EXISTS,
            LedgerError::InsufficientFunds => INSUFFICIENT_FUNDS,
            LedgerError::BalanceLimitExceeded => BALANCE_LIMIT_EXCEEDED,
            LedgerError::DebitFailed => DEBIT_FAILED,
            LedgerError::CreditFailed => CREDIT_FAILED,
            LedgerError::RecordFailed => RECORD_FAILED,
            LedgerError::ServiceUnavailable(_) => SERVICE_UNAVAILABLE,
        }
    }
}
