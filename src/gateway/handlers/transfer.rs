//! Transfer handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResult, TransferRequest, created, ok};
use crate::core_types::TransactionId;
use crate::store::LedgerStore;
use crate::transaction::TransactionRecord;

/// Transfer endpoint
///
/// POST /transactions
///
/// Returns 201 with the committed log entry. Failures carry the ledger
/// error code. A 503 means the unit of work did not commit, except when
/// the store connection was lost mid-commit.
pub async fn create_transfer<S: LedgerStore>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> ApiResult<TransactionRecord> {
    let Json(req) = payload.map_err(|e| {
        tracing::warn!(error = %e, "Rejected transfer payload");
        ApiError::malformed(e.body_text())
    })?;

    let record = state
        .engine
        .transfer(
            req.source_account_id,
            req.destination_account_id,
            req.amount.inner(),
        )
        .await?;
    created(record)
}

/// Get one log entry
///
/// GET /transactions/{transaction_id}
pub async fn get_transaction<S: LedgerStore>(
    State(state): State<Arc<AppState<S>>>,
    transaction_id: Result<Path<TransactionId>, PathRejection>,
) -> ApiResult<TransactionRecord> {
    let Path(transaction_id) = transaction_id.map_err(|e| ApiError::malformed(e.body_text()))?;
    ok(state.engine.get_transaction(transaction_id).await?)
}

/// Whole log, newest first
///
/// GET /transactions
pub async fn list_transactions<S: LedgerStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ApiResult<Vec<TransactionRecord>> {
    ok(state.engine.list_transactions().await?)
}
