//! Account handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
};

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResult, CreateAccountRequest, HistoryQuery, created, ok};
use crate::account::Account;
use crate::core_types::AccountId;
use crate::store::LedgerStore;
use crate::transaction::TransactionRecord;

/// Create account endpoint
///
/// POST /accounts
pub async fn create_account<S: LedgerStore>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> ApiResult<Account> {
    let Json(req) = payload.map_err(|e| {
        tracing::warn!(error = %e, "Rejected account payload");
        ApiError::malformed(e.body_text())
    })?;

    let account = state
        .accounts
        .create_account(req.account_id, req.initial_balance.inner())
        .await?;
    created(account)
}

/// List accounts endpoint
///
/// GET /accounts
pub async fn list_accounts<S: LedgerStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ApiResult<Vec<Account>> {
    ok(state.accounts.list_accounts().await?)
}

/// Get account endpoint
///
/// GET /accounts/{account_id}
pub async fn get_account<S: LedgerStore>(
    State(state): State<Arc<AppState<S>>>,
    account_id: Result<Path<AccountId>, PathRejection>,
) -> ApiResult<Account> {
    let Path(account_id) = account_id.map_err(|e| ApiError::malformed(e.body_text()))?;
    ok(state.accounts.get_account(account_id).await?)
}

/// Account history endpoint, newest first
///
/// GET /accounts/{account_id}/transactions?limit=&offset=
pub async fn get_account_transactions<S: LedgerStore>(
    State(state): State<Arc<AppState<S>>>,
    account_id: Result<Path<AccountId>, PathRejection>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> ApiResult<Vec<TransactionRecord>> {
    let Path(account_id) = account_id.map_err(|e| ApiError::malformed(e.body_text()))?;
    let Query(query) = query.map_err(|e| ApiError::malformed(e.body_text()))?;

    let records = state
        .engine
        .transaction_history(account_id, query.limit, query.offset)
        .await?;
    ok(records)
}
