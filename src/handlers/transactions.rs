use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde_json::Value;
use tracing::info;

use super::json_body;
use crate::database::models::Transaction;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::schema::transaction::validate_create;
use crate::state::AppState;

/// GET /api/transactions - newest first
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Transaction>> {
    Ok(ApiResponse::success(state.transactions.list(None).await?))
}

/// POST /api/transactions - recorded under the calling user
pub async fn create(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Transaction> {
    let input = validate_create(&json_body(body)?)?;
    let tx = state.transactions.create(input, user.id).await?;
    state.overview.invalidate();

    info!(id = %tx.id, created_by = %user.id, "transaction recorded");
    Ok(ApiResponse::created(tx))
}
