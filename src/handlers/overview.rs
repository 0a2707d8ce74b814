use axum::extract::State;

use crate::database::models::Overview;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/overview - `{ data: Overview }`, computed on every call
pub async fn get(State(state): State<AppState>) -> ApiResult<Overview> {
    let category_count = state.categories.count().await?;
    let transactions = state.transactions.list(None).await?;
    Ok(ApiResponse::success(Overview::summarize(&transactions, category_count)))
}
