use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::Value;
use tracing::info;

use super::{json_body, parse_id};
use crate::database::models::Category;
use crate::middleware::{ApiResponse, ApiResult};
use crate::schema::category::{validate_create, validate_update, CategoryPatch};
use crate::state::AppState;

/// GET /api/categories
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Category>> {
    let categories = state.categories.list().await?;
    Ok(ApiResponse::success(categories))
}

/// GET /api/categories/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Category> {
    let id = parse_id(&id)?;
    Ok(ApiResponse::success(state.categories.get(id).await?))
}

/// POST /api/categories - body `{ name, label }`, both required
pub async fn create(State(state): State<AppState>, body: Result<Json<Value>, JsonRejection>) -> ApiResult<Category> {
    let input = validate_create(&json_body(body)?)?;
    let category = state.categories.create(input).await?;
    state.overview.invalidate();

    info!(id = %category.id, name = %category.name, "category created");
    Ok(ApiResponse::created(category))
}

/// PATCH /api/categories/:id - partial update, only supplied fields change
pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Category> {
    let id = parse_id(&id)?;
    let patch = validate_update(&json_body(body)?)?;
    let category = state.categories.update(id, patch).await?;
    state.overview.invalidate();

    info!(id = %category.id, "category updated");
    Ok(ApiResponse::success(category))
}

/// PUT /api/categories/:id - full replace, validated like a create
pub async fn put(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Category> {
    let id = parse_id(&id)?;
    let input = validate_create(&json_body(body)?)?;
    let patch = CategoryPatch {
        name: Some(input.name),
        label: Some(input.label),
    };
    let category = state.categories.update(id, patch).await?;
    state.overview.invalidate();

    info!(id = %category.id, "category replaced");
    Ok(ApiResponse::success(category))
}

/// DELETE /api/categories/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let id = parse_id(&id)?;
    state.categories.delete(id).await?;
    state.overview.invalidate();

    info!(%id, "category deleted");
    Ok(ApiResponse::no_content())
}
