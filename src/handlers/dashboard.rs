use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension,
};
use serde::Serialize;

use crate::auth::AuthContext;
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::state::AppState;
use crate::views::{render_page, Page};

#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub has_token: bool,
    pub state: &'static str,
    pub user: Option<User>,
}

/// GET /dashboard/session - what the layout established for this request
pub async fn session(Extension(auth): Extension<AuthContext>) -> ApiResponse<SessionInfo> {
    ApiResponse::success(SessionInfo {
        has_token: auth.has_token,
        state: auth.state.name(),
        user: auth.user().cloned(),
    })
}

async fn page(page: Page, state: &AppState, auth: &AuthContext) -> Result<Response, ApiError> {
    match render_page(page, auth, &state.dashboard()).await? {
        Some(view) => Ok(ApiResponse::success(view).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// GET /dashboard/overview - creator or admin variant, nothing without a user
pub async fn overview(State(state): State<AppState>, Extension(auth): Extension<AuthContext>) -> Result<Response, ApiError> {
    page(Page::Overview, &state, &auth).await
}

/// GET /dashboard/transactions - creator or admin variant, nothing without a user
pub async fn transactions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Response, ApiError> {
    page(Page::Transactions, &state, &auth).await
}
