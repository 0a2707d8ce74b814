use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::layout::read_cookie;
use crate::state::AppState;

/// Verified user attached to protected API requests
#[derive(Clone, Debug)]
pub struct AuthUser(pub User);

/// Protected API guard: the token (cookie or bearer) must resolve to a user.
pub async fn require_user_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let token = match extract_token(request.headers(), &state.config.security.auth_cookie_name) {
        Ok(token) => token,
        Err(msg) => return ApiError::unauthorized(msg).into_response(),
    };

    match state.resolver.resolve(&token).await {
        Ok(user) => {
            request.extensions_mut().insert(AuthUser(user));
            next.run(request).await
        }
        Err(err) => ApiError::unauthorized(err.to_string()).into_response(),
    }
}

/// Auth cookie first, then an `Authorization: Bearer` header
fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Result<String, String> {
    if let Some(token) = read_cookie(headers, cookie_name) {
        return Ok(token.to_string());
    }

    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| "Missing auth token".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        Some(_) => Err("Empty JWT token".to_string()),
        None => Err("Authorization header must use Bearer token format".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_cookie_wins_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("token=from-cookie"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(extract_token(&headers, "token").unwrap(), "from-cookie");
    }

    #[test]
    fn test_bearer_fallback_and_errors() {
        let mut headers = HeaderMap::new();
        assert!(extract_token(&headers, "token").is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(extract_token(&headers, "token").unwrap(), "abc");

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(extract_token(&headers, "token").is_err());
    }
}
