#![allow(dead_code)]

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use dashboard_api::auth::{generate_jwt, Claims};
use dashboard_api::config::AppConfig;
use dashboard_api::database::models::{Role, User};
use dashboard_api::{app, AppState};

pub const SECRET: &str = "integration-secret";

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.jwt_secret = SECRET.to_string();
    config
}

/// Fresh in-memory state and router; nothing is shared between tests.
pub fn test_app() -> (AppState, Router) {
    let state = AppState::in_memory(test_config());
    let router = app(state.clone());
    (state, router)
}

pub fn user(name: &str, role: &str) -> User {
    User {
        id: Uuid::new_v4(),
        name: name.to_string(),
        role: Role::parse(role),
    }
}

pub fn creator() -> User {
    user("casey", "CREATOR")
}

pub fn admin() -> User {
    user("ada", "ADMIN")
}

pub fn token_for(user: &User) -> String {
    let claims = Claims::new(user, 1).expect("valid token lifetime");
    generate_jwt(&claims, SECRET).expect("failed to mint test token")
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("token={}", token));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).expect("failed to build request")
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    request(Method::GET, uri, token, None)
}

/// Send a request; the JSON body is `Value::Null` when the response is empty.
pub async fn send(router: &Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, body))
}
