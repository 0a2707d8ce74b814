// handlers/mod.rs - HTTP handlers grouped by surface
//
// Public:    /, /health
// Dashboard: /dashboard/* (auth layout, never rejects, renders per role)
// API:       /api/* (resolved user required)
pub mod categories;
pub mod dashboard;
pub mod overview;
pub mod root;
pub mod transactions;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde_json::Value;
use uuid::Uuid;

use crate::error::ApiError;

/// Unwrap a JSON body, reporting malformed input as `INVALID_JSON`.
pub(crate) fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::invalid_json(rejection.body_text()))
}

pub(crate) fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::bad_request(format!("invalid UUID: {}", id)))
}
