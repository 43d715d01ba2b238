//! Registration and login handlers

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde_json::json;

use crate::error::ServiceError;
use crate::models::{LoginRequest, RegisterRequest};
use crate::AppState;

/// Register a new user
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let user = state
        .users
        .register(&req.username, &req.email, &req.password, req.role.as_deref())?;

    Ok((StatusCode::CREATED, Json(json!({ "user": user }))))
}

/// Login. Returns the matched user with role attached; no session is created.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let user = state.users.login(&req.username, &req.password)?;

    Ok(Json(json!({ "user": user })))
}
