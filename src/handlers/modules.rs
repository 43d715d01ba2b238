//! Module catalog handlers

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::error::ServiceError;
use crate::models::{
    AddReportRequest, AddReviewRequest, AddVersionRequest, NewModule, UploadModuleRequest,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// List all modules
pub async fn list_modules(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServiceError> {
    let modules = state.modules.list_all()?;

    Ok(Json(json!({ "modules": modules })))
}

/// Search modules by name substring
pub async fn search_modules(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let modules = state.modules.search_by_name(query.q.as_deref().unwrap_or(""))?;

    Ok(Json(json!({ "modules": modules })))
}

/// Full module detail: author, category, versions with reports, reviews, tags
pub async fn get_module(
    State(state): State<Arc<AppState>>,
    Path(module_id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let detail = state.modules.get_by_id(module_id)?;

    Ok(Json(json!({ "module": detail })))
}

/// Publish a new module with its first version
pub async fn upload_module(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UploadModuleRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let module = state.modules.upload_new_module(NewModule {
        author_id: req.author_id,
        name: req.name,
        description: req.description,
        category_id: req.category_id,
        version: req.version,
        download_link: req.download_link,
        changelog: req.changelog,
        min_platform_version: req.min_platform_version,
        file_size_mb: req.file_size_mb,
    })?;

    Ok((StatusCode::CREATED, Json(json!({ "module": module }))))
}

/// Append a release to a module the caller authored
pub async fn add_version(
    State(state): State<Arc<AppState>>,
    Path(module_id): Path<i64>,
    Json(req): Json<AddVersionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let version = state.modules.add_version_to_module(
        module_id,
        req.author_id,
        &req.version,
        &req.download_link,
        req.changelog.as_deref(),
        &req.min_platform_version,
        req.file_size_mb,
    )?;

    Ok((StatusCode::CREATED, Json(json!({ "version": version }))))
}

/// Add a review to a module
pub async fn add_review(
    State(state): State<Arc<AppState>>,
    Path(module_id): Path<i64>,
    Json(req): Json<AddReviewRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let review =
        state
            .modules
            .add_review(module_id, req.user_id, req.rating, req.comment.as_deref())?;

    Ok((StatusCode::CREATED, Json(json!({ "review": review }))))
}

/// File a compatibility report against a module version
pub async fn add_report(
    State(state): State<Arc<AppState>>,
    Path(version_id): Path<i64>,
    Json(req): Json<AddReportRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let report = state.modules.add_compatibility_report(
        version_id,
        req.user_id,
        &req.device_model,
        &req.android_version,
        &req.works_status,
        req.notes.as_deref(),
    )?;

    Ok((StatusCode::CREATED, Json(json!({ "report": report }))))
}

/// Modules authored by a given user
pub async fn list_by_author(
    State(state): State<Arc<AppState>>,
    Path(author_id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let modules = state.modules.list_by_author(author_id)?;

    Ok(Json(json!({ "modules": modules })))
}
