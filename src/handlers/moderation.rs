//! Catalog curation handlers: categories, tags, verification

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde_json::json;

use crate::error::ServiceError;
use crate::models::{
    AssignTagsRequest, CategoryRequest, TagRequest, UpdateCategoryRequest, VerifyRequest,
};
use crate::AppState;

/// List all categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServiceError> {
    let categories = state.moderation.list_categories()?;

    Ok(Json(json!({ "categories": categories })))
}

/// Create a category
pub async fn add_category(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CategoryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let category = state
        .moderation
        .add_category(&req.name, req.description.as_deref())?;

    Ok((StatusCode::CREATED, Json(json!({ "category": category }))))
}

/// Rename and/or re-describe a category
pub async fn update_category(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<i64>,
    Json(req): Json<UpdateCategoryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let category = state.moderation.update_category(
        category_id,
        req.name.as_deref(),
        req.description.as_deref(),
    )?;

    Ok(Json(json!({ "category": category })))
}

/// Delete a category that no module references
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    state.moderation.delete_category(category_id)?;

    Ok(Json(json!({ "success": true })))
}

/// List all tags
pub async fn list_tags(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServiceError> {
    let tags = state.moderation.list_tags()?;

    Ok(Json(json!({ "tags": tags })))
}

/// Create a tag
pub async fn add_tag(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TagRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let tag = state.moderation.add_tag(&req.name)?;

    Ok((StatusCode::CREATED, Json(json!({ "tag": tag }))))
}

/// Rename a tag
pub async fn update_tag(
    State(state): State<Arc<AppState>>,
    Path(tag_id): Path<i64>,
    Json(req): Json<TagRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let tag = state.moderation.update_tag(tag_id, &req.name)?;

    Ok(Json(json!({ "tag": tag })))
}

/// Delete a tag that no module carries
pub async fn delete_tag(
    State(state): State<Arc<AppState>>,
    Path(tag_id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    state.moderation.delete_tag(tag_id)?;

    Ok(Json(json!({ "success": true })))
}

/// Reconcile a module's tag set to exactly the requested ids
pub async fn assign_tags(
    State(state): State<Arc<AppState>>,
    Path(module_id): Path<i64>,
    Json(req): Json<AssignTagsRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state.moderation.assign_tags_to_module(module_id, &req.tag_ids)?;

    Ok(Json(json!({ "success": true })))
}

/// Modules awaiting verification
pub async fn list_unverified(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServiceError> {
    let modules = state.moderation.list_unverified()?;

    Ok(Json(json!({ "modules": modules })))
}

/// Set a module's verification status (idempotent)
pub async fn verify_module(
    State(state): State<Arc<AppState>>,
    Path(module_id): Path<i64>,
    Json(req): Json<VerifyRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let module = state.moderation.verify(module_id, req.verified)?;

    Ok(Json(json!({ "module": module })))
}
