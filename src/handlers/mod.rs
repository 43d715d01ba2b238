//! HTTP request handlers

mod auth;
mod moderation;
mod modules;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;

use crate::AppState;

/// Create API routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Health check
        .route("/health", get(health))
        // Authentication
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        // Modules
        .route("/modules", get(modules::list_modules).post(modules::upload_module))
        .route("/modules/search", get(modules::search_modules))
        .route("/modules/:id", get(modules::get_module))
        .route("/modules/:id/versions", post(modules::add_version))
        .route("/modules/:id/reviews", post(modules::add_review))
        .route("/versions/:id/reports", post(modules::add_report))
        .route("/users/:id/modules", get(modules::list_by_author))
        // Catalog curation
        .route(
            "/categories",
            get(moderation::list_categories).post(moderation::add_category),
        )
        .route(
            "/categories/:id",
            put(moderation::update_category).delete(moderation::delete_category),
        )
        .route("/tags", get(moderation::list_tags).post(moderation::add_tag))
        .route(
            "/tags/:id",
            put(moderation::update_tag).delete(moderation::delete_tag),
        )
        .route("/modules/:id/tags", put(moderation::assign_tags))
        // Verification
        .route("/moderation/unverified", get(moderation::list_unverified))
        .route("/modules/:id/verify", put(moderation::verify_module))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "modhub",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
