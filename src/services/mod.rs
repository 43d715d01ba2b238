//! Business-rule layer
//!
//! Each service validates input before touching the store, then calls the
//! repositories and translates failures into typed [`ServiceError`]s.

mod moderation;
mod modules;
mod users;

pub use moderation::ModerationService;
pub use modules::ModuleService;
pub use users::UserService;

/// Treats whitespace-only strings the same as empty ones.
pub(crate) fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Normalizes an optional free-text field: blank becomes None.
pub(crate) fn normalize_optional(s: Option<&str>) -> Option<String> {
    s.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
