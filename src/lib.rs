//! ModHub - module catalog and marketplace service
//!
//! Users register with role-based permissions (EndUser, Developer,
//! Moderator), developers publish modules with versioned releases, end-users
//! write reviews and device-compatibility reports, and moderators curate
//! categories, tags, and verification status.

pub mod app;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

pub use app::AppState;
pub use db::Database;
pub use error::{DataAccessError, ServiceError};
