//! Application state and configuration

use std::path::PathBuf;

use crate::db::Database;
use crate::services::{ModerationService, ModuleService, UserService};

/// Application state shared across all handlers
pub struct AppState {
    /// Data directory for ModHub
    pub data_dir: PathBuf,

    /// SQLite database holding the catalog
    pub db: Database,

    /// Registration and login
    pub users: UserService,

    /// Module browsing, publishing, reviews, compatibility reports
    pub modules: ModuleService,

    /// Category/tag curation and module verification
    pub moderation: ModerationService,
}

impl AppState {
    pub fn new(data_dir: PathBuf) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&data_dir)?;

        let db_path = data_dir.join("modhub.db");
        let db = Database::new(&db_path)?;

        tracing::info!("ModHub data directory: {:?}", data_dir);

        Ok(Self {
            users: UserService::new(db.clone()),
            modules: ModuleService::new(db.clone()),
            moderation: ModerationService::new(db.clone()),
            db,
            data_dir,
        })
    }
}
