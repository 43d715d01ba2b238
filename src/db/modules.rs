//! Module and version repository

use rusqlite::params;

use crate::db::{now, Database};
use crate::error::RepoResult;
use crate::models::{Module, ModuleVersion, NewModule, Tag};

const MODULE_SELECT: &str = r#"
    SELECT m.id, m.name, m.description, m.author_id, m.category_id,
           m.is_verified, m.created_at, m.updated_at,
           u.username AS author_username, c.name AS category_name
    FROM modules m
    JOIN users u ON m.author_id = u.id
    JOIN module_categories c ON m.category_id = c.id
"#;

const VERSION_SELECT: &str = r#"
    SELECT id, module_id, version, changelog, download_link,
           min_platform_version, file_size_mb, uploaded_at
    FROM module_versions
"#;

impl Database {
    /// Create a module and its first version as a single transaction:
    /// either both rows persist or neither does.
    pub fn create_module_with_version(
        &self,
        new: &NewModule,
    ) -> RepoResult<(Module, ModuleVersion)> {
        let mut conn = self.conn();
        let timestamp = now();

        let tx = conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO modules (name, description, author_id, category_id,
                                 is_verified, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5)
            "#,
            params![
                new.name,
                new.description,
                new.author_id,
                new.category_id,
                timestamp,
            ],
        )?;
        let module_id = tx.last_insert_rowid();

        tx.execute(
            r#"
            INSERT INTO module_versions (module_id, version, changelog, download_link,
                                         min_platform_version, file_size_mb, uploaded_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                module_id,
                new.version,
                new.changelog,
                new.download_link,
                new.min_platform_version,
                new.file_size_mb,
                timestamp,
            ],
        )?;
        let version_id = tx.last_insert_rowid();

        tx.commit()?;
        drop(conn);

        let module = self.get_module_by_id(module_id)?.ok_or_else(|| {
            crate::error::DataAccessError(rusqlite::Error::QueryReturnedNoRows)
        })?;
        let version = self.get_version_by_id(version_id)?.ok_or_else(|| {
            crate::error::DataAccessError(rusqlite::Error::QueryReturnedNoRows)
        })?;

        Ok((module, version))
    }

    /// Append a version and refresh the module's updated_at, atomically.
    pub fn add_module_version(
        &self,
        module_id: i64,
        version: &str,
        download_link: &str,
        changelog: Option<&str>,
        min_platform_version: &str,
        file_size_mb: Option<f64>,
    ) -> RepoResult<ModuleVersion> {
        let mut conn = self.conn();
        let timestamp = now();

        let tx = conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO module_versions (module_id, version, changelog, download_link,
                                         min_platform_version, file_size_mb, uploaded_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                module_id,
                version,
                changelog,
                download_link,
                min_platform_version,
                file_size_mb,
                timestamp,
            ],
        )?;
        let version_id = tx.last_insert_rowid();

        tx.execute(
            "UPDATE modules SET updated_at = ?1 WHERE id = ?2",
            params![timestamp, module_id],
        )?;

        tx.commit()?;
        drop(conn);

        Ok(self.get_version_by_id(version_id)?.ok_or_else(|| {
            crate::error::DataAccessError(rusqlite::Error::QueryReturnedNoRows)
        })?)
    }

    /// Get module by ID
    pub fn get_module_by_id(&self, id: i64) -> RepoResult<Option<Module>> {
        let conn = self.conn();

        let result = conn.query_row(
            &format!("{MODULE_SELECT} WHERE m.id = ?1"),
            params![id],
            Module::from_row,
        );

        match result {
            Ok(module) => Ok(Some(module)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get module by name (case-insensitive)
    pub fn get_module_by_name(&self, name: &str) -> RepoResult<Option<Module>> {
        let conn = self.conn();

        let result = conn.query_row(
            &format!("{MODULE_SELECT} WHERE m.name = ?1"),
            params![name],
            Module::from_row,
        );

        match result {
            Ok(module) => Ok(Some(module)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All modules with author and category attached
    pub fn list_modules(&self) -> RepoResult<Vec<Module>> {
        let conn = self.conn();

        let mut stmt = conn.prepare(&format!("{MODULE_SELECT} ORDER BY m.name"))?;
        let modules = stmt
            .query_map([], Module::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(modules)
    }

    /// Case-insensitive substring search on module name
    pub fn search_modules(&self, term: &str) -> RepoResult<Vec<Module>> {
        let conn = self.conn();

        let mut stmt = conn.prepare(&format!(
            "{MODULE_SELECT} WHERE m.name LIKE ?1 ORDER BY m.name"
        ))?;
        let pattern = format!("%{}%", term);
        let modules = stmt
            .query_map(params![pattern], Module::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(modules)
    }

    /// Modules authored by the given user
    pub fn list_modules_by_author(&self, author_id: i64) -> RepoResult<Vec<Module>> {
        let conn = self.conn();

        let mut stmt = conn.prepare(&format!(
            "{MODULE_SELECT} WHERE m.author_id = ?1 ORDER BY m.name"
        ))?;
        let modules = stmt
            .query_map(params![author_id], Module::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(modules)
    }

    /// Modules still awaiting verification
    pub fn list_unverified_modules(&self) -> RepoResult<Vec<Module>> {
        let conn = self.conn();

        let mut stmt = conn.prepare(&format!(
            "{MODULE_SELECT} WHERE m.is_verified = 0 ORDER BY m.created_at"
        ))?;
        let modules = stmt
            .query_map([], Module::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(modules)
    }

    /// Flip the verification flag and refresh updated_at.
    pub fn set_module_verified(&self, module_id: i64, verified: bool) -> RepoResult<()> {
        let conn = self.conn();

        conn.execute(
            "UPDATE modules SET is_verified = ?1, updated_at = ?2 WHERE id = ?3",
            params![verified as i64, now(), module_id],
        )?;

        Ok(())
    }

    /// Get a single version by ID
    pub fn get_version_by_id(&self, id: i64) -> RepoResult<Option<ModuleVersion>> {
        let conn = self.conn();

        let result = conn.query_row(
            &format!("{VERSION_SELECT} WHERE id = ?1"),
            params![id],
            ModuleVersion::from_row,
        );

        match result {
            Ok(version) => Ok(Some(version)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All versions of a module, oldest first
    pub fn get_versions_for_module(&self, module_id: i64) -> RepoResult<Vec<ModuleVersion>> {
        let conn = self.conn();

        let mut stmt = conn.prepare(&format!(
            "{VERSION_SELECT} WHERE module_id = ?1 ORDER BY uploaded_at, id"
        ))?;
        let versions = stmt
            .query_map(params![module_id], ModuleVersion::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(versions)
    }

    /// Tags currently assigned to a module
    pub fn get_tags_for_module(&self, module_id: i64) -> RepoResult<Vec<Tag>> {
        let conn = self.conn();

        let mut stmt = conn.prepare(
            r#"
            SELECT t.id, t.name
            FROM tags t
            JOIN module_tags mt ON t.id = mt.tag_id
            WHERE mt.module_id = ?1
            ORDER BY t.name
            "#,
        )?;
        let tags = stmt
            .query_map(params![module_id], Tag::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tags)
    }
}
