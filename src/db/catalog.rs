//! Category, tag, and module-tag repository

use rusqlite::params;

use crate::db::Database;
use crate::error::RepoResult;
use crate::models::{Category, Tag};

impl Database {
    // =========================================================================
    // Categories
    // =========================================================================

    pub fn create_category(&self, name: &str, description: Option<&str>) -> RepoResult<Category> {
        let conn = self.conn();

        conn.execute(
            "INSERT INTO module_categories (name, description) VALUES (?1, ?2)",
            params![name, description],
        )?;

        Ok(Category {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            description: description.map(str::to_string),
        })
    }

    pub fn get_category_by_id(&self, id: i64) -> RepoResult<Option<Category>> {
        let conn = self.conn();

        let result = conn.query_row(
            "SELECT id, name, description FROM module_categories WHERE id = ?1",
            params![id],
            Category::from_row,
        );

        match result {
            Ok(category) => Ok(Some(category)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get category by name (case-insensitive)
    pub fn get_category_by_name(&self, name: &str) -> RepoResult<Option<Category>> {
        let conn = self.conn();

        let result = conn.query_row(
            "SELECT id, name, description FROM module_categories WHERE name = ?1",
            params![name],
            Category::from_row,
        );

        match result {
            Ok(category) => Ok(Some(category)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_categories(&self) -> RepoResult<Vec<Category>> {
        let conn = self.conn();

        let mut stmt =
            conn.prepare("SELECT id, name, description FROM module_categories ORDER BY name")?;
        let categories = stmt
            .query_map([], Category::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    pub fn update_category(&self, category: &Category) -> RepoResult<()> {
        let conn = self.conn();

        conn.execute(
            "UPDATE module_categories SET name = ?1, description = ?2 WHERE id = ?3",
            params![category.name, category.description, category.id],
        )?;

        Ok(())
    }

    /// Hard delete; returns false when the row was already gone.
    pub fn delete_category(&self, id: i64) -> RepoResult<bool> {
        let conn = self.conn();

        let rows = conn.execute("DELETE FROM module_categories WHERE id = ?1", params![id])?;

        Ok(rows > 0)
    }

    /// Whether any module references the category.
    pub fn category_in_use(&self, id: i64) -> RepoResult<bool> {
        let conn = self.conn();

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM modules WHERE category_id = ?1",
            params![id],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    // =========================================================================
    // Tags
    // =========================================================================

    pub fn create_tag(&self, name: &str) -> RepoResult<Tag> {
        let conn = self.conn();

        conn.execute("INSERT INTO tags (name) VALUES (?1)", params![name])?;

        Ok(Tag {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    pub fn get_tag_by_id(&self, id: i64) -> RepoResult<Option<Tag>> {
        let conn = self.conn();

        let result = conn.query_row(
            "SELECT id, name FROM tags WHERE id = ?1",
            params![id],
            Tag::from_row,
        );

        match result {
            Ok(tag) => Ok(Some(tag)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get tag by name (case-insensitive)
    pub fn get_tag_by_name(&self, name: &str) -> RepoResult<Option<Tag>> {
        let conn = self.conn();

        let result = conn.query_row(
            "SELECT id, name FROM tags WHERE name = ?1",
            params![name],
            Tag::from_row,
        );

        match result {
            Ok(tag) => Ok(Some(tag)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_tags(&self) -> RepoResult<Vec<Tag>> {
        let conn = self.conn();

        let mut stmt = conn.prepare("SELECT id, name FROM tags ORDER BY name")?;
        let tags = stmt
            .query_map([], Tag::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tags)
    }

    pub fn update_tag(&self, tag: &Tag) -> RepoResult<()> {
        let conn = self.conn();

        conn.execute(
            "UPDATE tags SET name = ?1 WHERE id = ?2",
            params![tag.name, tag.id],
        )?;

        Ok(())
    }

    /// Hard delete; returns false when the row was already gone.
    pub fn delete_tag(&self, id: i64) -> RepoResult<bool> {
        let conn = self.conn();

        let rows = conn.execute("DELETE FROM tags WHERE id = ?1", params![id])?;

        Ok(rows > 0)
    }

    /// Whether any module_tags row references the tag.
    pub fn tag_in_use(&self, id: i64) -> RepoResult<bool> {
        let conn = self.conn();

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM module_tags WHERE tag_id = ?1",
            params![id],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    // =========================================================================
    // Module-tag associations
    // =========================================================================

    /// Ids of tags currently assigned to a module.
    pub fn get_tag_ids_for_module(&self, module_id: i64) -> RepoResult<Vec<i64>> {
        let conn = self.conn();

        let mut stmt =
            conn.prepare("SELECT tag_id FROM module_tags WHERE module_id = ?1 ORDER BY tag_id")?;
        let ids = stmt
            .query_map(params![module_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ids)
    }

    /// Reconcile the module's tag set in one transaction.
    pub fn replace_module_tags(
        &self,
        module_id: i64,
        to_add: &[i64],
        to_remove: &[i64],
    ) -> RepoResult<()> {
        let mut conn = self.conn();

        let tx = conn.transaction()?;

        for tag_id in to_remove {
            tx.execute(
                "DELETE FROM module_tags WHERE module_id = ?1 AND tag_id = ?2",
                params![module_id, tag_id],
            )?;
        }

        for tag_id in to_add {
            tx.execute(
                "INSERT OR IGNORE INTO module_tags (module_id, tag_id) VALUES (?1, ?2)",
                params![module_id, tag_id],
            )?;
        }

        tx.commit()?;

        Ok(())
    }
}
