//! Catalog curation: categories, tags, tag assignment, and verification

use std::collections::HashSet;

use crate::db::Database;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{Category, Module, Tag};
use crate::services::{is_blank, normalize_optional};

pub struct ModerationService {
    db: Database,
}

impl ModerationService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub fn list_categories(&self) -> ServiceResult<Vec<Category>> {
        self.db
            .list_categories()
            .map_err(ServiceError::dax("listing categories"))
    }

    pub fn add_category(&self, name: &str, description: Option<&str>) -> ServiceResult<Category> {
        if is_blank(name) {
            return Err(ServiceError::Validation(
                "category name must not be empty".into(),
            ));
        }
        let name = name.trim();

        if self
            .db
            .get_category_by_name(name)
            .map_err(ServiceError::dax("checking category name"))?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "a category named '{}' already exists",
                name
            )));
        }

        self.db
            .create_category(name, normalize_optional(description).as_deref())
            .map_err(ServiceError::dax("creating category"))
    }

    /// Rename and/or re-describe a category. A no-op when nothing changed.
    pub fn update_category(
        &self,
        category_id: i64,
        new_name: Option<&str>,
        new_description: Option<&str>,
    ) -> ServiceResult<Category> {
        let mut category = self
            .db
            .get_category_by_id(category_id)
            .map_err(ServiceError::dax("looking up category"))?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("category {} not found", category_id))
            })?;

        let mut changed = false;

        if let Some(name) = new_name.map(str::trim).filter(|n| !n.is_empty()) {
            if !category.name.eq_ignore_ascii_case(name) {
                if let Some(existing) = self
                    .db
                    .get_category_by_name(name)
                    .map_err(ServiceError::dax("checking category name"))?
                {
                    if existing.id != category_id {
                        return Err(ServiceError::Conflict(format!(
                            "a category named '{}' already exists",
                            name
                        )));
                    }
                }
                category.name = name.to_string();
                changed = true;
            } else if category.name != name {
                // Same name, different casing: still a rename.
                category.name = name.to_string();
                changed = true;
            }
        }

        let description = normalize_optional(new_description);
        if new_description.is_some() && category.description != description {
            category.description = description;
            changed = true;
        }

        if changed {
            self.db
                .update_category(&category)
                .map_err(ServiceError::dax("updating category"))?;
        }

        Ok(category)
    }

    /// Delete a category. Blocked while any module references it.
    pub fn delete_category(&self, category_id: i64) -> ServiceResult<()> {
        let category = self
            .db
            .get_category_by_id(category_id)
            .map_err(ServiceError::dax("looking up category"))?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("category {} not found", category_id))
            })?;

        if self
            .db
            .category_in_use(category_id)
            .map_err(ServiceError::dax("checking category usage"))?
        {
            return Err(ServiceError::BusinessRule(format!(
                "category '{}' is in use by one or more modules and cannot be deleted",
                category.name
            )));
        }

        let deleted = self
            .db
            .delete_category(category_id)
            .map_err(ServiceError::dax("deleting category"))?;
        if !deleted {
            return Err(ServiceError::NotFound(format!(
                "category {} not found",
                category_id
            )));
        }

        Ok(())
    }

    // =========================================================================
    // Tags
    // =========================================================================

    pub fn list_tags(&self) -> ServiceResult<Vec<Tag>> {
        self.db.list_tags().map_err(ServiceError::dax("listing tags"))
    }

    pub fn add_tag(&self, name: &str) -> ServiceResult<Tag> {
        if is_blank(name) {
            return Err(ServiceError::Validation("tag name must not be empty".into()));
        }
        let name = name.trim();

        if self
            .db
            .get_tag_by_name(name)
            .map_err(ServiceError::dax("checking tag name"))?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "a tag named '{}' already exists",
                name
            )));
        }

        self.db
            .create_tag(name)
            .map_err(ServiceError::dax("creating tag"))
    }

    /// Rename a tag. A no-op when the name is unchanged.
    pub fn update_tag(&self, tag_id: i64, new_name: &str) -> ServiceResult<Tag> {
        if is_blank(new_name) {
            return Err(ServiceError::Validation(
                "new tag name must not be empty".into(),
            ));
        }
        let new_name = new_name.trim();

        let mut tag = self
            .db
            .get_tag_by_id(tag_id)
            .map_err(ServiceError::dax("looking up tag"))?
            .ok_or_else(|| ServiceError::NotFound(format!("tag {} not found", tag_id)))?;

        if tag.name == new_name {
            return Ok(tag);
        }

        if let Some(existing) = self
            .db
            .get_tag_by_name(new_name)
            .map_err(ServiceError::dax("checking tag name"))?
        {
            if existing.id != tag_id {
                return Err(ServiceError::Conflict(format!(
                    "a tag named '{}' already exists",
                    new_name
                )));
            }
        }

        tag.name = new_name.to_string();
        self.db
            .update_tag(&tag)
            .map_err(ServiceError::dax("updating tag"))?;

        Ok(tag)
    }

    /// Delete a tag. Blocked while any module carries it.
    pub fn delete_tag(&self, tag_id: i64) -> ServiceResult<()> {
        let tag = self
            .db
            .get_tag_by_id(tag_id)
            .map_err(ServiceError::dax("looking up tag"))?
            .ok_or_else(|| ServiceError::NotFound(format!("tag {} not found", tag_id)))?;

        if self
            .db
            .tag_in_use(tag_id)
            .map_err(ServiceError::dax("checking tag usage"))?
        {
            return Err(ServiceError::BusinessRule(format!(
                "tag '{}' is assigned to one or more modules and cannot be deleted",
                tag.name
            )));
        }

        let deleted = self
            .db
            .delete_tag(tag_id)
            .map_err(ServiceError::dax("deleting tag"))?;
        if !deleted {
            return Err(ServiceError::NotFound(format!("tag {} not found", tag_id)));
        }

        Ok(())
    }

    /// Reconcile a module's tag set to exactly `tag_ids`: missing tags are
    /// added, extra ones removed.
    pub fn assign_tags_to_module(&self, module_id: i64, tag_ids: &[i64]) -> ServiceResult<()> {
        if self
            .db
            .get_module_by_id(module_id)
            .map_err(ServiceError::dax("looking up module"))?
            .is_none()
        {
            return Err(ServiceError::NotFound(format!(
                "module {} not found",
                module_id
            )));
        }

        let requested: HashSet<i64> = tag_ids.iter().copied().collect();
        for &tag_id in &requested {
            if self
                .db
                .get_tag_by_id(tag_id)
                .map_err(ServiceError::dax("looking up tag"))?
                .is_none()
            {
                return Err(ServiceError::NotFound(format!(
                    "tag {} not found and cannot be assigned",
                    tag_id
                )));
            }
        }

        let current: HashSet<i64> = self
            .db
            .get_tag_ids_for_module(module_id)
            .map_err(ServiceError::dax("loading module tags"))?
            .into_iter()
            .collect();

        let to_add: Vec<i64> = requested.difference(&current).copied().collect();
        let to_remove: Vec<i64> = current.difference(&requested).copied().collect();

        if to_add.is_empty() && to_remove.is_empty() {
            return Ok(());
        }

        self.db
            .replace_module_tags(module_id, &to_add, &to_remove)
            .map_err(ServiceError::dax("reconciling module tags"))
    }

    // =========================================================================
    // Verification
    // =========================================================================

    pub fn list_unverified(&self) -> ServiceResult<Vec<Module>> {
        self.db
            .list_unverified_modules()
            .map_err(ServiceError::dax("listing unverified modules"))
    }

    /// Set a module's verification flag. Idempotent: when the status already
    /// matches, the current state is returned and updated_at is not touched.
    pub fn verify(&self, module_id: i64, verified: bool) -> ServiceResult<Module> {
        let module = self
            .db
            .get_module_by_id(module_id)
            .map_err(ServiceError::dax("looking up module"))?
            .ok_or_else(|| ServiceError::NotFound(format!("module {} not found", module_id)))?;

        if module.is_verified == verified {
            return Ok(module);
        }

        self.db
            .set_module_verified(module_id, verified)
            .map_err(ServiceError::dax("updating verification status"))?;

        self.db
            .get_module_by_id(module_id)
            .map_err(ServiceError::dax("reloading module"))?
            .ok_or_else(|| ServiceError::NotFound(format!("module {} not found", module_id)))
    }
}
