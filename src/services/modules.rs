//! Module catalog operations

use crate::db::Database;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{
    Capability, Module, ModuleDetail, ModuleVersion, NewModule, Review, VersionDetail, WorksStatus,
};
use crate::services::{is_blank, normalize_optional};

pub struct ModuleService {
    db: Database,
}

impl ModuleService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn list_all(&self) -> ServiceResult<Vec<Module>> {
        self.db
            .list_modules()
            .map_err(ServiceError::dax("listing modules"))
    }

    /// Case-insensitive substring search; a blank term yields no results
    /// instead of erroring.
    pub fn search_by_name(&self, term: &str) -> ServiceResult<Vec<Module>> {
        if is_blank(term) {
            return Ok(Vec::new());
        }

        self.db
            .search_modules(term.trim())
            .map_err(ServiceError::dax("searching modules"))
    }

    /// Full detail fetch: author, category, versions with their compatibility
    /// reports, reviews, and tags.
    pub fn get_by_id(&self, module_id: i64) -> ServiceResult<ModuleDetail> {
        let module = self.require_module(module_id)?;

        let versions = self
            .db
            .get_versions_for_module(module_id)
            .map_err(ServiceError::dax("loading module versions"))?;

        let mut version_details = Vec::with_capacity(versions.len());
        for version in versions {
            let reports = self
                .db
                .get_reports_for_version(version.id)
                .map_err(ServiceError::dax("loading compatibility reports"))?;
            version_details.push(VersionDetail { version, reports });
        }

        let reviews = self
            .db
            .get_reviews_for_module(module_id)
            .map_err(ServiceError::dax("loading reviews"))?;
        let tags = self
            .db
            .get_tags_for_module(module_id)
            .map_err(ServiceError::dax("loading tags"))?;

        Ok(ModuleDetail {
            module,
            versions: version_details,
            reviews,
            tags,
        })
    }

    pub fn add_review(
        &self,
        module_id: i64,
        user_id: i64,
        rating: i32,
        comment: Option<&str>,
    ) -> ServiceResult<Review> {
        if !(1..=5).contains(&rating) {
            return Err(ServiceError::Validation(
                "rating must be between 1 and 5".into(),
            ));
        }

        self.require_module(module_id)?;
        self.require_user(user_id)?;

        self.db
            .create_review(module_id, user_id, rating, normalize_optional(comment).as_deref())
            .map_err(ServiceError::dax("saving review"))
    }

    pub fn add_compatibility_report(
        &self,
        version_id: i64,
        user_id: i64,
        device_model: &str,
        android_version: &str,
        works_status: &str,
        notes: Option<&str>,
    ) -> ServiceResult<crate::models::CompatibilityReport> {
        if is_blank(device_model) {
            return Err(ServiceError::Validation("device model is required".into()));
        }
        if is_blank(android_version) {
            return Err(ServiceError::Validation(
                "android version is required".into(),
            ));
        }
        let status = WorksStatus::parse(works_status).ok_or_else(|| {
            ServiceError::Validation(format!(
                "works status must be one of Works, WorksWithIssues, DoesNotWork (got '{}')",
                works_status
            ))
        })?;

        if self
            .db
            .get_version_by_id(version_id)
            .map_err(ServiceError::dax("looking up module version"))?
            .is_none()
        {
            return Err(ServiceError::NotFound(format!(
                "module version {} not found",
                version_id
            )));
        }
        self.require_user(user_id)?;

        self.db
            .create_compatibility_report(
                version_id,
                user_id,
                device_model.trim(),
                android_version.trim(),
                status,
                normalize_optional(notes).as_deref(),
            )
            .map_err(ServiceError::dax("saving compatibility report"))
    }

    /// Publish a new module with its first version. The two rows are written
    /// in one transaction so a failure leaves no partial state.
    pub fn upload_new_module(&self, new: NewModule) -> ServiceResult<Module> {
        if is_blank(&new.name) {
            return Err(ServiceError::Validation("module name is required".into()));
        }
        if is_blank(&new.description) {
            return Err(ServiceError::Validation(
                "module description is required".into(),
            ));
        }
        if is_blank(&new.version) {
            return Err(ServiceError::Validation(
                "initial version string is required".into(),
            ));
        }
        if is_blank(&new.download_link) {
            return Err(ServiceError::Validation(
                "download link for the initial version is required".into(),
            ));
        }
        if is_blank(&new.min_platform_version) {
            return Err(ServiceError::Validation(
                "minimum platform version is required".into(),
            ));
        }

        let author = self
            .db
            .get_user_by_id(new.author_id)
            .map_err(ServiceError::dax("looking up author"))?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("author user {} not found", new.author_id))
            })?;

        if !author.role.can(Capability::PublishModules) {
            return Err(ServiceError::Permission(
                "only users with the Developer role can upload modules".into(),
            ));
        }

        if self
            .db
            .get_category_by_id(new.category_id)
            .map_err(ServiceError::dax("looking up category"))?
            .is_none()
        {
            return Err(ServiceError::NotFound(format!(
                "category {} not found",
                new.category_id
            )));
        }

        if self
            .db
            .get_module_by_name(&new.name)
            .map_err(ServiceError::dax("checking module name"))?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "a module named '{}' already exists",
                new.name.trim()
            )));
        }

        let new = NewModule {
            name: new.name.trim().to_string(),
            description: new.description.trim().to_string(),
            changelog: normalize_optional(new.changelog.as_deref()),
            min_platform_version: new.min_platform_version.trim().to_string(),
            ..new
        };

        let (module, _first_version) = self
            .db
            .create_module_with_version(&new)
            .map_err(ServiceError::dax("creating module"))?;

        Ok(module)
    }

    /// Append a release to a module the caller authored. Refreshes the
    /// module's updated_at stamp.
    pub fn add_version_to_module(
        &self,
        module_id: i64,
        author_id: i64,
        version: &str,
        download_link: &str,
        changelog: Option<&str>,
        min_platform_version: &str,
        file_size_mb: Option<f64>,
    ) -> ServiceResult<ModuleVersion> {
        if is_blank(version) {
            return Err(ServiceError::Validation("version string is required".into()));
        }
        if is_blank(download_link) {
            return Err(ServiceError::Validation("download link is required".into()));
        }
        if is_blank(min_platform_version) {
            return Err(ServiceError::Validation(
                "minimum platform version is required".into(),
            ));
        }

        let module = self.require_module(module_id)?;

        if module.author_id != author_id {
            return Err(ServiceError::Permission(
                "only the module's author can add versions to it".into(),
            ));
        }

        self.db
            .add_module_version(
                module_id,
                version.trim(),
                download_link.trim(),
                normalize_optional(changelog).as_deref(),
                min_platform_version.trim(),
                file_size_mb,
            )
            .map_err(ServiceError::dax("adding module version"))
    }

    /// Modules by a given author, with category attached.
    pub fn list_by_author(&self, author_id: i64) -> ServiceResult<Vec<Module>> {
        self.require_user(author_id)?;

        self.db
            .list_modules_by_author(author_id)
            .map_err(ServiceError::dax("listing modules by author"))
    }

    fn require_module(&self, module_id: i64) -> ServiceResult<Module> {
        self.db
            .get_module_by_id(module_id)
            .map_err(ServiceError::dax("looking up module"))?
            .ok_or_else(|| ServiceError::NotFound(format!("module {} not found", module_id)))
    }

    fn require_user(&self, user_id: i64) -> ServiceResult<()> {
        self.db
            .get_user_by_id(user_id)
            .map_err(ServiceError::dax("looking up user"))?
            .ok_or_else(|| ServiceError::NotFound(format!("user {} not found", user_id)))?;
        Ok(())
    }
}
