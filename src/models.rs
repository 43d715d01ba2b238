//! Data models for ModHub

use rusqlite::Row;
use serde::{Deserialize, Serialize};

// ============================================================================
// Roles and capabilities
// ============================================================================

/// The three fixed roles seeded at schema initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    EndUser,
    Developer,
    Moderator,
}

/// Actions gated by role. Checked in one place instead of comparing
/// role names at every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    PublishModules,
    CurateCatalog,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EndUser => "EndUser",
            Self::Developer => "Developer",
            Self::Moderator => "Moderator",
        }
    }

    /// Case-insensitive parse of a stored or requested role name.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "enduser" => Some(Self::EndUser),
            "developer" => Some(Self::Developer),
            "moderator" => Some(Self::Moderator),
            _ => None,
        }
    }

    pub fn can(&self, capability: Capability) -> bool {
        match capability {
            Capability::PublishModules => matches!(self, Self::Developer),
            Capability::CurateCatalog => matches!(self, Self::Moderator),
        }
    }
}

// ============================================================================
// User models
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub registered_at: String,
}

impl User {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let role_name: String = row.get("role_name")?;
        Ok(Self {
            id: row.get("id")?,
            username: row.get("username")?,
            email: row.get("email")?,
            role: Role::parse(&role_name).unwrap_or(Role::EndUser),
            registered_at: row.get("registered_at")?,
        })
    }
}

#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: i64,
}

// ============================================================================
// Catalog models
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

impl Category {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

impl Tag {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
        })
    }
}

// ============================================================================
// Module models
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Module {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub author_id: i64,
    pub author_username: String,
    pub category_id: i64,
    pub category_name: String,
    pub is_verified: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Module {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            author_id: row.get("author_id")?,
            author_username: row.get("author_username")?,
            category_id: row.get("category_id")?,
            category_name: row.get("category_name")?,
            is_verified: row.get::<_, i64>("is_verified")? != 0,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Input for creating a module together with its first version.
#[derive(Debug)]
pub struct NewModule {
    pub author_id: i64,
    pub name: String,
    pub description: String,
    pub category_id: i64,
    pub version: String,
    pub download_link: String,
    pub changelog: Option<String>,
    pub min_platform_version: String,
    pub file_size_mb: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleVersion {
    pub id: i64,
    pub module_id: i64,
    pub version: String,
    pub changelog: Option<String>,
    pub download_link: String,
    pub min_platform_version: Option<String>,
    pub file_size_mb: Option<f64>,
    pub uploaded_at: String,
}

impl ModuleVersion {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            module_id: row.get("module_id")?,
            version: row.get("version")?,
            changelog: row.get("changelog")?,
            download_link: row.get("download_link")?,
            min_platform_version: row.get("min_platform_version")?,
            file_size_mb: row.get("file_size_mb")?,
            uploaded_at: row.get("uploaded_at")?,
        })
    }
}

/// Full detail fetch: the module plus everything it owns.
#[derive(Debug, Serialize)]
pub struct ModuleDetail {
    #[serde(flatten)]
    pub module: Module,
    pub versions: Vec<VersionDetail>,
    pub reviews: Vec<Review>,
    pub tags: Vec<Tag>,
}

/// A version with the compatibility reports filed against it.
#[derive(Debug, Serialize)]
pub struct VersionDetail {
    #[serde(flatten)]
    pub version: ModuleVersion,
    pub reports: Vec<CompatibilityReport>,
}

// ============================================================================
// Review and compatibility models
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: i64,
    pub module_id: i64,
    pub user_id: i64,
    pub username: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: String,
    pub is_edited: bool,
}

impl Review {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            module_id: row.get("module_id")?,
            user_id: row.get("user_id")?,
            username: row.get("username")?,
            rating: row.get("rating")?,
            comment: row.get("comment")?,
            created_at: row.get("created_at")?,
            is_edited: row.get::<_, i64>("is_edited")? != 0,
        })
    }
}

/// Outcome of running a module version on a specific device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorksStatus {
    Works,
    WorksWithIssues,
    DoesNotWork,
}

impl WorksStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Works => "Works",
            Self::WorksWithIssues => "WorksWithIssues",
            Self::DoesNotWork => "DoesNotWork",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "works" => Some(Self::Works),
            "workswithissues" => Some(Self::WorksWithIssues),
            "doesnotwork" => Some(Self::DoesNotWork),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompatibilityReport {
    pub id: i64,
    pub version_id: i64,
    pub user_id: i64,
    pub username: String,
    pub device_model: String,
    pub android_version: String,
    pub works_status: WorksStatus,
    pub notes: Option<String>,
    pub reported_at: String,
}

impl CompatibilityReport {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let status: String = row.get("works_status")?;
        Ok(Self {
            id: row.get("id")?,
            version_id: row.get("version_id")?,
            user_id: row.get("user_id")?,
            username: row.get("username")?,
            device_model: row.get("device_model")?,
            android_version: row.get("android_version")?,
            works_status: WorksStatus::parse(&status).unwrap_or(WorksStatus::DoesNotWork),
            notes: row.get("notes")?,
            reported_at: row.get("reported_at")?,
        })
    }
}

// ============================================================================
// API request types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadModuleRequest {
    pub author_id: i64,
    pub name: String,
    pub description: String,
    pub category_id: i64,
    pub version: String,
    pub download_link: String,
    pub changelog: Option<String>,
    pub min_platform_version: String,
    pub file_size_mb: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct AddVersionRequest {
    pub author_id: i64,
    pub version: String,
    pub download_link: String,
    pub changelog: Option<String>,
    pub min_platform_version: String,
    pub file_size_mb: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct AddReviewRequest {
    pub user_id: i64,
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddReportRequest {
    pub user_id: i64,
    pub device_model: String,
    pub android_version: String,
    pub works_status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TagRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AssignTagsRequest {
    pub tag_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub verified: bool,
}
