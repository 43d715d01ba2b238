//! Review and compatibility report repository

use rusqlite::params;

use crate::db::{now, Database};
use crate::error::RepoResult;
use crate::models::{CompatibilityReport, Review, WorksStatus};

impl Database {
    /// Append a review with the current timestamp.
    pub fn create_review(
        &self,
        module_id: i64,
        user_id: i64,
        rating: i32,
        comment: Option<&str>,
    ) -> RepoResult<Review> {
        let conn = self.conn();

        conn.execute(
            r#"
            INSERT INTO reviews (module_id, user_id, rating, comment, created_at, is_edited)
            VALUES (?1, ?2, ?3, ?4, ?5, 0)
            "#,
            params![module_id, user_id, rating, comment, now()],
        )?;

        let review_id = conn.last_insert_rowid();
        let review = conn.query_row(
            r#"
            SELECT r.id, r.module_id, r.user_id, r.rating, r.comment,
                   r.created_at, r.is_edited, u.username
            FROM reviews r
            JOIN users u ON r.user_id = u.id
            WHERE r.id = ?1
            "#,
            params![review_id],
            Review::from_row,
        )?;

        Ok(review)
    }

    /// Reviews for a module, newest first
    pub fn get_reviews_for_module(&self, module_id: i64) -> RepoResult<Vec<Review>> {
        let conn = self.conn();

        let mut stmt = conn.prepare(
            r#"
            SELECT r.id, r.module_id, r.user_id, r.rating, r.comment,
                   r.created_at, r.is_edited, u.username
            FROM reviews r
            JOIN users u ON r.user_id = u.id
            WHERE r.module_id = ?1
            ORDER BY r.created_at DESC, r.id DESC
            "#,
        )?;
        let reviews = stmt
            .query_map(params![module_id], Review::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(reviews)
    }

    /// File a compatibility report against a module version.
    pub fn create_compatibility_report(
        &self,
        version_id: i64,
        user_id: i64,
        device_model: &str,
        android_version: &str,
        works_status: WorksStatus,
        notes: Option<&str>,
    ) -> RepoResult<CompatibilityReport> {
        let conn = self.conn();

        conn.execute(
            r#"
            INSERT INTO compatibility_reports
                (version_id, user_id, device_model, android_version,
                 works_status, notes, reported_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                version_id,
                user_id,
                device_model,
                android_version,
                works_status.as_str(),
                notes,
                now(),
            ],
        )?;

        let report_id = conn.last_insert_rowid();
        let report = conn.query_row(
            r#"
            SELECT cr.id, cr.version_id, cr.user_id, cr.device_model,
                   cr.android_version, cr.works_status, cr.notes, cr.reported_at,
                   u.username
            FROM compatibility_reports cr
            JOIN users u ON cr.user_id = u.id
            WHERE cr.id = ?1
            "#,
            params![report_id],
            CompatibilityReport::from_row,
        )?;

        Ok(report)
    }

    /// Compatibility reports filed against a version, newest first
    pub fn get_reports_for_version(
        &self,
        version_id: i64,
    ) -> RepoResult<Vec<CompatibilityReport>> {
        let conn = self.conn();

        let mut stmt = conn.prepare(
            r#"
            SELECT cr.id, cr.version_id, cr.user_id, cr.device_model,
                   cr.android_version, cr.works_status, cr.notes, cr.reported_at,
                   u.username
            FROM compatibility_reports cr
            JOIN users u ON cr.user_id = u.id
            WHERE cr.version_id = ?1
            ORDER BY cr.reported_at DESC, cr.id DESC
            "#,
        )?;
        let reports = stmt
            .query_map(params![version_id], CompatibilityReport::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(reports)
    }
}
