//! Database schema and initialization

use rusqlite::Connection;

/// Initialize database schema
pub fn init_schema(conn: &Connection) -> anyhow::Result<()> {
    conn.execute_batch(
        r#"
        -- Roles table, seeded below with the three fixed rows
        CREATE TABLE IF NOT EXISTS roles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE COLLATE NOCASE NOT NULL
        );

        -- Users table
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT UNIQUE COLLATE NOCASE NOT NULL,
            email TEXT UNIQUE COLLATE NOCASE NOT NULL,
            password_hash TEXT NOT NULL,
            role_id INTEGER NOT NULL,
            registered_at TEXT NOT NULL,
            FOREIGN KEY (role_id) REFERENCES roles(id)
        );

        -- Module categories
        CREATE TABLE IF NOT EXISTS module_categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE COLLATE NOCASE NOT NULL,
            description TEXT
        );

        -- Modules. Deleting an author is restricted while they own modules;
        -- deleting a category is restricted while modules reference it.
        CREATE TABLE IF NOT EXISTS modules (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE COLLATE NOCASE NOT NULL,
            description TEXT NOT NULL,
            author_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            is_verified INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE RESTRICT,
            FOREIGN KEY (category_id) REFERENCES module_categories(id) ON DELETE RESTRICT
        );

        -- Module versions, immutable once created
        CREATE TABLE IF NOT EXISTS module_versions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            module_id INTEGER NOT NULL,
            version TEXT NOT NULL CHECK(length(version) > 0),
            changelog TEXT,
            download_link TEXT NOT NULL CHECK(length(download_link) > 0),
            min_platform_version TEXT,
            file_size_mb REAL,
            uploaded_at TEXT NOT NULL,
            FOREIGN KEY (module_id) REFERENCES modules(id) ON DELETE CASCADE
        );

        -- Reviews. A user may review the same module more than once.
        CREATE TABLE IF NOT EXISTS reviews (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            module_id INTEGER NOT NULL,
            user_id INTEGER NOT NULL,
            rating INTEGER NOT NULL CHECK(rating >= 1 AND rating <= 5),
            comment TEXT,
            created_at TEXT NOT NULL,
            is_edited INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (module_id) REFERENCES modules(id) ON DELETE CASCADE,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        );

        -- Device compatibility reports
        CREATE TABLE IF NOT EXISTS compatibility_reports (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            version_id INTEGER NOT NULL,
            user_id INTEGER NOT NULL,
            device_model TEXT NOT NULL,
            android_version TEXT NOT NULL,
            works_status TEXT NOT NULL
                CHECK(works_status IN ('Works', 'WorksWithIssues', 'DoesNotWork')),
            notes TEXT,
            reported_at TEXT NOT NULL,
            FOREIGN KEY (version_id) REFERENCES module_versions(id) ON DELETE CASCADE,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        );

        -- Tags
        CREATE TABLE IF NOT EXISTS tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE COLLATE NOCASE NOT NULL
        );

        -- Module <-> Tag associations. Tag deletion is restricted while in use.
        CREATE TABLE IF NOT EXISTS module_tags (
            module_id INTEGER NOT NULL,
            tag_id INTEGER NOT NULL,
            PRIMARY KEY (module_id, tag_id),
            FOREIGN KEY (module_id) REFERENCES modules(id) ON DELETE CASCADE,
            FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE RESTRICT
        );

        -- Indexes
        CREATE INDEX IF NOT EXISTS idx_modules_author ON modules(author_id);
        CREATE INDEX IF NOT EXISTS idx_modules_category ON modules(category_id);
        CREATE INDEX IF NOT EXISTS idx_modules_verified ON modules(is_verified);
        CREATE INDEX IF NOT EXISTS idx_versions_module ON module_versions(module_id);
        CREATE INDEX IF NOT EXISTS idx_reviews_module ON reviews(module_id);
        CREATE INDEX IF NOT EXISTS idx_reports_version ON compatibility_reports(version_id);
        CREATE INDEX IF NOT EXISTS idx_module_tags_tag ON module_tags(tag_id);

        -- Fixed role rows
        INSERT OR IGNORE INTO roles (name) VALUES ('EndUser'), ('Developer'), ('Moderator');
        "#,
    )?;

    Ok(())
}
