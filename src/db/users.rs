//! User and role repository

use rusqlite::params;

use crate::db::{now, Database};
use crate::error::RepoResult;
use crate::models::{NewUser, Role, User};

const USER_SELECT: &str = r#"
    SELECT u.id, u.username, u.email, u.registered_at, r.name AS role_name
    FROM users u
    JOIN roles r ON u.role_id = r.id
"#;

impl Database {
    /// Insert a new user; the password is already hashed by the service.
    pub fn create_user(&self, new_user: &NewUser) -> RepoResult<User> {
        let conn = self.conn();

        conn.execute(
            r#"
            INSERT INTO users (username, email, password_hash, role_id, registered_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                new_user.username,
                new_user.email,
                new_user.password_hash,
                new_user.role_id,
                now(),
            ],
        )?;

        let user_id = conn.last_insert_rowid();
        let user = conn.query_row(
            &format!("{USER_SELECT} WHERE u.id = ?1"),
            params![user_id],
            User::from_row,
        )?;

        Ok(user)
    }

    /// Get user by ID
    pub fn get_user_by_id(&self, id: i64) -> RepoResult<Option<User>> {
        let conn = self.conn();

        let result = conn.query_row(
            &format!("{USER_SELECT} WHERE u.id = ?1"),
            params![id],
            User::from_row,
        );

        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get user by username (case-insensitive via column collation)
    pub fn get_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let conn = self.conn();

        let result = conn.query_row(
            &format!("{USER_SELECT} WHERE u.username = ?1"),
            params![username],
            User::from_row,
        );

        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get user by email
    pub fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let conn = self.conn();

        let result = conn.query_row(
            &format!("{USER_SELECT} WHERE u.email = ?1"),
            params![email],
            User::from_row,
        );

        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Stored password hash for a username, if the user exists.
    pub fn get_password_hash(&self, username: &str) -> RepoResult<Option<(i64, String)>> {
        let conn = self.conn();

        let result = conn.query_row(
            "SELECT id, password_hash FROM users WHERE username = ?1",
            params![username],
            |row| Ok((row.get(0)?, row.get(1)?)),
        );

        match result {
            Ok(pair) => Ok(Some(pair)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve a role row by name (case-insensitive)
    pub fn get_role_by_name(&self, name: &str) -> RepoResult<Option<(i64, Role)>> {
        let conn = self.conn();

        let result = conn.query_row(
            "SELECT id, name FROM roles WHERE name = ?1",
            params![name],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
        );

        match result {
            Ok((id, name)) => Ok(Role::parse(&name).map(|role| (id, role))),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All seeded roles in id order.
    pub fn list_roles(&self) -> RepoResult<Vec<(i64, Role)>> {
        let conn = self.conn();

        let mut stmt = conn.prepare("SELECT id, name FROM roles ORDER BY id")?;
        let roles = stmt
            .query_map([], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(roles
            .into_iter()
            .filter_map(|(id, name)| Role::parse(&name).map(|role| (id, role)))
            .collect())
    }
}
