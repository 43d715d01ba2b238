//! Registration and login

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;

use crate::db::Database;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{NewUser, Role, User};
use crate::services::is_blank;

const DEFAULT_ROLE: &str = "EndUser";

pub struct UserService {
    db: Database,
}

impl UserService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Register a new user. The requested role is resolved by name; when it is
    /// unknown, registration falls back to a seeded role rather than failing.
    pub fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role_name: Option<&str>,
    ) -> ServiceResult<User> {
        if is_blank(username) || is_blank(email) || is_blank(password) {
            return Err(ServiceError::Validation(
                "username, email, and password must not be empty".into(),
            ));
        }

        let username = username.trim();
        let email = email.trim();

        if self
            .db
            .get_user_by_username(username)
            .map_err(ServiceError::dax("looking up username"))?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "username '{}' is already taken",
                username
            )));
        }

        if self
            .db
            .get_user_by_email(email)
            .map_err(ServiceError::dax("looking up email"))?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "email '{}' is already registered",
                email
            )));
        }

        let requested = role_name.unwrap_or(DEFAULT_ROLE);
        let (role_id, _) = self.resolve_role(requested)?;

        let new_user = NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password)?,
            role_id,
        };

        self.db
            .create_user(&new_user)
            .map_err(ServiceError::dax("creating user"))
    }

    /// Authenticate by username and password. Unknown user and wrong password
    /// produce the same error, so callers cannot enumerate accounts.
    pub fn login(&self, username: &str, password: &str) -> ServiceResult<User> {
        if is_blank(username) || is_blank(password) {
            return Err(ServiceError::Validation(
                "username and password must not be empty".into(),
            ));
        }

        let invalid = || ServiceError::NotFound("invalid username or password".into());

        let (user_id, stored_hash) = self
            .db
            .get_password_hash(username.trim())
            .map_err(ServiceError::dax("looking up credentials"))?
            .ok_or_else(invalid)?;

        let parsed = PasswordHash::new(&stored_hash)
            .map_err(|e| ServiceError::BusinessRule(format!("stored password hash is invalid: {}", e)))?;
        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_err()
        {
            return Err(invalid());
        }

        self.db
            .get_user_by_id(user_id)
            .map_err(ServiceError::dax("loading user"))?
            .ok_or_else(invalid)
    }

    /// Resolve a role name to its seeded row, falling back to EndUser and then
    /// to any seeded role when the requested one is absent.
    fn resolve_role(&self, requested: &str) -> ServiceResult<(i64, Role)> {
        if let Some(found) = self
            .db
            .get_role_by_name(requested)
            .map_err(ServiceError::dax("resolving role"))?
        {
            return Ok(found);
        }

        tracing::warn!(
            "requested role '{}' is not configured, falling back",
            requested
        );

        if let Some(found) = self
            .db
            .get_role_by_name(DEFAULT_ROLE)
            .map_err(ServiceError::dax("resolving fallback role"))?
        {
            return Ok(found);
        }

        self.db
            .list_roles()
            .map_err(ServiceError::dax("listing roles"))?
            .into_iter()
            .next()
            .ok_or_else(|| {
                ServiceError::BusinessRule(
                    "no roles are configured; registration is impossible".into(),
                )
            })
    }
}

fn hash_password(password: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::BusinessRule(format!("password hashing failed: {}", e)))
}
