/// Account manager implementation using runtime queries
use crate::{
    account::User,
    auth,
    config::ServerConfig,
    error::{ApiError, ApiResult},
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use validator::ValidateEmail;

/// Account manager service
pub struct AccountManager {
    db: SqlitePool,
    config: Arc<ServerConfig>,
}

impl AccountManager {
    /// Create a new account manager
    pub fn new(db: SqlitePool, config: Arc<ServerConfig>) -> Self {
        Self { db, config }
    }

    /// Register a new user
    ///
    /// The password is hashed before storage; registration never returns a
    /// token, a separate login is required.
    pub async fn register(&self, username: &str, password: &str, email: &str) -> ApiResult<User> {
        if username.is_empty() || password.is_empty() || email.is_empty() {
            return Err(ApiError::Validation(
                "Username, password, and email are required".to_string(),
            ));
        }

        if !email.validate_email() {
            return Err(ApiError::Validation("Invalid email format".to_string()));
        }

        let taken: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM user WHERE username = ?1 OR email = ?2")
                .bind(username)
                .bind(email)
                .fetch_one(&self.db)
                .await
                .map_err(ApiError::Database)?;

        if taken > 0 {
            return Err(ApiError::Conflict(
                "Username or email already in use".to_string(),
            ));
        }

        let password_hash = hash_password(password)?;
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO user (username, email, password_hash, role, active, created_at)
             VALUES (?1, ?2, ?3, 'User', TRUE, ?4)",
        )
        .bind(username)
        .bind(email)
        .bind(&password_hash)
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        tracing::info!("Registered user {}", username);

        Ok(User {
            id: result.last_insert_rowid(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            role: "User".to_string(),
            active: true,
            created_at: now,
        })
    }

    /// Verify credentials and issue a signed access token
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<String> {
        if username.is_empty() || password.is_empty() {
            return Err(ApiError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        let user = self.get_user_by_username(username).await?;

        if !verify_password(password, &user.password_hash)? {
            return Err(ApiError::Authentication("Incorrect password".to_string()));
        }

        tracing::info!("User {} logged in", username);

        auth::issue_token(
            &self.config.authentication,
            user.id,
            &user.username,
            &user.role,
        )
    }

    /// Overwrite a user's password hash.
    ///
    /// No re-authentication of the old password is required; that is the
    /// documented behavior of this operation.
    pub async fn reset_password(&self, username: &str, new_password: &str) -> ApiResult<()> {
        if username.is_empty() || new_password.is_empty() {
            return Err(ApiError::Validation("All fields are required".to_string()));
        }

        let user = self.get_user_by_username(username).await?;
        let password_hash = hash_password(new_password)?;

        sqlx::query("UPDATE user SET password_hash = ?1 WHERE id = ?2")
            .bind(&password_hash)
            .bind(user.id)
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;

        tracing::info!("Password reset for user {}", username);

        Ok(())
    }

    /// Get a user by username
    pub async fn get_user_by_username(&self, username: &str) -> ApiResult<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, role, active, created_at
             FROM user WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await
        .map_err(ApiError::Database)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    /// Get a user by id
    pub async fn get_user(&self, id: i64) -> ApiResult<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, role, active, created_at
             FROM user WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(ApiError::Database)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }
}

/// Hash a password with Argon2id and a random salt
fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against a stored hash
fn verify_password(password: &str, hash: &str) -> ApiResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| ApiError::Internal(format!("Invalid password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
