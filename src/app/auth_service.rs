//! Signup and login over the `users` table.

use crate::app::error::ServiceError;
use crate::auth::{jwt, password};
use sqlx::{PgPool, Row};

pub struct AuthService {
    pool: PgPool,
    jwt_secret: String,
    token_ttl_secs: u64,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt_secret: String, token_ttl_secs: u64) -> Self {
        Self {
            pool,
            jwt_secret,
            token_ttl_secs,
        }
    }

    /// Registers a user and returns the new user id.
    pub async fn signup(&self, username: &str, pass: &str) -> Result<i64, ServiceError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ServiceError::Validation(
                "username is required".to_string(),
            ));
        }
        password::validate_password(pass)?;

        let password_hash = password::hash_password(pass).await?;

        let row = sqlx::query(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2) RETURNING id",
        )
        .bind(username)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ServiceError::Validation(format!("username '{}' is already taken", username))
            }
            _ => ServiceError::Persistence(e.to_string()),
        })?;

        Ok(row.try_get("id")?)
    }

    /// Verifies credentials and issues an access token.
    pub async fn login(&self, username: &str, pass: &str) -> Result<String, ServiceError> {
        let row = sqlx::query("SELECT id, password_hash FROM users WHERE username = $1")
            .bind(username.trim())
            .fetch_optional(&self.pool)
            .await?;

        let row = row.ok_or_else(|| ServiceError::Auth("invalid credentials".to_string()))?;
        let user_id: i64 = row.try_get("id")?;
        let password_hash: String = row.try_get("password_hash")?;

        if !password::verify_password(pass, &password_hash).await? {
            return Err(ServiceError::Auth("invalid credentials".to_string()));
        }

        jwt::issue(user_id, &self.jwt_secret, self.token_ttl_secs)
            .map_err(|e| ServiceError::Persistence(format!("failed issuing token: {}", e)))
    }
}
