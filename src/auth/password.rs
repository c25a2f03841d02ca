//! Password hashing and verification.
//!
//! bcrypt runs on the blocking thread pool so it never stalls the async
//! runtime.

use crate::app::error::ServiceError;
use bcrypt::{hash, verify, DEFAULT_COST};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length (bcrypt has a 72-byte limit).
pub const MAX_PASSWORD_LENGTH: usize = 72;

pub fn validate_password(pass: &str) -> Result<(), ServiceError> {
    if pass.len() < MIN_PASSWORD_LENGTH {
        return Err(ServiceError::Validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    if pass.len() > MAX_PASSWORD_LENGTH {
        return Err(ServiceError::Validation(format!(
            "password must be at most {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

pub async fn hash_password(pass: &str) -> Result<String, ServiceError> {
    let pass = pass.to_string();
    tokio::task::spawn_blocking(move || {
        hash(pass, DEFAULT_COST).map_err(|e| ServiceError::Persistence(e.to_string()))
    })
    .await
    .map_err(|e| ServiceError::Persistence(format!("task join error: {}", e)))?
}

pub async fn verify_password(pass: &str, hashed: &str) -> Result<bool, ServiceError> {
    let pass = pass.to_string();
    let hashed = hashed.to_string();
    tokio::task::spawn_blocking(move || {
        verify(pass, &hashed).map_err(|e| ServiceError::Persistence(e.to_string()))
    })
    .await
    .map_err(|e| ServiceError::Persistence(format!("task join error: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        let hashed = hash_password("correct horse battery").await.unwrap();
        assert!(verify_password("correct horse battery", &hashed)
            .await
            .unwrap());
        assert!(!verify_password("wrong password", &hashed).await.unwrap());
    }

    #[test]
    fn length_bounds() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough").is_ok());
        assert!(validate_password(&"x".repeat(73)).is_err());
        assert!(validate_password(&"x".repeat(72)).is_ok());
    }
}
