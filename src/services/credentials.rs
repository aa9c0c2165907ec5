// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential store: registration, password verification and password changes.
//!
//! Passwords are hashed with Argon2id into PHC strings. Hashing runs on the
//! blocking pool so it never stalls the async workers.

use crate::config::Config;
use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::user::DEFAULT_BIO;
use crate::models::{NewUser, User};
use crate::services::random;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use std::sync::OnceLock;

/// Canonical form of an email address for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to hash password: {}", e)))
}

/// Check a password against a stored PHC string. Malformed hashes never match.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Hash compared against when the username is unknown, so both failure paths cost the same.
fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| hash_password("not-a-real-password").unwrap_or_default())
}

async fn hash_blocking(password: &str) -> Result<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("hashing task failed: {}", e)))?
}

async fn verify_blocking(password: &str, stored_hash: String) -> Result<bool> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("verification task failed: {}", e)))
}

/// Persists user identities and their password hashes.
#[derive(Clone)]
pub struct CredentialStore {
    db: Database,
    config: Config,
}

impl CredentialStore {
    pub fn new(db: Database, config: &Config) -> Self {
        Self {
            db,
            config: config.clone(),
        }
    }

    /// Create a user. Fails with `DuplicateIdentity` if the username or email
    /// is already registered, in which case nothing is written.
    pub async fn register(&self, candidate: NewUser, password: &str) -> Result<User> {
        let username = candidate.username.trim().to_string();
        let email = normalize_email(&candidate.email);
        if username.is_empty() || email.is_empty() {
            return Err(AppError::Validation(
                "Username and email are required.".to_string(),
            ));
        }
        if password.is_empty() {
            return Err(AppError::Validation("Password is required.".to_string()));
        }

        let is_admin = self.config.is_admin_email(&email);
        let user = User {
            id: random::document_id()?,
            username,
            email,
            password_hash: hash_blocking(password).await?,
            avatar: candidate.avatar.filter(|a| !a.trim().is_empty()),
            bio: candidate
                .bio
                .filter(|b| !b.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BIO.to_string()),
            is_admin,
            reset_password_token: None,
            reset_password_expires: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        self.db.create_user(&user).await?;

        tracing::info!(
            user_id = %user.id,
            username = %user.username,
            is_admin,
            "User registered"
        );
        Ok(user)
    }

    /// Check a username/password pair. Both an unknown username and a wrong
    /// password fail with the same `InvalidCredential`.
    pub async fn verify(&self, username: &str, password: &str) -> Result<User> {
        let user = self.db.find_user_by_username(username.trim()).await?;

        let stored_hash = user
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| dummy_hash().to_string());
        let matches = verify_blocking(password, stored_hash).await?;

        match user {
            Some(user) if matches => Ok(user),
            _ => {
                tracing::info!(username = %username.trim(), "Credential check failed");
                Err(AppError::InvalidCredential)
            }
        }
    }

    /// Replace a user's password hash and persist the whole record.
    ///
    /// Any other pending changes on `user` (such as a cleared reset token) are
    /// written in the same update.
    pub async fn set_password(&self, mut user: User, new_password: &str) -> Result<User> {
        if new_password.is_empty() {
            return Err(AppError::Validation("Password is required.".to_string()));
        }
        user.password_hash = hash_blocking(new_password).await?;
        self.db.update_user(&user).await?;
        tracing::info!(user_id = %user.id, "Password changed");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDb;

    fn store() -> CredentialStore {
        CredentialStore::new(
            Database::Memory(MemoryDb::new()),
            &Config::test_default(),
        )
    }

    fn candidate(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            avatar: None,
            bio: None,
        }
    }

    #[test]
    fn test_hash_is_salted() {
        let a = hash_password("hunter2").unwrap();
        let b = hash_password("hunter2").unwrap();
        assert_ne!(a, b);
        assert_ne!(a, "hunter2");
        assert!(verify_password("hunter2", &a));
        assert!(verify_password("hunter2", &b));
        assert!(!verify_password("hunter3", &a));
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[tokio::test]
    async fn test_register_then_verify() {
        let store = store();
        let user = store
            .register(candidate("alice", " Alice@Example.com "), "s3cret")
            .await
            .unwrap();

        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.bio, DEFAULT_BIO);
        assert_ne!(user.password_hash, "s3cret");
        assert!(!user.is_admin);

        let verified = store.verify("alice", "s3cret").await.unwrap();
        assert_eq!(verified.id, user.id);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_fail_alike() {
        let store = store();
        store
            .register(candidate("alice", "alice@example.com"), "s3cret")
            .await
            .unwrap();

        let wrong = store.verify("alice", "nope").await.unwrap_err();
        let unknown = store.verify("mallory", "s3cret").await.unwrap_err();
        assert!(matches!(wrong, AppError::InvalidCredential));
        assert!(matches!(unknown, AppError::InvalidCredential));
    }

    #[tokio::test]
    async fn test_duplicate_username_leaves_first_user_intact() {
        let store = store();
        let first = store
            .register(candidate("alice", "alice@example.com"), "first")
            .await
            .unwrap();

        let err = store
            .register(candidate("alice", "other@example.com"), "second")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateIdentity));

        let verified = store.verify("alice", "first").await.unwrap();
        assert_eq!(verified.id, first.id);
        assert_eq!(verified.email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_is_case_insensitive() {
        let store = store();
        store
            .register(candidate("alice", "alice@example.com"), "pw")
            .await
            .unwrap();

        let err = store
            .register(candidate("bob", "ALICE@example.com"), "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateIdentity));
    }

    #[tokio::test]
    async fn test_admin_flag_comes_from_allow_list() {
        let store = store();
        let admin = store
            .register(candidate("root", "Admin@Example.com"), "pw")
            .await
            .unwrap();
        assert!(admin.is_admin);
    }

    #[tokio::test]
    async fn test_set_password_replaces_hash() {
        let store = store();
        let user = store
            .register(candidate("alice", "alice@example.com"), "old")
            .await
            .unwrap();

        store.set_password(user, "new").await.unwrap();

        assert!(store.verify("alice", "new").await.is_ok());
        assert!(matches!(
            store.verify("alice", "old").await.unwrap_err(),
            AppError::InvalidCredential
        ));
    }
}
