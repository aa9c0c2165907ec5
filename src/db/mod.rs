// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (Firestore, or an in-process store when no project is configured).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::error::AppError;
use crate::models::{Campground, Comment, User};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Username claims, keyed by encoded username
    pub const USERNAMES: &str = "usernames";
    /// Email claims, keyed by encoded email
    pub const EMAILS: &str = "emails";
    pub const CAMPGROUNDS: &str = "campgrounds";
    pub const COMMENTS: &str = "comments";
}

/// Storage backend selected at startup.
#[derive(Clone)]
pub enum Database {
    Firestore(FirestoreDb),
    Memory(MemoryDb),
}

impl Database {
    /// Connect to Firestore when a project is given, otherwise use the in-process store.
    pub async fn connect(gcp_project_id: Option<&str>) -> Result<Self, AppError> {
        match gcp_project_id {
            Some(project) => Ok(Database::Firestore(FirestoreDb::new(project).await?)),
            None => {
                tracing::warn!("GCP_PROJECT_ID not set, using in-process store");
                Ok(Database::Memory(MemoryDb::new()))
            }
        }
    }

    // ─── User Operations ─────────────────────────────────────────

    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        match self {
            Database::Firestore(db) => db.get_user(id).await,
            Database::Memory(db) => Ok(db.get_user(id)),
        }
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        match self {
            Database::Firestore(db) => db.find_user_by_username(username).await,
            Database::Memory(db) => Ok(db.find_user_by_username(username)),
        }
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        match self {
            Database::Firestore(db) => db.find_user_by_email(email).await,
            Database::Memory(db) => Ok(db.find_user_by_email(email)),
        }
    }

    pub async fn find_user_by_reset_token(&self, token: &str) -> Result<Option<User>, AppError> {
        match self {
            Database::Firestore(db) => db.find_user_by_reset_token(token).await,
            Database::Memory(db) => Ok(db.find_user_by_reset_token(token)),
        }
    }

    /// Insert a new user; fails with `DuplicateIdentity` without writing anything
    /// if the username or email is already registered.
    pub async fn create_user(&self, user: &User) -> Result<(), AppError> {
        match self {
            Database::Firestore(db) => db.create_user(user).await,
            Database::Memory(db) => db.create_user(user),
        }
    }

    /// Update avatar and bio only. Concurrent password changes are kept.
    pub async fn update_profile(&self, user: &User) -> Result<(), AppError> {
        match self {
            Database::Firestore(db) => db.update_profile(user).await,
            Database::Memory(db) => db.update_profile(user),
        }
    }

    pub async fn update_user(&self, user: &User) -> Result<(), AppError> {
        match self {
            Database::Firestore(db) => db.update_user(user).await,
            Database::Memory(db) => db.update_user(user),
        }
    }

    // ─── Campground Operations ───────────────────────────────────

    pub async fn list_campgrounds(&self) -> Result<Vec<Campground>, AppError> {
        match self {
            Database::Firestore(db) => db.list_campgrounds().await,
            Database::Memory(db) => Ok(db.list_campgrounds()),
        }
    }

    pub async fn list_campgrounds_by_author(
        &self,
        user_id: &str,
    ) -> Result<Vec<Campground>, AppError> {
        match self {
            Database::Firestore(db) => db.list_campgrounds_by_author(user_id).await,
            Database::Memory(db) => Ok(db.list_campgrounds_by_author(user_id)),
        }
    }

    pub async fn get_campground(&self, id: &str) -> Result<Option<Campground>, AppError> {
        match self {
            Database::Firestore(db) => db.get_campground(id).await,
            Database::Memory(db) => Ok(db.get_campground(id)),
        }
    }

    pub async fn upsert_campground(&self, campground: &Campground) -> Result<(), AppError> {
        match self {
            Database::Firestore(db) => db.upsert_campground(campground).await,
            Database::Memory(db) => {
                db.upsert_campground(campground);
                Ok(())
            }
        }
    }

    /// Delete a campground and its comments, returning the number of comments removed.
    pub async fn delete_campground(&self, id: &str) -> Result<usize, AppError> {
        match self {
            Database::Firestore(db) => db.delete_campground(id).await,
            Database::Memory(db) => Ok(db.delete_campground(id)),
        }
    }

    // ─── Comment Operations ──────────────────────────────────────

    pub async fn list_comments(&self, campground_id: &str) -> Result<Vec<Comment>, AppError> {
        match self {
            Database::Firestore(db) => db.list_comments(campground_id).await,
            Database::Memory(db) => Ok(db.list_comments(campground_id)),
        }
    }

    pub async fn get_comment(&self, id: &str) -> Result<Option<Comment>, AppError> {
        match self {
            Database::Firestore(db) => db.get_comment(id).await,
            Database::Memory(db) => Ok(db.get_comment(id)),
        }
    }

    pub async fn upsert_comment(&self, comment: &Comment) -> Result<(), AppError> {
        match self {
            Database::Firestore(db) => db.upsert_comment(comment).await,
            Database::Memory(db) => {
                db.upsert_comment(comment);
                Ok(())
            }
        }
    }

    pub async fn delete_comment(&self, id: &str) -> Result<(), AppError> {
        match self {
            Database::Firestore(db) => db.delete_comment(id).await,
            Database::Memory(db) => {
                db.delete_comment(id);
                Ok(())
            }
        }
    }
}
