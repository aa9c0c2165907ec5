// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (credentials, profile, reset state)
//! - Identity claims (one document per username and per email, for uniqueness)
//! - Campgrounds
//! - Comments

use crate::db::collections;
use crate::error::AppError;
use crate::models::{Campground, Comment, User};
use firestore::{paths, FirestoreWritePrecondition};
use serde::{Deserialize, Serialize};

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Claim document reserving a username or email for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IdentityClaim {
    user_id: String,
}

/// Document ID for a claim; identities may contain characters Firestore rejects.
fn claim_id(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client. Every operation returns a database error.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        self.find_user_by_claim(collections::USERNAMES, username)
            .await
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.find_user_by_claim(collections::EMAILS, email).await
    }

    /// Resolve a username or email claim to its user.
    async fn find_user_by_claim(
        &self,
        collection: &str,
        value: &str,
    ) -> Result<Option<User>, AppError> {
        let claim: Option<IdentityClaim> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(&claim_id(value))
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match claim {
            Some(claim) => self.get_user(&claim.user_id).await,
            None => Ok(None),
        }
    }

    /// Find the user holding a reset token. Expiry is checked by the caller.
    pub async fn find_user_by_reset_token(&self, token: &str) -> Result<Option<User>, AppError> {
        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(|q| q.for_all([q.field("reset_password_token").eq(token)]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.into_iter().next())
    }

    /// Atomically create a user together with its username and email claims.
    ///
    /// The claims are written with a must-not-exist precondition, so a
    /// concurrent registration of the same identity makes the commit fail and
    /// nothing is written.
    pub async fn create_user(&self, user: &User) -> Result<(), AppError> {
        if self.identity_taken(user).await? {
            return Err(AppError::DuplicateIdentity);
        }

        let client = self.get_client()?;
        let claim = IdentityClaim {
            user_id: user.id.clone(),
        };

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        for (collection, value) in [
            (collections::USERNAMES, &user.username),
            (collections::EMAILS, &user.email),
        ] {
            client
                .fluent()
                .update()
                .in_col(collection)
                .precondition(FirestoreWritePrecondition::Exists(false))
                .document_id(claim_id(value))
                .object(&claim)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add claim to transaction: {}", e))
                })?;
        }

        client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .precondition(FirestoreWritePrecondition::Exists(false))
            .document_id(&user.id)
            .object(user)
            .add_to_transaction(&mut transaction)
            .map_err(|e| AppError::Database(format!("Failed to add user to transaction: {}", e)))?;

        if let Err(e) = transaction.commit().await {
            // Lost a race with another registration of the same identity
            if self.identity_taken(user).await? {
                return Err(AppError::DuplicateIdentity);
            }
            return Err(AppError::Database(format!(
                "User creation commit failed: {}",
                e
            )));
        }

        tracing::info!(user_id = %user.id, "User created");
        Ok(())
    }

    async fn identity_taken(&self, user: &User) -> Result<bool, AppError> {
        Ok(self.find_user_by_username(&user.username).await?.is_some()
            || self.find_user_by_email(&user.email).await?.is_some())
    }

    /// Overwrite an existing user document.
    ///
    /// Username and email are never changed after registration, so the
    /// claim documents are left alone.
    /// Write only the profile fields, leaving credentials and reset state
    /// as they are in the store.
    pub async fn update_profile(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(paths!(User::{avatar, bio}))
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    pub async fn update_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Campground Operations ───────────────────────────────────

    pub async fn list_campgrounds(&self) -> Result<Vec<Campground>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::CAMPGROUNDS)
            .order_by([("created_at", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn list_campgrounds_by_author(
        &self,
        user_id: &str,
    ) -> Result<Vec<Campground>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::CAMPGROUNDS)
            .filter(|q| q.for_all([q.field("author.id").eq(user_id)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn get_campground(&self, id: &str) -> Result<Option<Campground>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::CAMPGROUNDS)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn upsert_campground(&self, campground: &Campground) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::CAMPGROUNDS)
            .document_id(&campground.id)
            .object(campground)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a campground and all its comments.
    ///
    /// Returns the number of comments deleted.
    pub async fn delete_campground(&self, id: &str) -> Result<usize, AppError> {
        let comments = self.list_comments(id).await?;
        let count = comments.len();
        self.batch_delete(&comments, collections::COMMENTS, |c: &Comment| {
            c.id.clone()
        })
        .await?;
        tracing::debug!(campground_id = id, count, "Deleted campground comments");

        self.get_client()?
            .fluent()
            .delete()
            .from(collections::CAMPGROUNDS)
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count)
    }

    // ─── Comment Operations ──────────────────────────────────────

    pub async fn list_comments(&self, campground_id: &str) -> Result<Vec<Comment>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::COMMENTS)
            .filter(|q| q.for_all([q.field("campground_id").eq(campground_id)]))
            .order_by([("created_at", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn get_comment(&self, id: &str) -> Result<Option<Comment>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::COMMENTS)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn upsert_comment(&self, comment: &Comment) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::COMMENTS)
            .document_id(&comment.id)
            .object(comment)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    pub async fn delete_comment(&self, id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::COMMENTS)
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Helper Methods ────────────────────────────────────────────

    /// Helper to batch delete documents using transactions.
    async fn batch_delete<T, F>(
        &self,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> Result<(), AppError>
    where
        F: Fn(&T) -> String,
    {
        let client = self.get_client()?;

        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                let doc_id = id_extractor(item);
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(&doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }
}
