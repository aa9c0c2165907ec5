// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User model for storage and views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder biography for new accounts.
pub const DEFAULT_BIO: &str = "No bio yet...";

fn default_bio() -> String {
    DEFAULT_BIO.to_string()
}

/// User record stored in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Random identifier (also used as document ID)
    pub id: String,
    /// Unique login name
    pub username: String,
    /// Unique email address, stored lower-cased
    pub email: String,
    /// Argon2id PHC string; never the plaintext
    pub password_hash: String,
    /// Avatar image URL
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default = "default_bio")]
    pub bio: String,
    #[serde(default)]
    pub is_admin: bool,
    /// Pending single-use password reset token
    #[serde(default)]
    pub reset_password_token: Option<String>,
    /// When the pending reset token stops being accepted
    #[serde(default)]
    pub reset_password_expires: Option<DateTime<Utc>>,
    /// When the account was created (RFC3339)
    pub created_at: String,
}

impl User {
    /// Whether `token` is this user's pending reset token and is still live at `now`.
    pub fn reset_token_matches(&self, token: &str, now: DateTime<Utc>) -> bool {
        match (&self.reset_password_token, self.reset_password_expires) {
            (Some(stored), Some(expires)) => stored == token && expires > now,
            _ => false,
        }
    }

    /// Drop any pending reset token.
    pub fn clear_reset_token(&mut self) {
        self.reset_password_token = None;
        self.reset_password_expires = None;
    }
}

/// Owner reference embedded in campgrounds and comments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Author {
    pub id: String,
    /// Denormalised for display
    pub username: String,
}

/// Candidate identity submitted at registration.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
}
