// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Password recovery: issuing and redeeming single-use reset tokens.
//!
//! The flow spans two requests correlated only by the token:
//! 1. `issue` stores a random token with a one-hour expiry on the user and
//!    emails a link embedding it.
//! 2. `redeem` checks the token, stores the new password, clears the token and
//!    emails a confirmation.
//!
//! Token state is saved before any mail is sent. A mail failure therefore
//! never rolls back the state change before it: after a failed reset-link
//! email the token stays valid but undelivered.

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::User;
use crate::services::credentials::{normalize_email, CredentialStore};
use crate::services::mail::{self, Mailer};
use crate::services::random;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// How long a reset token is accepted after it is issued.
pub const RESET_TOKEN_TTL_SECS: i64 = 3600;

/// Outcome of a successful `issue`.
#[derive(Debug, Clone)]
pub struct IssuedReset {
    /// Address the link was sent to
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and redeems password reset tokens.
#[derive(Clone)]
pub struct PasswordResetService {
    db: Database,
    credentials: CredentialStore,
    mailer: Arc<dyn Mailer>,
    public_url: String,
    mail_from: String,
}

impl PasswordResetService {
    pub fn new(
        db: Database,
        credentials: CredentialStore,
        mailer: Arc<dyn Mailer>,
        public_url: &str,
        mail_from: &str,
    ) -> Self {
        Self {
            db,
            credentials,
            mailer,
            public_url: public_url.trim_end_matches('/').to_string(),
            mail_from: mail_from.to_string(),
        }
    }

    /// Link embedded in the reset email.
    pub fn reset_url(&self, token: &str) -> String {
        format!("{}/reset/{}", self.public_url, token)
    }

    pub async fn issue(&self, email: &str) -> Result<IssuedReset> {
        self.issue_at(email, Utc::now()).await
    }

    /// Attach a fresh token to the account registered under `email` and mail
    /// the reset link. Any earlier token for that account stops working.
    pub async fn issue_at(&self, email: &str, now: DateTime<Utc>) -> Result<IssuedReset> {
        let token = random::reset_token()?;

        let email = normalize_email(email);
        let mut user = self
            .db
            .find_user_by_email(&email)
            .await?
            .ok_or(AppError::NoSuchAccount)?;

        let expires_at = now + Duration::seconds(RESET_TOKEN_TTL_SECS);
        user.reset_password_token = Some(token.clone());
        user.reset_password_expires = Some(expires_at);
        self.db.update_user(&user).await?;

        tracing::info!(user_id = %user.id, expires_at = %expires_at, "Password reset issued");

        let message =
            mail::reset_link_message(&self.mail_from, &user.email, &self.reset_url(&token));
        mail::deliver(self.mailer.clone(), message).await?;

        Ok(IssuedReset {
            email: user.email,
            expires_at,
        })
    }

    pub async fn validate(&self, token: &str) -> Result<User> {
        self.validate_at(token, Utc::now()).await
    }

    /// Find the user holding `token`, provided it has not expired at `now`.
    pub async fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<User> {
        if token.is_empty() {
            return Err(AppError::InvalidOrExpiredToken);
        }

        match self.db.find_user_by_reset_token(token).await? {
            Some(user) if user.reset_token_matches(token, now) => Ok(user),
            _ => Err(AppError::InvalidOrExpiredToken),
        }
    }

    pub async fn redeem(&self, token: &str, password: &str, confirm: &str) -> Result<User> {
        self.redeem_at(token, password, confirm, Utc::now()).await
    }

    /// Change the password of the user holding `token` and consume the token.
    ///
    /// On a password mismatch nothing is written and the token remains valid.
    /// The returned user is the one the caller's session should be bound to.
    pub async fn redeem_at(
        &self,
        token: &str,
        password: &str,
        confirm: &str,
        now: DateTime<Utc>,
    ) -> Result<User> {
        let mut user = self.validate_at(token, now).await?;

        if password != confirm {
            return Err(AppError::PasswordMismatch);
        }

        user.clear_reset_token();
        let user = self.credentials.set_password(user, password).await?;

        tracing::info!(user_id = %user.id, "Password reset redeemed");

        let message = mail::reset_confirmation_message(&self.mail_from, &user.email);
        if let Err(e) = mail::deliver(self.mailer.clone(), message).await {
            tracing::warn!(
                user_id = %user.id,
                error = %e,
                "Password changed but confirmation mail failed"
            );
        }

        Ok(user)
    }
}
