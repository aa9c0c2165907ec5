// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types.
//!
//! Every variant is recovered at the request boundary: handlers turn it into a
//! redirect carrying [`AppError::user_message`] as a flash. The
//! [`IntoResponse`] impl only covers the rare paths with nowhere to redirect.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("A user with the given username or email is already registered")]
    DuplicateIdentity,

    #[error("Invalid username or password")]
    InvalidCredential,

    #[error("No account with that email address exists")]
    NoSuchAccount,

    #[error("Password reset token is invalid or has expired")]
    InvalidOrExpiredToken,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Mail delivery failed: {0}")]
    MailDelivery(String),

    #[error("Caller does not own this resource")]
    NotOwner,

    #[error("Authentication required")]
    NotAuthenticated,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid address")]
    InvalidAddress,

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Geocoding error: {0}")]
    Geocoding(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// One-line message shown to the user as a flash.
    ///
    /// Infrastructure failures are logged here and reported generically.
    pub fn user_message(&self) -> String {
        match self {
            AppError::DuplicateIdentity => {
                "A user with the given username or email is already registered.".to_string()
            }
            AppError::InvalidCredential => "Invalid username or password.".to_string(),
            AppError::NoSuchAccount => "No account with that email address exists.".to_string(),
            AppError::InvalidOrExpiredToken => {
                "Password reset token is invalid or has expired.".to_string()
            }
            AppError::PasswordMismatch => "Passwords do not match.".to_string(),
            AppError::MailDelivery(msg) => {
                tracing::error!(error = %msg, "Mail delivery failed");
                "We could not send the email. Please try again later.".to_string()
            }
            AppError::NotOwner => "You don't have permission to do that.".to_string(),
            AppError::NotAuthenticated => "You need to be logged in to do that.".to_string(),
            AppError::NotFound(what) => format!("{} not found.", what),
            AppError::InvalidAddress => "Invalid address.".to_string(),
            AppError::Validation(msg) => msg.clone(),
            AppError::Geocoding(msg) => {
                tracing::error!(error = %msg, "Geocoding error");
                "Invalid address.".to_string()
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                "Something went wrong. Please try again.".to_string()
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            AppError::NotOwner => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = crate::views::error_page(&self.user_message());
        (status, Html(body)).into_response()
    }
}

/// Result type alias for handlers and services
pub type Result<T> = std::result::Result<T, AppError>;
