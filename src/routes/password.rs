// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Forgotten password routes.
//!
//! `/forgot` issues a reset token and mails a link to `/reset/{token}`;
//! `/reset/{token}` redeems it. The two requests share nothing but the token.

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Extension, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{page, parse_form, redirect_with_error, Submitted};
use crate::error::AppError;
use crate::middleware::{CurrentUser, Session};
use crate::services::credentials::normalize_email;
use crate::views;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/forgot", get(forgot_form).post(forgot))
        .route("/reset/{token}", get(reset_form).post(reset))
}

#[derive(Debug, Deserialize)]
pub struct ForgotForm {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetForm {
    pub password: String,
    pub confirm: String,
}

fn sent_message(email: &str) -> String {
    format!(
        "An e-mail has been sent to {} with further instructions.",
        email
    )
}

async fn forgot_form(
    Extension(session): Extension<Session>,
    Extension(current): Extension<CurrentUser>,
) -> Html<String> {
    Html(views::forgot(&page(&session, &current)))
}

/// Issue a reset token for the account with the given email.
async fn forgot(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    form: Submitted<ForgotForm>,
) -> Response {
    let form = match parse_form(form) {
        Ok(form) => form,
        Err(e) => return redirect_with_error(&session, &e, "/forgot"),
    };
    match state.password_reset.issue(&form.email).await {
        Ok(issued) => session.flash_success(sent_message(&issued.email)),
        Err(AppError::NoSuchAccount) if state.config.mask_unknown_reset_email => {
            tracing::info!("Reset requested for unknown email, masked");
            session.flash_success(sent_message(&normalize_email(&form.email)));
        }
        Err(e) => return redirect_with_error(&session, &e, "/forgot"),
    }
    Redirect::to("/forgot").into_response()
}

/// Show the new-password form if the token is live.
async fn reset_form(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Extension(current): Extension<CurrentUser>,
    Path(token): Path<String>,
) -> Response {
    match state.password_reset.validate(&token).await {
        Ok(_) => Html(views::reset(&page(&session, &current), &token)).into_response(),
        Err(e) => redirect_with_error(&session, &e, "/forgot"),
    }
}

/// Redeem the token: store the new password and log the user in.
async fn reset(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(token): Path<String>,
    form: Submitted<ResetForm>,
) -> Response {
    let redeemed = match parse_form(form) {
        Ok(form) => {
            state
                .password_reset
                .redeem(&token, &form.password, &form.confirm)
                .await
        }
        Err(e) => Err(e),
    };
    let user = match redeemed {
        Ok(user) => user,
        Err(e @ AppError::PasswordMismatch) | Err(e @ AppError::Validation(_)) => {
            let back = format!("/reset/{}", urlencoding::encode(&token));
            return redirect_with_error(&session, &e, &back);
        }
        Err(e) => return redirect_with_error(&session, &e, "/forgot"),
    };

    if let Err(e) = session.login(&user.id) {
        return redirect_with_error(&session, &e, "/login");
    }

    session.flash_success("Success! Your password has been changed.");
    Redirect::to("/campgrounds").into_response()
}
