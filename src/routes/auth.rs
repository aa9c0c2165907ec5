// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration, login and logout routes.

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Extension, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use super::{empty_as_none, page, parse_form, redirect_with_error, validation_message, Submitted};
use crate::error::AppError;
use crate::middleware::{CurrentUser, Session};
use crate::models::NewUser;
use crate::views;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", get(register_form).post(register))
        .route("/login", get(login_form).post(login))
        .route("/logout", get(logout))
}

/// Sign-up form fields.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterForm {
    #[validate(length(min = 1, max = 64, message = "Username must be 1 to 64 characters."))]
    pub username: String,
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(url(message = "Avatar must be a valid URL."))]
    pub avatar: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 2000, message = "Bio is too long."))]
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

async fn register_form(
    Extension(session): Extension<Session>,
    Extension(current): Extension<CurrentUser>,
) -> Html<String> {
    Html(views::register(&page(&session, &current)))
}

/// Create the account and log the new user in.
async fn register(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    form: Submitted<RegisterForm>,
) -> Response {
    let form = match parse_form(form) {
        Ok(form) => form,
        Err(e) => return redirect_with_error(&session, &e, "/register"),
    };
    if let Err(errors) = form.validate() {
        let err = AppError::Validation(validation_message(&errors));
        return redirect_with_error(&session, &err, "/register");
    }

    let candidate = NewUser {
        username: form.username,
        email: form.email,
        avatar: form.avatar,
        bio: form.bio,
    };

    let user = match state.credentials.register(candidate, &form.password).await {
        Ok(user) => user,
        Err(e) => return redirect_with_error(&session, &e, "/register"),
    };

    if let Err(e) = session.login(&user.id) {
        return redirect_with_error(&session, &e, "/login");
    }

    session.flash_success(format!(
        "Successfully Signed Up! Welcome {}",
        user.username
    ));
    Redirect::to("/campgrounds").into_response()
}

async fn login_form(
    Extension(session): Extension<Session>,
    Extension(current): Extension<CurrentUser>,
) -> Html<String> {
    Html(views::login(&page(&session, &current)))
}

/// Check the credentials and bind the session to the user.
async fn login(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    form: Submitted<LoginForm>,
) -> Response {
    let form = match parse_form(form) {
        Ok(form) => form,
        Err(e) => return redirect_with_error(&session, &e, "/login"),
    };
    let user = match state.credentials.verify(&form.username, &form.password).await {
        Ok(user) => user,
        Err(e) => return redirect_with_error(&session, &e, "/login"),
    };

    if let Err(e) = session.login(&user.id) {
        return redirect_with_error(&session, &e, "/login");
    }

    tracing::info!(user_id = %user.id, "User logged in");
    session.flash_success(format!("Welcome back, {}!", user.username));
    Redirect::to("/campgrounds").into_response()
}

/// End the session. The old session cookie grants nothing afterwards.
async fn logout(
    Extension(session): Extension<Session>,
    Extension(current): Extension<CurrentUser>,
) -> Response {
    if let Err(e) = session.logout() {
        return redirect_with_error(&session, &e, "/campgrounds");
    }

    if let Some(identity) = current.identity() {
        tracing::info!(user_id = %identity.user_id, "User logged out");
    }
    session.flash_success("Logged you out!");
    Redirect::to("/campgrounds").into_response()
}
