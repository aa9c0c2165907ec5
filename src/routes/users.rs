// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile routes.

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use super::{empty_as_none, page, parse_form, redirect_with_error, validation_message, Submitted};
use crate::error::{AppError, Result};
use crate::middleware::{CurrentUser, Session};
use crate::models::user::DEFAULT_BIO;
use crate::models::User;
use crate::services::{authorize, Identity};
use crate::views;
use crate::AppState;

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/users/{id}", get(show))
}

/// Login is enforced by the caller's route layer.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/{id}", post(update).put(update))
        .route("/users/{id}/edit", get(edit_form))
}

/// Editable profile fields. Nothing else on the user record can be set here.
#[derive(Debug, Deserialize, Validate)]
pub struct ProfileForm {
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(url(message = "Avatar must be a valid URL."))]
    pub avatar: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 2000, message = "Bio is too long."))]
    pub bio: Option<String>,
}

async fn load_user(state: &AppState, id: &str) -> Result<User> {
    state
        .db
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))
}

/// Profile plus the user's campgrounds.
async fn show(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Response {
    let user = match load_user(&state, &id).await {
        Ok(u) => u,
        Err(e) => return redirect_with_error(&session, &e, "/"),
    };
    let campgrounds = match state.db.list_campgrounds_by_author(&user.id).await {
        Ok(c) => c,
        Err(e) => return redirect_with_error(&session, &e, "/"),
    };

    Html(views::user_show(&page(&session, &current), &user, &campgrounds)).into_response()
}

async fn edit_form(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Extension(current): Extension<CurrentUser>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Response {
    let user = match load_user(&state, &id).await {
        Ok(u) => u,
        Err(e) => return redirect_with_error(&session, &e, "/campgrounds"),
    };
    if let Err(e) = authorize(Some(&identity), &user) {
        return redirect_with_error(&session, &e, &format!("/users/{}", user.id));
    }

    Html(views::user_edit(&page(&session, &current), &user)).into_response()
}

/// Update avatar and bio. The password hash, admin flag and reset fields
/// are carried over from the stored record untouched.
async fn update(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    form: Submitted<ProfileForm>,
) -> Response {
    let mut user = match load_user(&state, &id).await {
        Ok(u) => u,
        Err(e) => return redirect_with_error(&session, &e, "/campgrounds"),
    };
    let back = format!("/users/{}", user.id);
    if let Err(e) = authorize(Some(&identity), &user) {
        return redirect_with_error(&session, &e, &back);
    }
    let edit = format!("{}/edit", back);
    let form = match parse_form(form) {
        Ok(form) => form,
        Err(e) => return redirect_with_error(&session, &e, &edit),
    };
    if let Err(errors) = form.validate() {
        let err = AppError::Validation(validation_message(&errors));
        return redirect_with_error(&session, &err, &edit);
    }

    user.avatar = form.avatar;
    user.bio = form.bio.unwrap_or_else(|| DEFAULT_BIO.to_string());

    match state.db.update_profile(&user).await {
        Ok(()) => {
            tracing::info!(user_id = %user.id, editor_id = %identity.user_id, "Profile updated");
            session.flash_success("Successfully updated your profile!");
            Redirect::to(&back).into_response()
        }
        Err(e) => redirect_with_error(&session, &e, &back),
    }
}
