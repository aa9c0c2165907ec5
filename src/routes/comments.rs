// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Comment routes, nested under a campground. All require login.

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use super::campgrounds::load_campground;
use super::{page, parse_form, redirect_with_error, validation_message, Submitted};
use crate::error::{AppError, Result};
use crate::middleware::{CurrentUser, Session};
use crate::models::Comment;
use crate::services::{authorize, random, Identity};
use crate::views;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/campgrounds/{id}/comments", post(create))
        .route("/campgrounds/{id}/comments/new", get(new_form))
        .route(
            "/campgrounds/{id}/comments/{comment_id}",
            post(update).put(update).delete(destroy),
        )
        .route(
            "/campgrounds/{id}/comments/{comment_id}/edit",
            get(edit_form),
        )
        .route(
            "/campgrounds/{id}/comments/{comment_id}/delete",
            post(destroy),
        )
}

#[derive(Debug, Deserialize, Validate)]
pub struct CommentForm {
    #[validate(length(min = 1, max = 5000, message = "Comment text is required."))]
    pub text: String,
}

/// Load a comment, requiring that it belongs to `campground_id`.
async fn load_comment(state: &AppState, campground_id: &str, comment_id: &str) -> Result<Comment> {
    state
        .db
        .get_comment(comment_id)
        .await?
        .filter(|c| c.campground_id == campground_id)
        .ok_or_else(|| AppError::NotFound("Comment".to_string()))
}

fn validated_text(form: Submitted<CommentForm>) -> Result<String> {
    let form = parse_form(form)?;
    form.validate()
        .map_err(|e| AppError::Validation(validation_message(&e)))?;
    let text = form.text.trim().to_string();
    if text.is_empty() {
        return Err(AppError::Validation("Comment text is required.".to_string()));
    }
    Ok(text)
}

async fn new_form(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Response {
    match load_campground(&state, &id).await {
        Ok(campground) => {
            Html(views::comment_new(&page(&session, &current), &campground)).into_response()
        }
        Err(e) => redirect_with_error(&session, &e, "/campgrounds"),
    }
}

async fn create(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    form: Submitted<CommentForm>,
) -> Response {
    let campground = match load_campground(&state, &id).await {
        Ok(c) => c,
        Err(e) => return redirect_with_error(&session, &e, "/campgrounds"),
    };
    let back = format!("/campgrounds/{}", campground.id);

    let result = async {
        let comment = Comment {
            id: random::document_id()?,
            campground_id: campground.id.clone(),
            text: validated_text(form)?,
            author: identity.author(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        state.db.upsert_comment(&comment).await?;
        Ok::<_, AppError>(comment)
    }
    .await;

    match result {
        Ok(comment) => {
            tracing::info!(
                comment_id = %comment.id,
                campground_id = %campground.id,
                user_id = %identity.user_id,
                "Comment created"
            );
            session.flash_success("Successfully added comment");
            Redirect::to(&back).into_response()
        }
        Err(e) => redirect_with_error(&session, &e, &format!("{}/comments/new", back)),
    }
}

async fn edit_form(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Extension(current): Extension<CurrentUser>,
    Extension(identity): Extension<Identity>,
    Path((id, comment_id)): Path<(String, String)>,
) -> Response {
    let comment = match load_comment(&state, &id, &comment_id).await {
        Ok(c) => c,
        Err(e) => return redirect_with_error(&session, &e, "/campgrounds"),
    };
    if let Err(e) = authorize(Some(&identity), &comment) {
        let back = format!("/campgrounds/{}", comment.campground_id);
        return redirect_with_error(&session, &e, &back);
    }

    Html(views::comment_edit(
        &page(&session, &current),
        &comment.campground_id,
        &comment,
    ))
    .into_response()
}

async fn update(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Extension(identity): Extension<Identity>,
    Path((id, comment_id)): Path<(String, String)>,
    form: Submitted<CommentForm>,
) -> Response {
    let mut comment = match load_comment(&state, &id, &comment_id).await {
        Ok(c) => c,
        Err(e) => return redirect_with_error(&session, &e, "/campgrounds"),
    };
    let back = format!("/campgrounds/{}", comment.campground_id);
    if let Err(e) = authorize(Some(&identity), &comment) {
        return redirect_with_error(&session, &e, &back);
    }

    let result = async {
        comment.text = validated_text(form)?;
        state.db.upsert_comment(&comment).await
    }
    .await;

    match result {
        Ok(()) => {
            tracing::info!(comment_id = %comment.id, "Comment updated");
            session.flash_success("Comment updated");
            Redirect::to(&back).into_response()
        }
        Err(e) => {
            let edit = format!("{}/comments/{}/edit", back, comment.id);
            redirect_with_error(&session, &e, &edit)
        }
    }
}

async fn destroy(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Extension(identity): Extension<Identity>,
    Path((id, comment_id)): Path<(String, String)>,
) -> Response {
    let comment = match load_comment(&state, &id, &comment_id).await {
        Ok(c) => c,
        Err(e) => return redirect_with_error(&session, &e, "/campgrounds"),
    };
    let back = format!("/campgrounds/{}", comment.campground_id);
    if let Err(e) = authorize(Some(&identity), &comment) {
        return redirect_with_error(&session, &e, &back);
    }

    match state.db.delete_comment(&comment.id).await {
        Ok(()) => {
            tracing::info!(
                comment_id = %comment.id,
                user_id = %identity.user_id,
                "Comment deleted"
            );
            session.flash_success("Comment deleted");
            Redirect::to(&back).into_response()
        }
        Err(e) => redirect_with_error(&session, &e, &back),
    }
}
