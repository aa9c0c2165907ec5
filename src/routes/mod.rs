// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.

pub mod auth;
pub mod campgrounds;
pub mod comments;
pub mod password;
pub mod users;

use crate::error::AppError;
use crate::middleware::{load_current_user, load_session, require_login, CurrentUser, Session};
use crate::views::{self, PageContext};
use crate::AppState;
use axum::{
    extract::rejection::FormRejection,
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Extension, Form, Json, Router,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use validator::ValidationErrors;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub build_id: String,
}

/// Health check response
async fn health_check() -> Json<HealthResponse> {
    let build_id = option_env!("BUILD_ID").unwrap_or("unknown").to_string();
    Json(HealthResponse {
        status: "ok".to_string(),
        build_id,
    })
}

async fn landing(
    Extension(session): Extension<Session>,
    Extension(current): Extension<CurrentUser>,
) -> Html<String> {
    Html(views::landing(&page(&session, &current)))
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // Public routes (no login required)
    let public_routes = Router::new()
        .route("/", get(landing))
        .route("/health", get(health_check))
        .merge(auth::routes())
        .merge(password::routes())
        .merge(campgrounds::public_routes())
        .merge(users::public_routes());

    // Protected routes (login required, ownership checked per handler)
    let protected_routes = Router::new()
        .merge(campgrounds::protected_routes())
        .merge(comments::routes())
        .merge(users::protected_routes())
        .route_layer(middleware::from_fn(require_login));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            load_current_user,
        ))
        .layer(middleware::from_fn_with_state(state.clone(), load_session))
        .layer(middleware::from_fn(
            crate::middleware::security::add_security_headers,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

// ─── Shared helpers ──────────────────────────────────────────

/// Page context for the current request. Consumes pending flash messages.
pub(crate) fn page(session: &Session, current: &CurrentUser) -> PageContext {
    PageContext {
        user: current.0.clone(),
        flash: session.take_flash(),
    }
}

/// Flash the error's message and send the caller to `to`.
pub(crate) fn redirect_with_error(session: &Session, err: &AppError, to: &str) -> Response {
    session.flash_error(err.user_message());
    Redirect::to(to).into_response()
}

/// A form body as handlers receive it. Rejections are flashed, never
/// answered with axum's plain-text 422.
pub(crate) type Submitted<T> = std::result::Result<Form<T>, FormRejection>;

/// Unpack a submitted form. A missing or malformed field is a validation
/// failure like any other.
pub(crate) fn parse_form<T>(form: Submitted<T>) -> std::result::Result<T, AppError> {
    match form {
        Ok(Form(form)) => Ok(form),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejected form submission");
            Err(AppError::Validation(
                "Please fill in all required fields.".to_string(),
            ))
        }
    }
}

/// First message out of a failed form validation.
pub(crate) fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| errs.iter().map(move |e| (field.clone(), e)))
        .map(|(field, e)| match &e.message {
            Some(message) => message.to_string(),
            None => format!("Invalid {}.", field),
        })
        .next()
        .unwrap_or_else(|| "Invalid input.".to_string())
}

/// Treat a blank form field as absent.
pub(crate) fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}
