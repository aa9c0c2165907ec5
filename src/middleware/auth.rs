// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session authentication middleware.

use crate::middleware::session::Session;
use crate::services::Identity;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

/// Identity of the caller, if logged in. Inserted on every request.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<Identity>);

impl CurrentUser {
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }
}

/// Middleware that resolves the session's user id into a [`CurrentUser`].
///
/// A session pointing at a user that no longer exists is logged out.
pub async fn load_current_user(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = request.extensions().get::<Session>().cloned();

    let mut identity = None;
    if let Some(session) = &session {
        if let Some(user_id) = session.user_id() {
            match state.db.get_user(&user_id).await {
                Ok(Some(user)) => identity = Some(Identity::from(&user)),
                Ok(None) => {
                    tracing::warn!(user_id = %user_id, "Session user no longer exists");
                    if let Err(e) = session.logout() {
                        tracing::error!(error = %e, "Failed to end stale session");
                    }
                }
                Err(e) => return e.into_response(),
            }
        }
    }

    request.extensions_mut().insert(CurrentUser(identity));
    next.run(request).await
}

/// Middleware that requires a logged-in caller.
///
/// Anonymous callers are sent to the login page with a flash message.
/// On success the [`Identity`] is available as an extension.
pub async fn require_login(mut request: Request, next: Next) -> Response {
    let identity = request
        .extensions()
        .get::<CurrentUser>()
        .and_then(|c| c.0.clone());

    match identity {
        Some(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        None => {
            if let Some(session) = request.extensions().get::<Session>() {
                session.flash_error("You need to be logged in to do that.");
            }
            tracing::debug!(path = %request.uri().path(), "Login required");
            Redirect::to("/login").into_response()
        }
    }
}
