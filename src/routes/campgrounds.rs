// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Campground listing routes.

use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use super::{empty_as_none, page, parse_form, redirect_with_error, validation_message, Submitted};
use crate::error::{AppError, Result};
use crate::middleware::{CurrentUser, Flash, FlashKind, Session};
use crate::models::Campground;
use crate::services::{authorize, random, Identity};
use crate::views;
use crate::AppState;

/// Listing and viewing.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/campgrounds", get(index))
        .route("/campgrounds/{id}", get(show))
}

/// Creating, editing and deleting. Login is enforced by the caller's route layer.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/campgrounds", post(create))
        .route("/campgrounds/new", get(new_form))
        .route("/campgrounds/{id}", post(update).put(update).delete(destroy))
        .route("/campgrounds/{id}/edit", get(edit_form))
        .route("/campgrounds/{id}/delete", post(destroy))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub search: Option<String>,
}

/// Campground form fields, shared by create and update.
#[derive(Debug, Deserialize, Validate)]
pub struct CampgroundForm {
    #[validate(length(min = 1, max = 200, message = "Name is required."))]
    pub name: String,
    #[validate(url(message = "Image must be a valid URL."))]
    pub image: String,
    #[validate(length(min = 1, message = "Description is required."))]
    pub description: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub price: Option<String>,
    #[validate(length(min = 1, message = "Location is required."))]
    pub location: String,
}

pub(crate) async fn load_campground(state: &AppState, id: &str) -> Result<Campground> {
    state
        .db
        .get_campground(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Campground".to_string()))
}

/// Whether a campground name matches a search, ignoring case.
fn name_matches(campground: &Campground, query: &str) -> bool {
    campground
        .name
        .to_lowercase()
        .contains(&query.trim().to_lowercase())
}

/// All campgrounds, or those whose name contains `?search=`.
async fn index(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<SearchParams>,
) -> Result<Html<String>> {
    let mut campgrounds = state.db.list_campgrounds().await?;
    let mut ctx = page(&session, &current);

    if let Some(query) = &params.search {
        campgrounds.retain(|c| name_matches(c, query));
        if campgrounds.is_empty() {
            ctx.flash.push(Flash {
                kind: FlashKind::Error,
                message: "No campgrounds match that query, please try again.".to_string(),
            });
        }
    }

    Ok(Html(views::campgrounds_index(
        &ctx,
        &campgrounds,
        params.search.as_deref(),
    )))
}

async fn new_form(
    Extension(session): Extension<Session>,
    Extension(current): Extension<CurrentUser>,
) -> Html<String> {
    Html(views::campground_new(&page(&session, &current)))
}

/// Geocode the location and store a listing authored by the caller.
async fn create(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Extension(identity): Extension<Identity>,
    form: Submitted<CampgroundForm>,
) -> Response {
    match create_campground(&state, &identity, form).await {
        Ok(campground) => {
            session.flash_success("Successfully created campground!");
            Redirect::to(&format!("/campgrounds/{}", campground.id)).into_response()
        }
        Err(e) => redirect_with_error(&session, &e, "/campgrounds/new"),
    }
}

async fn create_campground(
    state: &AppState,
    identity: &Identity,
    form: Submitted<CampgroundForm>,
) -> Result<Campground> {
    let form = parse_form(form)?;
    form.validate()
        .map_err(|e| AppError::Validation(validation_message(&e)))?;
    let location = state.geocoder.geocode(&form.location).await?;

    let campground = Campground {
        id: random::document_id()?,
        name: form.name.trim().to_string(),
        image: form.image,
        description: form.description,
        price: form.price,
        location: location.formatted_address,
        lat: location.lat,
        lng: location.lng,
        author: identity.author(),
        created_at: chrono::Utc::now().to_rfc3339(),
    };
    state.db.upsert_campground(&campground).await?;

    tracing::info!(
        campground_id = %campground.id,
        user_id = %identity.user_id,
        "Campground created"
    );
    Ok(campground)
}

/// A campground with its comments.
async fn show(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Response {
    let campground = match load_campground(&state, &id).await {
        Ok(c) => c,
        Err(e) => return redirect_with_error(&session, &e, "/campgrounds"),
    };
    let comments = match state.db.list_comments(&campground.id).await {
        Ok(c) => c,
        Err(e) => return redirect_with_error(&session, &e, "/campgrounds"),
    };

    Html(views::campground_show(
        &page(&session, &current),
        &campground,
        &comments,
    ))
    .into_response()
}

async fn edit_form(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Extension(current): Extension<CurrentUser>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Response {
    let campground = match load_campground(&state, &id).await {
        Ok(c) => c,
        Err(e) => return redirect_with_error(&session, &e, "/campgrounds"),
    };
    if let Err(e) = authorize(Some(&identity), &campground) {
        let back = format!("/campgrounds/{}", campground.id);
        return redirect_with_error(&session, &e, &back);
    }

    Html(views::campground_edit(&page(&session, &current), &campground)).into_response()
}

/// Replace the editable fields. Author and creation time are kept.
async fn update(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    form: Submitted<CampgroundForm>,
) -> Response {
    let campground = match load_campground(&state, &id).await {
        Ok(c) => c,
        Err(e) => return redirect_with_error(&session, &e, "/campgrounds"),
    };
    let back = format!("/campgrounds/{}", campground.id);
    if let Err(e) = authorize(Some(&identity), &campground) {
        return redirect_with_error(&session, &e, &back);
    }

    match update_campground(&state, campground, form).await {
        Ok(_) => {
            session.flash_success("Successfully Updated Campground!");
            Redirect::to(&back).into_response()
        }
        Err(e) => redirect_with_error(&session, &e, &format!("{}/edit", back)),
    }
}

async fn update_campground(
    state: &AppState,
    mut campground: Campground,
    form: Submitted<CampgroundForm>,
) -> Result<Campground> {
    let form = parse_form(form)?;
    form.validate()
        .map_err(|e| AppError::Validation(validation_message(&e)))?;
    let location = state.geocoder.geocode(&form.location).await?;

    campground.name = form.name.trim().to_string();
    campground.image = form.image;
    campground.description = form.description;
    campground.price = form.price;
    campground.location = location.formatted_address;
    campground.lat = location.lat;
    campground.lng = location.lng;
    state.db.upsert_campground(&campground).await?;

    tracing::info!(campground_id = %campground.id, "Campground updated");
    Ok(campground)
}

/// Delete a campground and its comments.
async fn destroy(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Response {
    let campground = match load_campground(&state, &id).await {
        Ok(c) => c,
        Err(e) => return redirect_with_error(&session, &e, "/campgrounds"),
    };
    if let Err(e) = authorize(Some(&identity), &campground) {
        let back = format!("/campgrounds/{}", campground.id);
        return redirect_with_error(&session, &e, &back);
    }

    match state.db.delete_campground(&campground.id).await {
        Ok(comments) => {
            tracing::info!(
                campground_id = %campground.id,
                user_id = %identity.user_id,
                comments,
                "Campground deleted"
            );
            session.flash_success("Campground deleted successfully!");
            Redirect::to("/campgrounds").into_response()
        }
        Err(e) => redirect_with_error(&session, &e, "/campgrounds"),
    }
}
