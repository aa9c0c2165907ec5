// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! YelpCamp: campground listings with accounts and password recovery.
//!
//! This crate serves the server-rendered site: registration and login,
//! emailed password reset links, and campground, comment and profile pages
//! guarded by ownership checks.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod views;

use config::Config;
use db::Database;
use middleware::SessionStore;
use services::{CredentialStore, GeocodingService, Mailer, PasswordResetService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub sessions: Arc<SessionStore>,
    pub credentials: CredentialStore,
    pub password_reset: PasswordResetService,
    pub geocoder: GeocodingService,
}

impl AppState {
    /// Wire the services together from configuration, a store and a mail sender.
    pub fn new(config: Config, db: Database, mailer: Arc<dyn Mailer>) -> Self {
        let sessions = Arc::new(SessionStore::new(
            &config.session_secret,
            config.session_ttl_secs,
            config.secure_cookies(),
        ));
        let credentials = CredentialStore::new(db.clone(), &config);
        let password_reset = PasswordResetService::new(
            db.clone(),
            credentials.clone(),
            mailer,
            &config.public_url,
            &config.mail_from,
        );
        let geocoder = GeocodingService::new(config.geocoder_api_key.clone());

        Self {
            config,
            db,
            sessions,
            credentials,
            password_reset,
            geocoder,
        }
    }
}
