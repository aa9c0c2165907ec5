// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! YelpCamp web server
//!
//! Serves campground listings with accounts, emailed password reset links
//! and ownership-checked editing.

use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yelpcamp::{
    config::Config,
    db::Database,
    services::{LogMailer, Mailer, SmtpMailer},
    AppState,
};

/// How often idle sessions are swept from the session table.
const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, public_url = %config.public_url, "Starting YelpCamp");

    // Firestore when a project is configured, in-process store otherwise
    let db = Database::connect(config.gcp_project_id.as_deref()).await?;

    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => {
            tracing::info!(host = %smtp.host, port = smtp.port, "SMTP mailer configured");
            Arc::new(SmtpMailer::new(smtp)?)
        }
        None => {
            tracing::warn!("SMTP_HOST not set, outbound mail will only be logged");
            Arc::new(LogMailer)
        }
    };

    if config.geocoder_api_key.is_none() {
        tracing::warn!("GEOCODER_API_KEY not set, locations will not be geocoded");
    }

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), db, mailer));

    // Sweep idle sessions in the background
    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            let purged = sessions.purge_expired(chrono::Utc::now());
            if purged > 0 {
                tracing::debug!(purged, live = sessions.len(), "Expired sessions purged");
            }
        }
    });

    // Build router
    let app = yelpcamp::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging. `RUST_LOG` overrides the defaults.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("yelpcamp=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
