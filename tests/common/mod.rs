// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use std::sync::Arc;
use tower::ServiceExt;
use yelpcamp::config::Config;
use yelpcamp::db::{Database, FirestoreDb, MemoryDb};
use yelpcamp::middleware::session::SESSION_COOKIE;
use yelpcamp::routes::create_router;
use yelpcamp::services::MemoryMailer;
use yelpcamp::AppState;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// A router over an in-process store, with the mailbox it sends to.
#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub mailer: Arc<MemoryMailer>,
}

/// Create a test app with the default test config.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    create_test_app_with(Config::test_default())
}

/// Create a test app with an in-process store and a recording mailer.
#[allow(dead_code)]
pub fn create_test_app_with(config: Config) -> TestApp {
    let mailer = Arc::new(MemoryMailer::new());
    let db = Database::Memory(MemoryDb::new());
    let state = Arc::new(AppState::new(config, db, mailer.clone()));

    TestApp {
        router: create_router(state.clone()),
        state,
        mailer,
    }
}

/// Minimal cookie-keeping client: remembers the session cookie between requests.
#[allow(dead_code)]
pub struct Browser {
    router: Router,
    pub cookie: Option<String>,
}

#[allow(dead_code)]
impl Browser {
    pub fn new(app: &TestApp) -> Self {
        Self {
            router: app.router.clone(),
            cookie: None,
        }
    }

    pub async fn send(&mut self, method: &str, uri: &str, form: Option<&[(&str, &str)]>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let body = match form {
            Some(fields) => {
                builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
                Body::from(serde_urlencoded::to_string(fields).unwrap())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        if let Some(set) = session_set_cookie(&response) {
            if set.contains("Max-Age=0") {
                self.cookie = None;
            } else {
                self.cookie = set.split(';').next().map(|pair| pair.to_string());
            }
        }
        response
    }

    pub async fn get(&mut self, uri: &str) -> Response {
        self.send("GET", uri, None).await
    }

    pub async fn post(&mut self, uri: &str, form: &[(&str, &str)]) -> Response {
        self.send("POST", uri, Some(form)).await
    }

    /// GET a page and return its body, asserting it rendered.
    pub async fn page(&mut self, uri: &str) -> String {
        let response = self.get(uri).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
        body_text(response).await
    }

    /// POST a form, expect a redirect, and return the page it leads to.
    pub async fn post_and_follow(&mut self, uri: &str, form: &[(&str, &str)]) -> (String, String) {
        let response = self.post(uri, form).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "POST {uri}");
        let to = location(&response);
        let body = self.page(&to).await;
        (to, body)
    }

    pub async fn register(&mut self, username: &str, email: &str, password: &str) -> String {
        let (to, body) = self
            .post_and_follow(
                "/register",
                &[("username", username), ("email", email), ("password", password)],
            )
            .await;
        assert_eq!(to, "/campgrounds", "registration failed: {body}");
        body
    }

    pub async fn login(&mut self, username: &str, password: &str) -> (String, String) {
        self.post_and_follow("/login", &[("username", username), ("password", password)])
            .await
    }
}

/// The Set-Cookie header for the session cookie, if any.
#[allow(dead_code)]
pub fn session_set_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{SESSION_COOKIE}=")))
        .map(|v| v.to_string())
}

#[allow(dead_code)]
pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("missing Location header")
        .to_str()
        .unwrap()
        .to_string()
}

#[allow(dead_code)]
pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Token from the most recent reset link sent to `email`.
#[allow(dead_code)]
pub fn reset_token_sent_to(mailer: &MemoryMailer, email: &str) -> String {
    let message = mailer
        .sent()
        .into_iter()
        .rev()
        .find(|m| m.to == email && m.body.contains("/reset/"))
        .unwrap_or_else(|| panic!("no reset link sent to {email}"));
    let (_, rest) = message.body.split_once("/reset/").unwrap();
    rest.chars().take_while(|c| c.is_ascii_hexdigit()).collect()
}
