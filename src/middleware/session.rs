// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Server-side sessions.
//!
//! The browser holds only a signed random session id
//! (`{id}.{hex hmac-sha256(id)}`) in an HttpOnly cookie. The identity and the
//! pending flash messages live in [`SessionStore`], so logging out removes
//! access immediately.
//!
//! Sessions are created lazily: a visitor gets a cookie only once something
//! is stored for them (a login or a flash message).

use crate::error::AppError;
use crate::services::random;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::{Arc, Mutex};
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "yelpcamp_session";

/// Kind of one-shot notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Error,
}

/// A one-shot notice shown on the next rendered page only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

#[derive(Debug, Clone)]
struct SessionRecord {
    user_id: Option<String>,
    flash: Vec<Flash>,
    last_seen: DateTime<Utc>,
}

impl SessionRecord {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            user_id: None,
            flash: Vec::new(),
            last_seen: now,
        }
    }
}

/// Table of live sessions, shared by all requests.
pub struct SessionStore {
    records: DashMap<String, SessionRecord>,
    secret: Vec<u8>,
    ttl: Duration,
    secure_cookies: bool,
}

impl SessionStore {
    pub fn new(secret: &[u8], ttl_secs: i64, secure_cookies: bool) -> Self {
        Self {
            records: DashMap::new(),
            secret: secret.to_vec(),
            ttl: Duration::seconds(ttl_secs),
            secure_cookies,
        }
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop sessions idle for longer than the TTL. Returns how many were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let ttl = self.ttl;
        let mut removed = 0;
        self.records.retain(|_, r| {
            let live = now - r.last_seen < ttl;
            if !live {
                removed += 1;
            }
            live
        });
        removed
    }

    fn signature(&self, id: &str) -> Result<String, AppError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
        mac.update(id.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Cookie value for a session id.
    pub fn sign(&self, id: &str) -> Result<String, AppError> {
        Ok(format!("{}.{}", id, self.signature(id)?))
    }

    /// Recover the session id from a cookie value, if the signature is valid.
    pub fn verify(&self, cookie_value: &str) -> Option<String> {
        let (id, signature) = cookie_value.rsplit_once('.')?;
        let expected = self.signature(id).ok()?;
        if expected.as_bytes().ct_eq(signature.as_bytes()).into() {
            Some(id.to_string())
        } else {
            None
        }
    }

    /// Look up a live session and mark it as seen.
    fn touch(&self, id: &str, now: DateTime<Utc>) -> bool {
        let expired = match self.records.get_mut(id) {
            Some(mut record) => {
                if now - record.last_seen < self.ttl {
                    record.last_seen = now;
                    false
                } else {
                    true
                }
            }
            None => return false,
        };
        if expired {
            self.records.remove(id);
        }
        !expired
    }

    fn create(&self, record: SessionRecord) -> Result<String, AppError> {
        let id = URL_SAFE_NO_PAD.encode(random::random_bytes::<32>()?);
        self.records.insert(id.clone(), record);
        Ok(id)
    }

    fn cookie(&self, value: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookies)
            .max_age(time::Duration::seconds(self.ttl.num_seconds()))
            .build()
    }

    fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, ""))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookies)
            .max_age(time::Duration::ZERO)
            .build()
    }
}

/// Per-request handle onto the caller's session.
///
/// Exposes the session boundary used by the auth workflow: `login`,
/// `logout`, the current identity, and flash messages.
#[derive(Clone)]
pub struct Session {
    store: Arc<SessionStore>,
    id: Arc<Mutex<Option<String>>>,
}

impl Session {
    fn new(store: Arc<SessionStore>, id: Option<String>) -> Self {
        Self {
            store,
            id: Arc::new(Mutex::new(id)),
        }
    }

    fn current_id(&self) -> Option<String> {
        self.id.lock().ok().and_then(|id| id.clone())
    }

    fn set_id(&self, new_id: Option<String>) -> Result<(), AppError> {
        let mut id = self
            .id
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("session lock poisoned")))?;
        *id = new_id;
        Ok(())
    }

    /// Authenticated user id, if any.
    pub fn user_id(&self) -> Option<String> {
        let id = self.current_id()?;
        self.store.records.get(&id).and_then(|r| r.user_id.clone())
    }

    /// Bind the session to `user_id` under a fresh session id.
    ///
    /// Pending flash messages carry over; the previous id stops working.
    pub fn login(&self, user_id: &str) -> Result<(), AppError> {
        let mut record = SessionRecord::new(Utc::now());
        if let Some(old) = self.current_id() {
            if let Some((_, previous)) = self.store.records.remove(&old) {
                record.flash = previous.flash;
            }
        }
        record.user_id = Some(user_id.to_string());

        let id = self.store.create(record)?;
        self.set_id(Some(id))
    }

    /// End the session. The old id is forgotten server-side at once.
    pub fn logout(&self) -> Result<(), AppError> {
        if let Some(old) = self.current_id() {
            self.store.records.remove(&old);
        }
        self.set_id(None)
    }

    /// Queue a message for the next rendered page.
    pub fn flash(&self, kind: FlashKind, message: impl Into<String>) -> Result<(), AppError> {
        let flash = Flash {
            kind,
            message: message.into(),
        };

        if let Some(id) = self.current_id() {
            if let Some(mut record) = self.store.records.get_mut(&id) {
                record.flash.push(flash);
                return Ok(());
            }
        }

        let mut record = SessionRecord::new(Utc::now());
        record.flash.push(flash);
        let id = self.store.create(record)?;
        self.set_id(Some(id))
    }

    pub fn flash_success(&self, message: impl Into<String>) {
        if let Err(e) = self.flash(FlashKind::Success, message) {
            tracing::error!(error = %e, "Failed to store flash message");
        }
    }

    pub fn flash_error(&self, message: impl Into<String>) {
        if let Err(e) = self.flash(FlashKind::Error, message) {
            tracing::error!(error = %e, "Failed to store flash message");
        }
    }

    /// Remove and return all pending flash messages.
    pub fn take_flash(&self) -> Vec<Flash> {
        self.current_id()
            .and_then(|id| {
                self.store
                    .records
                    .get_mut(&id)
                    .map(|mut r| std::mem::take(&mut r.flash))
            })
            .unwrap_or_default()
    }
}

/// Middleware that attaches a [`Session`] to every request and keeps the
/// cookie in step with it.
pub async fn load_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let store = state.sessions.clone();
    let jar = CookieJar::from_headers(request.headers());
    let presented = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());

    let incoming = presented
        .as_deref()
        .and_then(|value| store.verify(value))
        .filter(|id| store.touch(id, Utc::now()));

    if presented.is_some() && incoming.is_none() {
        tracing::debug!("Ignoring unknown, expired or tampered session cookie");
    }

    let session = Session::new(store.clone(), incoming.clone());
    request.extensions_mut().insert(session.clone());

    let mut response = next.run(request).await;

    let outgoing = session.current_id();
    let cookie = match (&outgoing, presented.is_some()) {
        (Some(id), _) if outgoing != incoming || presented.is_none() => {
            match store.sign(id) {
                Ok(value) => Some(store.cookie(value)),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to sign session cookie");
                    None
                }
            }
        }
        (None, true) => Some(store.removal_cookie()),
        _ => None,
    };

    if let Some(cookie) = cookie {
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!(error = %e, "Invalid session cookie header"),
        }
    }

    response
}
