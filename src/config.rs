// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup and handed to the collaborators that
//! need it; nothing reads the environment while serving a request.

use std::env;

/// Default idle lifetime of a session (two weeks).
const DEFAULT_SESSION_TTL_SECS: i64 = 14 * 24 * 60 * 60;
const MAX_SESSION_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Externally visible base URL, used to build password reset links
    pub public_url: String,
    /// GCP project ID. When unset the in-process store is used.
    pub gcp_project_id: Option<String>,
    /// Server port
    pub port: u16,
    /// Idle lifetime of a session in seconds
    pub session_ttl_secs: i64,
    /// Emails that receive the administrator flag at registration (lower-cased)
    pub admin_emails: Vec<String>,
    /// Answer `/forgot` identically whether or not the email has an account
    pub mask_unknown_reset_email: bool,
    /// Sender address for outbound mail
    pub mail_from: String,
    /// SMTP relay; mail is only logged when this is unset
    pub smtp: Option<SmtpConfig>,

    // --- Secrets ---
    /// HMAC key for session cookies (raw bytes)
    pub session_secret: Vec<u8>,
    /// Google geocoding API key; addresses are not resolved when unset
    pub geocoder_api_key: Option<String>,
}

/// SMTP relay settings.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl Config {
    /// Config for tests: in-process store, logging mailer, no geocoding key.
    pub fn test_default() -> Self {
        Self {
            public_url: "http://localhost:3000".to_string(),
            gcp_project_id: None,
            port: 3000,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            admin_emails: vec!["admin@example.com".to_string()],
            mask_unknown_reset_email: false,
            mail_from: "yelpcamp@example.com".to_string(),
            smtp: None,
            session_secret: b"test_session_secret_32_bytes_min".to_vec(),
            geocoder_api_key: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honoured for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let session_ttl_secs = match env::var("SESSION_TTL_SECS") {
            Ok(v) => parse_session_ttl(&v).ok_or(ConfigError::Invalid("SESSION_TTL_SECS"))?,
            Err(_) => DEFAULT_SESSION_TTL_SECS,
        };

        let session_secret = env::var("SESSION_SECRET")
            .map_err(|_| ConfigError::Missing("SESSION_SECRET"))?
            .into_bytes();
        if session_secret.len() < 32 {
            return Err(ConfigError::Invalid("SESSION_SECRET"));
        }

        let smtp = match env::var("SMTP_HOST") {
            Ok(host) if !host.trim().is_empty() => Some(SmtpConfig {
                host: host.trim().to_string(),
                port: env::var("SMTP_PORT")
                    .unwrap_or_else(|_| "465".to_string())
                    .parse()
                    .map_err(|_| ConfigError::Invalid("SMTP_PORT"))?,
                username: env::var("SMTP_USERNAME")
                    .map_err(|_| ConfigError::Missing("SMTP_USERNAME"))?,
                password: env::var("SMTP_PASSWORD")
                    .map(|v| v.trim().to_string())
                    .map_err(|_| ConfigError::Missing("SMTP_PASSWORD"))?,
            }),
            _ => None,
        };

        let mail_from = match env::var("MAIL_FROM") {
            Ok(from) => from,
            Err(_) => smtp
                .as_ref()
                .map(|s| s.username.clone())
                .ok_or(ConfigError::Missing("MAIL_FROM"))?,
        };

        Ok(Self {
            public_url: env::var("PUBLIC_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| format!("http://localhost:{}", port)),
            gcp_project_id: non_empty_var("GCP_PROJECT_ID"),
            port,
            session_ttl_secs,
            admin_emails: parse_admin_emails(&env::var("ADMIN_EMAILS").unwrap_or_default()),
            mask_unknown_reset_email: parse_flag(
                &env::var("MASK_UNKNOWN_RESET_EMAIL").unwrap_or_default(),
            ),
            mail_from,
            smtp,
            session_secret,
            geocoder_api_key: non_empty_var("GEOCODER_API_KEY"),
        })
    }

    /// Whether an email address is on the administrator allow-list.
    pub fn is_admin_email(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.admin_emails.iter().any(|e| *e == email)
    }

    /// Whether session cookies should carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.public_url.starts_with("https://")
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_admin_emails(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Session TTL in seconds: positive and no longer than a year.
fn parse_session_ttl(raw: &str) -> Option<i64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|secs| (1..=MAX_SESSION_TTL_SECS).contains(secs))
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("SESSION_SECRET", "test_session_secret_32_bytes_min");
        env::set_var("MAIL_FROM", "camp@example.com");
        env::set_var("ADMIN_EMAILS", " Root@Example.com ,ops@example.com,");
        env::remove_var("SMTP_HOST");
        env::remove_var("PORT");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.port, 3000);
        assert_eq!(config.mail_from, "camp@example.com");
        assert!(config.smtp.is_none());
        assert!(config.is_admin_email("root@example.com"));
        assert!(config.is_admin_email("OPS@example.com "));
        assert!(!config.is_admin_email("someone@example.com"));
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" 1 "));
        assert!(!parse_flag(""));
        assert!(!parse_flag("no"));
    }

    #[test]
    fn test_parse_session_ttl() {
        assert_eq!(parse_session_ttl(" 3600 "), Some(3600));
        assert_eq!(parse_session_ttl("0"), None);
        assert_eq!(parse_session_ttl("-60"), None);
        assert_eq!(parse_session_ttl("9223372036854775807"), None);
        assert_eq!(parse_session_ttl("two weeks"), None);
    }

    #[test]
    fn test_secure_cookies_follow_public_url() {
        let mut config = Config::test_default();
        assert!(!config.secure_cookies());
        config.public_url = "https://yelpcamp.example.com".to_string();
        assert!(config.secure_cookies());
    }
}
