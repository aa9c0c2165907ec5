// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod credentials;
pub mod geocoding;
pub mod mail;
pub mod ownership;
pub mod password_reset;
pub mod random;

pub use credentials::CredentialStore;
pub use geocoding::{GeocodingService, Location};
pub use mail::{LogMailer, MailMessage, Mailer, MemoryMailer, SmtpMailer};
pub use ownership::{authorize, may_modify, Identity, Owned};
pub use password_reset::PasswordResetService;
