// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ownership guard for mutating campgrounds, comments and profiles.

use crate::error::AppError;
use crate::models::{Author, Campground, Comment, User};

/// Identity bound to the caller's session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub username: String,
    pub is_admin: bool,
}

impl Identity {
    /// Owner reference for content created by this identity.
    pub fn author(&self) -> Author {
        Author {
            id: self.user_id.clone(),
            username: self.username.clone(),
        }
    }
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            username: user.username.clone(),
            is_admin: user.is_admin,
        }
    }
}

/// A resource with a recorded owner.
pub trait Owned {
    fn owner_id(&self) -> &str;
}

impl Owned for Campground {
    fn owner_id(&self) -> &str {
        &self.author.id
    }
}

impl Owned for Comment {
    fn owner_id(&self) -> &str {
        &self.author.id
    }
}

/// A user record is owned by that user.
impl Owned for User {
    fn owner_id(&self) -> &str {
        &self.id
    }
}

/// Same decision as [`authorize`] without logging. Used to hide edit controls.
pub fn may_modify<R: Owned + ?Sized>(caller: Option<&Identity>, resource: &R) -> bool {
    caller.is_some_and(|c| c.user_id == resource.owner_id() || c.is_admin)
}

/// Decide whether `caller` may edit or delete `resource`.
///
/// Anonymous callers are always refused. Administrators may act on any
/// resource; everyone else only on their own.
pub fn authorize<R: Owned + ?Sized>(caller: Option<&Identity>, resource: &R) -> Result<(), AppError> {
    let caller = caller.ok_or(AppError::NotAuthenticated)?;

    if may_modify(Some(caller), resource) {
        return Ok(());
    }

    tracing::warn!(
        user_id = %caller.user_id,
        owner_id = %resource.owner_id(),
        "Ownership check refused"
    );
    Err(AppError::NotOwner)
}
