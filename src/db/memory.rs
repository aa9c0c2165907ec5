// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process document store for local development and tests.
//!
//! Mirrors the Firestore collections with concurrent maps. Contents are lost
//! when the process exits.

use crate::error::AppError;
use crate::models::{Campground, Comment, User};
use dashmap::DashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Collections {
    users: DashMap<String, User>,
    campgrounds: DashMap<String, Campground>,
    comments: DashMap<String, Comment>,
    /// Serialises the uniqueness check and insert of new users
    identity_lock: Mutex<()>,
}

/// In-memory database handle. Clones share the same collections.
#[derive(Clone, Default)]
pub struct MemoryDb {
    inner: Arc<Collections>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── User Operations ─────────────────────────────────────────

    pub fn get_user(&self, id: &str) -> Option<User> {
        self.inner.users.get(id).map(|u| u.clone())
    }

    pub fn find_user_by_username(&self, username: &str) -> Option<User> {
        self.find_user(|u| u.username == username)
    }

    pub fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.find_user(|u| u.email == email)
    }

    pub fn find_user_by_reset_token(&self, token: &str) -> Option<User> {
        self.find_user(|u| u.reset_password_token.as_deref() == Some(token))
    }

    fn find_user<F>(&self, pred: F) -> Option<User>
    where
        F: Fn(&User) -> bool,
    {
        self.inner
            .users
            .iter()
            .find(|entry| pred(entry.value()))
            .map(|entry| entry.value().clone())
    }

    /// Insert a new user, failing if the username or email is taken.
    pub fn create_user(&self, user: &User) -> Result<(), AppError> {
        let _guard = self
            .inner
            .identity_lock
            .lock()
            .map_err(|_| AppError::Database("identity lock poisoned".to_string()))?;

        let taken = self
            .inner
            .users
            .iter()
            .any(|entry| entry.username == user.username || entry.email == user.email);
        if taken {
            return Err(AppError::DuplicateIdentity);
        }

        self.inner.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    pub fn update_profile(&self, user: &User) -> Result<(), AppError> {
        match self.inner.users.get_mut(&user.id) {
            Some(mut existing) => {
                existing.avatar = user.avatar.clone();
                existing.bio = user.bio.clone();
                Ok(())
            }
            None => Err(AppError::NotFound("User".to_string())),
        }
    }

    pub fn update_user(&self, user: &User) -> Result<(), AppError> {
        match self.inner.users.get_mut(&user.id) {
            Some(mut existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(AppError::NotFound("User".to_string())),
        }
    }

    // ─── Campground Operations ───────────────────────────────────

    pub fn list_campgrounds(&self) -> Vec<Campground> {
        let mut all: Vec<Campground> = self
            .inner
            .campgrounds
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        all
    }

    pub fn list_campgrounds_by_author(&self, user_id: &str) -> Vec<Campground> {
        self.list_campgrounds()
            .into_iter()
            .filter(|c| c.author.id == user_id)
            .collect()
    }

    pub fn get_campground(&self, id: &str) -> Option<Campground> {
        self.inner.campgrounds.get(id).map(|c| c.clone())
    }

    pub fn upsert_campground(&self, campground: &Campground) {
        self.inner
            .campgrounds
            .insert(campground.id.clone(), campground.clone());
    }

    /// Remove a campground and every comment attached to it.
    pub fn delete_campground(&self, id: &str) -> usize {
        let mut removed = 0;
        self.inner.comments.retain(|_, c| {
            let keep = c.campground_id != id;
            if !keep {
                removed += 1;
            }
            keep
        });
        self.inner.campgrounds.remove(id);
        removed
    }

    // ─── Comment Operations ──────────────────────────────────────

    pub fn list_comments(&self, campground_id: &str) -> Vec<Comment> {
        let mut comments: Vec<Comment> = self
            .inner
            .comments
            .iter()
            .filter(|entry| entry.campground_id == campground_id)
            .map(|entry| entry.value().clone())
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        comments
    }

    pub fn get_comment(&self, id: &str) -> Option<Comment> {
        self.inner.comments.get(id).map(|c| c.clone())
    }

    pub fn upsert_comment(&self, comment: &Comment) {
        self.inner
            .comments
            .insert(comment.id.clone(), comment.clone());
    }

    pub fn delete_comment(&self, id: &str) {
        self.inner.comments.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::DEFAULT_BIO;
    use crate::models::Author;

    fn user(id: &str, username: &str, email: &str) -> User {
        User {
            id: id.to_string(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            avatar: None,
            bio: DEFAULT_BIO.to_string(),
            is_admin: false,
            reset_password_token: None,
            reset_password_expires: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let db = MemoryDb::new();
        db.create_user(&user("1", "alice", "a@example.com")).unwrap();

        let err = db
            .create_user(&user("2", "alice", "other@example.com"))
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateIdentity));
        assert!(db.get_user("2").is_none());
        assert_eq!(db.get_user("1").unwrap().email, "a@example.com");
    }

    #[test]
    fn test_profile_update_keeps_newer_password() {
        let db = MemoryDb::new();
        let stale = user("1", "alice", "a@example.com");
        db.create_user(&stale).unwrap();

        // A reset lands between the profile read and its write
        let mut reset = stale.clone();
        reset.password_hash = "new-hash".to_string();
        db.update_user(&reset).unwrap();

        let mut edited = stale;
        edited.bio = "Hiker".to_string();
        edited.avatar = Some("https://example.com/me.png".to_string());
        db.update_profile(&edited).unwrap();

        let stored = db.get_user("1").unwrap();
        assert_eq!(stored.password_hash, "new-hash");
        assert_eq!(stored.bio, "Hiker");
        assert_eq!(stored.avatar.as_deref(), Some("https://example.com/me.png"));
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let db = MemoryDb::new();
        db.create_user(&user("1", "alice", "a@example.com")).unwrap();

        let err = db.create_user(&user("2", "bob", "a@example.com")).unwrap_err();
        assert!(matches!(err, AppError::DuplicateIdentity));
    }

    #[test]
    fn test_concurrent_registration_single_winner() {
        let db = MemoryDb::new();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let db = db.clone();
                std::thread::spawn(move || {
                    db.create_user(&user(&i.to_string(), "racer", &format!("{i}@example.com")))
                        .is_ok()
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn test_delete_campground_removes_comments() {
        let db = MemoryDb::new();
        let author = Author {
            id: "1".to_string(),
            username: "alice".to_string(),
        };
        db.upsert_campground(&Campground {
            id: "c1".to_string(),
            name: "Granite Hill".to_string(),
            image: "https://example.com/a.jpg".to_string(),
            description: "Rocky".to_string(),
            price: None,
            location: "Somewhere".to_string(),
            lat: 0.0,
            lng: 0.0,
            author: author.clone(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
        });
        db.upsert_comment(&Comment {
            id: "m1".to_string(),
            campground_id: "c1".to_string(),
            text: "Nice".to_string(),
            author,
            created_at: "2026-01-01T00:00:01Z".to_string(),
        });

        assert_eq!(db.delete_campground("c1"), 1);
        assert!(db.get_campground("c1").is_none());
        assert!(db.get_comment("m1").is_none());
    }

    #[test]
    fn test_delete_campground_count_ignores_concurrent_comments() {
        let db = MemoryDb::new();
        let author = Author {
            id: "1".to_string(),
            username: "alice".to_string(),
        };
        let comment = |id: String, campground_id: &str| Comment {
            id,
            campground_id: campground_id.to_string(),
            text: "Nice".to_string(),
            author: author.clone(),
            created_at: "2026-01-01T00:00:01Z".to_string(),
        };
        for i in 0..50 {
            db.upsert_comment(&comment(format!("doomed-{i}"), "c1"));
        }

        let writer = {
            let db = db.clone();
            let comments: Vec<_> = (0..20_000)
                .map(|i| comment(format!("other-{i}"), "c2"))
                .collect();
            std::thread::spawn(move || {
                for c in &comments {
                    db.upsert_comment(c);
                }
            })
        };

        let removed = db.delete_campground("c1");
        writer.join().unwrap();

        assert_eq!(removed, 50);
        assert_eq!(db.list_comments("c2").len(), 20_000);
    }
}
