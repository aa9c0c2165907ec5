// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running
//! (`FIRESTORE_EMULATOR_HOST` set). They are skipped otherwise.

use chrono::{Duration, Utc};
use yelpcamp::error::AppError;
use yelpcamp::models::{Author, Campground, Comment, User};

mod common;
use common::test_db;

/// Generate a unique suffix for test isolation.
fn unique_suffix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos()
        .to_string()
}

/// Helper to create a basic test user
fn test_user(suffix: &str) -> User {
    User {
        id: format!("user-{suffix}"),
        username: format!("camper-{suffix}"),
        email: format!("camper-{suffix}@example.com"),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        avatar: None,
        bio: "No bio yet...".to_string(),
        is_admin: false,
        reset_password_token: None,
        reset_password_expires: None,
        created_at: Utc::now().to_rfc3339(),
    }
}

fn test_campground(id: &str, author: &User) -> Campground {
    Campground {
        id: id.to_string(),
        name: "Salmon Creek".to_string(),
        image: "https://example.com/salmon.jpg".to_string(),
        description: "Quiet creekside spot".to_string(),
        price: Some("12.00".to_string()),
        location: "Big Sur, CA".to_string(),
        lat: 36.2,
        lng: -121.7,
        author: Author {
            id: author.id.clone(),
            username: author.username.clone(),
        },
        created_at: Utc::now().to_rfc3339(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// USER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_create_and_find_user() {
    require_emulator!();

    let db = test_db().await;
    let user = test_user(&unique_suffix());

    assert!(db.get_user(&user.id).await.unwrap().is_none());
    db.create_user(&user).await.unwrap();

    let by_id = db.get_user(&user.id).await.unwrap().unwrap();
    assert_eq!(by_id, user);

    let by_name = db.find_user_by_username(&user.username).await.unwrap().unwrap();
    assert_eq!(by_name.id, user.id);

    let by_email = db.find_user_by_email(&user.email).await.unwrap().unwrap();
    assert_eq!(by_email.id, user.id);
}

#[tokio::test]
async fn test_duplicate_identity_writes_nothing() {
    require_emulator!();

    let db = test_db().await;
    let suffix = unique_suffix();
    let first = test_user(&suffix);
    db.create_user(&first).await.unwrap();

    // Same username, different id and email
    let mut second = test_user(&suffix);
    second.id = format!("other-{suffix}");
    second.email = format!("other-{suffix}@example.com");

    let err = db.create_user(&second).await.unwrap_err();
    assert!(matches!(err, AppError::DuplicateIdentity));
    assert!(db.get_user(&second.id).await.unwrap().is_none());
    assert!(db
        .find_user_by_email(&second.email)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_reset_token_lookup() {
    require_emulator!();

    let db = test_db().await;
    let mut user = test_user(&unique_suffix());
    db.create_user(&user).await.unwrap();

    let token = format!("{:0>40}", unique_suffix());
    user.reset_password_token = Some(token.clone());
    user.reset_password_expires = Some(Utc::now() + Duration::hours(1));
    db.update_user(&user).await.unwrap();

    let found = db.find_user_by_reset_token(&token).await.unwrap().unwrap();
    assert_eq!(found.id, user.id);

    user.clear_reset_token();
    db.update_user(&user).await.unwrap();
    assert!(db.find_user_by_reset_token(&token).await.unwrap().is_none());
}

#[tokio::test]
async fn test_profile_update_writes_only_profile_fields() {
    require_emulator!();

    let db = test_db().await;
    let user = test_user(&unique_suffix());
    db.create_user(&user).await.unwrap();

    let mut reset = user.clone();
    reset.password_hash = "$argon2id$v=19$m=19456,t=2,p=1$bmV3$bmV3".to_string();
    db.update_user(&reset).await.unwrap();

    let mut edited = user.clone();
    edited.bio = "Hiker".to_string();
    db.update_profile(&edited).await.unwrap();

    let stored = db.get_user(&user.id).await.unwrap().unwrap();
    assert_eq!(stored.bio, "Hiker");
    assert_eq!(stored.password_hash, reset.password_hash);
}

// ═══════════════════════════════════════════════════════════════════════════
// CAMPGROUND / COMMENT TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_campground_delete_removes_comments() {
    require_emulator!();

    let db = test_db().await;
    let suffix = unique_suffix();
    let author = test_user(&suffix);
    let campground = test_campground(&format!("camp-{suffix}"), &author);
    db.upsert_campground(&campground).await.unwrap();

    for i in 0..3 {
        db.upsert_comment(&Comment {
            id: format!("comment-{suffix}-{i}"),
            campground_id: campground.id.clone(),
            text: format!("comment {i}"),
            author: Author {
                id: author.id.clone(),
                username: author.username.clone(),
            },
            created_at: Utc::now().to_rfc3339(),
        })
        .await
        .unwrap();
    }

    assert_eq!(db.list_comments(&campground.id).await.unwrap().len(), 3);
    let by_author = db.list_campgrounds_by_author(&author.id).await.unwrap();
    assert_eq!(by_author.len(), 1);

    let removed = db.delete_campground(&campground.id).await.unwrap();
    assert_eq!(removed, 3);
    assert!(db.get_campground(&campground.id).await.unwrap().is_none());
    assert!(db.list_comments(&campground.id).await.unwrap().is_empty());
}
