// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login and ownership enforcement on campgrounds, comments and profiles.

use axum::http::StatusCode;

mod common;
use common::{create_test_app, location, Browser, TestApp};

/// Register `username` and create one campground; returns the browser and its path.
async fn owner_with_campground(app: &TestApp, username: &str) -> (Browser, String) {
    let mut browser = Browser::new(app);
    browser
        .register(username, &format!("{username}@example.com"), "pw")
        .await;

    let response = browser
        .post(
            "/campgrounds",
            &[
                ("name", "Granite Hill"),
                ("image", "https://example.com/granite.jpg"),
                ("description", "Huge granite hill, no bathrooms."),
                ("price", "9.00"),
                ("location", "Yosemite National Park, CA"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let path = location(&response);
    assert!(path.starts_with("/campgrounds/"));
    (browser, path)
}

fn edit_fields(name: &str) -> Vec<(&str, &str)> {
    vec![
        ("name", name),
        ("image", "https://example.com/granite.jpg"),
        ("description", "Edited"),
        ("location", "Yosemite National Park, CA"),
    ]
}

#[tokio::test]
async fn test_anonymous_writes_redirect_to_login() {
    let app = create_test_app();
    let (_, path) = owner_with_campground(&app, "alice").await;
    let mut anonymous = Browser::new(&app);

    let edit = format!("{path}/edit");
    for uri in ["/campgrounds/new", edit.as_str()] {
        let response = anonymous.get(uri).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "GET {uri}");
        assert_eq!(location(&response), "/login");
    }

    let (to, body) = anonymous
        .post_and_follow(&format!("{path}/delete"), &[])
        .await;
    assert_eq!(to, "/login");
    assert!(body.contains("You need to be logged in to do that."));

    // Still there
    let body = anonymous.page(&path).await;
    assert!(body.contains("Granite Hill"));
}

#[tokio::test]
async fn test_create_and_show_campground() {
    let app = create_test_app();
    let (mut browser, path) = owner_with_campground(&app, "alice").await;

    let body = browser.page(&path).await;
    assert!(body.contains("Granite Hill"));
    assert!(body.contains("Yosemite National Park, CA"));
    assert!(body.contains("Submitted by"));
    assert!(body.contains(&format!("{path}/edit")));

    let index = browser.page("/campgrounds?search=granite").await;
    assert!(index.contains("Granite Hill"));
    let index = browser.page("/campgrounds?search=lake").await;
    assert!(index.contains("No campgrounds match that query, please try again."));
}

#[tokio::test]
async fn test_blank_location_rejected() {
    let app = create_test_app();
    let mut browser = Browser::new(&app);
    browser.register("alice", "alice@example.com", "pw").await;

    let (to, body) = browser
        .post_and_follow(
            "/campgrounds",
            &[
                ("name", "Nowhere"),
                ("image", "https://example.com/a.jpg"),
                ("description", "d"),
                ("location", "   "),
            ],
        )
        .await;
    assert_eq!(to, "/campgrounds/new");
    assert!(body.contains("Invalid address."));
    assert!(app.state.db.list_campgrounds().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_non_owner_cannot_edit_or_delete() {
    let app = create_test_app();
    let (_, path) = owner_with_campground(&app, "alice").await;

    let mut bob = Browser::new(&app);
    bob.register("bob", "bob@example.com", "pw").await;

    let (to, body) = bob.post_and_follow(&path, &edit_fields("Hijacked")).await;
    assert_eq!(to, path);
    assert!(body.contains("You don&#x27;t have permission to do that."));
    assert!(body.contains("Granite Hill"));
    assert!(!body.contains(&format!("{path}/edit")));

    let response = bob.send("DELETE", &path, None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), path);

    let response = bob.get(&format!("{path}/edit")).await;
    assert_eq!(location(&response), path);

    let id = path.trim_start_matches("/campgrounds/");
    let stored = app.state.db.get_campground(id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Granite Hill");
}

#[tokio::test]
async fn test_owner_can_edit_and_delete() {
    let app = create_test_app();
    let (mut alice, path) = owner_with_campground(&app, "alice").await;

    let fields = edit_fields("Granite Peak");
    let response = alice.send("PUT", &path, Some(fields.as_slice())).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), path);

    let body = alice.page(&path).await;
    assert!(body.contains("Successfully Updated Campground!"));
    assert!(body.contains("Granite Peak"));

    let (to, body) = alice
        .post_and_follow(&format!("{path}/delete"), &[])
        .await;
    assert_eq!(to, "/campgrounds");
    assert!(body.contains("Campground deleted successfully!"));
    assert!(app.state.db.list_campgrounds().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_bypasses_ownership() {
    let app = create_test_app();
    let (_, path) = owner_with_campground(&app, "alice").await;

    // admin@example.com is on the test allow-list
    let mut admin = Browser::new(&app);
    admin.register("root", "admin@example.com", "pw").await;

    let (to, _) = admin.post_and_follow(&path, &edit_fields("Moderated")).await;
    assert_eq!(to, path);

    let (to, _) = admin
        .post_and_follow(&format!("{path}/delete"), &[])
        .await;
    assert_eq!(to, "/campgrounds");
    assert!(app.state.db.list_campgrounds().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_comment_ownership() {
    let app = create_test_app();
    let (mut alice, path) = owner_with_campground(&app, "alice").await;

    let (to, body) = alice
        .post_and_follow(&format!("{path}/comments"), &[("text", "Lovely spot")])
        .await;
    assert_eq!(to, path);
    assert!(body.contains("Lovely spot"));

    let campground_id = path.trim_start_matches("/campgrounds/");
    let comments = app.state.db.list_comments(campground_id).await.unwrap();
    assert_eq!(comments.len(), 1);
    let comment_path = format!("{path}/comments/{}", comments[0].id);

    // Bob may comment but not edit Alice's comment
    let mut bob = Browser::new(&app);
    bob.register("bob", "bob@example.com", "pw").await;
    let (to, body) = bob
        .post_and_follow(&comment_path, &[("text", "Defaced")])
        .await;
    assert_eq!(to, path);
    assert!(body.contains("You don&#x27;t have permission to do that."));
    assert!(body.contains("Lovely spot"));

    let (to, _) = bob
        .post_and_follow(&format!("{comment_path}/delete"), &[])
        .await;
    assert_eq!(to, path);
    assert_eq!(app.state.db.list_comments(campground_id).await.unwrap().len(), 1);

    // Alice may edit and delete it
    let (_, body) = alice
        .post_and_follow(&comment_path, &[("text", "Lovely spot, bring water")])
        .await;
    assert!(body.contains("bring water"));

    let response = alice.send("DELETE", &comment_path, None).await;
    assert_eq!(location(&response), path);
    assert!(app.state.db.list_comments(campground_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deleting_campground_removes_comments() {
    let app = create_test_app();
    let (mut alice, path) = owner_with_campground(&app, "alice").await;
    alice
        .post_and_follow(&format!("{path}/comments"), &[("text", "First!")])
        .await;

    alice.post_and_follow(&format!("{path}/delete"), &[]).await;

    let campground_id = path.trim_start_matches("/campgrounds/");
    assert!(app.state.db.list_comments(campground_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_profile_edit_is_owner_only_and_cannot_set_admin() {
    let app = create_test_app();
    let mut alice = Browser::new(&app);
    alice.register("alice", "alice@example.com", "pw").await;
    let alice_user = app
        .state
        .db
        .find_user_by_username("alice")
        .await
        .unwrap()
        .unwrap();
    let profile = format!("/users/{}", alice_user.id);

    let (to, body) = alice
        .post_and_follow(
            &profile,
            &[
                ("avatar", "https://example.com/me.png"),
                ("bio", "Hiker"),
                ("is_admin", "true"),
                ("password_hash", "x"),
            ],
        )
        .await;
    assert_eq!(to, profile);
    assert!(body.contains("Successfully updated your profile!"));
    assert!(body.contains("Hiker"));

    let stored = app.state.db.get_user(&alice_user.id).await.unwrap().unwrap();
    assert!(!stored.is_admin);
    assert_eq!(stored.password_hash, alice_user.password_hash);
    assert_eq!(stored.avatar.as_deref(), Some("https://example.com/me.png"));

    let mut bob = Browser::new(&app);
    bob.register("bob", "bob@example.com", "pw").await;
    let (to, body) = bob.post_and_follow(&profile, &[("bio", "pwned")]).await;
    assert_eq!(to, profile);
    assert!(body.contains("You don&#x27;t have permission to do that."));

    let stored = app.state.db.get_user(&alice_user.id).await.unwrap().unwrap();
    assert_eq!(stored.bio, "Hiker");
}

#[tokio::test]
async fn test_missing_campground_redirects_with_flash() {
    let app = create_test_app();
    let mut browser = Browser::new(&app);

    let response = browser.get("/campgrounds/does-not-exist").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/campgrounds");

    let body = browser.page("/campgrounds").await;
    assert!(body.contains("Campground not found."));
}
