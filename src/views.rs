// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Server-rendered HTML pages.
//!
//! Pages are plain formatted strings. Every value that came from a user or
//! the store goes through [`escape`] before it is written into markup.

use crate::middleware::session::{Flash, FlashKind};
use crate::models::{Campground, Comment, User};
use crate::services::{may_modify, Identity};
use std::fmt::Write as _;

/// Per-request data shared by every page: who is looking and what to tell them.
#[derive(Debug, Default)]
pub struct PageContext {
    pub user: Option<Identity>,
    pub flash: Vec<Flash>,
}

impl PageContext {
    fn user(&self) -> Option<&Identity> {
        self.user.as_ref()
    }
}

/// Escape text for use in element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn nav(user: Option<&Identity>) -> String {
    let right = match user {
        Some(u) => format!(
            r#"<li><a href="/users/{id}">Signed in as {name}</a></li>
      <li><a href="/logout">Logout</a></li>"#,
            id = escape(&u.user_id),
            name = escape(&u.username),
        ),
        None => r#"<li><a href="/login">Login</a></li>
      <li><a href="/register">Sign Up</a></li>"#
            .to_string(),
    };
    format!(
        r#"<nav>
    <a class="brand" href="/">YelpCamp</a>
    <ul>
      <li><a href="/campgrounds">Home</a></li>
    </ul>
    <ul class="right">
      {right}
    </ul>
  </nav>"#
    )
}

fn flash_messages(flash: &[Flash]) -> String {
    let mut out = String::new();
    for f in flash {
        let class = match f.kind {
            FlashKind::Success => "alert alert-success",
            FlashKind::Error => "alert alert-danger",
        };
        let _ = write!(
            out,
            r#"<div class="{class}" role="alert">{}</div>"#,
            escape(&f.message)
        );
    }
    out
}

fn layout(ctx: &PageContext, title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title} | YelpCamp</title>
</head>
<body>
  {nav}
  <main>
    {flash}
    {body}
  </main>
</body>
</html>
"#,
        title = escape(title),
        nav = nav(ctx.user()),
        flash = flash_messages(&ctx.flash),
    )
}

/// Bare page for errors that have no page to redirect back to.
pub fn error_page(message: &str) -> String {
    layout(
        &PageContext::default(),
        "Error",
        &format!(
            r#"<h1>Something went wrong</h1>
    <p>{}</p>
    <a href="/campgrounds">Back to campgrounds</a>"#,
            escape(message)
        ),
    )
}

pub fn landing(ctx: &PageContext) -> String {
    layout(
        ctx,
        "Welcome",
        r#"<h1>Welcome to YelpCamp!</h1>
    <a href="/campgrounds">View all campgrounds</a>"#,
    )
}

// ─── Authentication ──────────────────────────────────────────

pub fn register(ctx: &PageContext) -> String {
    layout(
        ctx,
        "Sign Up",
        r#"<h1>Sign Up</h1>
    <form action="/register" method="POST">
      <input type="text" name="username" placeholder="username" required>
      <input type="email" name="email" placeholder="email" required>
      <input type="password" name="password" placeholder="password" required>
      <input type="url" name="avatar" placeholder="avatar url">
      <button>Sign Up!</button>
    </form>"#,
    )
}

pub fn login(ctx: &PageContext) -> String {
    layout(
        ctx,
        "Login",
        r#"<h1>Login</h1>
    <form action="/login" method="POST">
      <input type="text" name="username" placeholder="username" required>
      <input type="password" name="password" placeholder="password" required>
      <button>Login!</button>
    </form>
    <a href="/forgot">Forgot password?</a>"#,
    )
}

pub fn forgot(ctx: &PageContext) -> String {
    layout(
        ctx,
        "Forgot Password",
        r#"<h1>Forgot Password</h1>
    <form action="/forgot" method="POST">
      <input type="email" name="email" placeholder="email" required autofocus>
      <button>Reset Password</button>
    </form>"#,
    )
}

pub fn reset(ctx: &PageContext, token: &str) -> String {
    layout(
        ctx,
        "Reset Password",
        &format!(
            r#"<h1>Reset Password</h1>
    <form action="/reset/{token}" method="POST">
      <input type="password" name="password" placeholder="new password" required autofocus>
      <input type="password" name="confirm" placeholder="confirm password" required>
      <button>Update Password</button>
    </form>"#,
            token = escape(token),
        ),
    )
}

// ─── Campgrounds ─────────────────────────────────────────────

pub fn campgrounds_index(
    ctx: &PageContext,
    campgrounds: &[Campground],
    search: Option<&str>,
) -> String {
    let mut cards = String::new();
    for c in campgrounds {
        let _ = write!(
            cards,
            r#"
      <div class="card">
        <img src="{image}" alt="{name}">
        <h4>{name}</h4>
        <a href="/campgrounds/{id}">More Info</a>
      </div>"#,
            image = escape(&c.image),
            name = escape(&c.name),
            id = escape(&c.id),
        );
    }

    let new_link = if ctx.user().is_some() {
        r#"<a href="/campgrounds/new">Add New Campground</a>"#
    } else {
        ""
    };

    layout(
        ctx,
        "Campgrounds",
        &format!(
            r#"<header>
      <h1>Welcome To YelpCamp!</h1>
      {new_link}
      <form action="/campgrounds" method="GET">
        <input type="text" name="search" placeholder="Campground search..." value="{search}">
        <button>Search</button>
      </form>
    </header>
    <div class="cards">{cards}
    </div>"#,
            search = escape(search.unwrap_or_default()),
        ),
    )
}

fn campground_fields(c: Option<&Campground>) -> String {
    let (name, price, image, description, location) = match c {
        Some(c) => (
            escape(&c.name),
            escape(c.price.as_deref().unwrap_or_default()),
            escape(&c.image),
            escape(&c.description),
            escape(&c.location),
        ),
        None => Default::default(),
    };
    format!(
        r#"<input type="text" name="name" placeholder="name" value="{name}" required>
      <input type="text" name="price" placeholder="price" value="{price}">
      <input type="url" name="image" placeholder="image url" value="{image}" required>
      <textarea name="description" placeholder="description" required>{description}</textarea>
      <input type="text" name="location" placeholder="Yosemite National Park, CA" value="{location}" required>"#
    )
}

pub fn campground_new(ctx: &PageContext) -> String {
    layout(
        ctx,
        "New Campground",
        &format!(
            r#"<h1>Create a New Campground</h1>
    <form action="/campgrounds" method="POST">
      {fields}
      <button>Submit!</button>
    </form>
    <a href="/campgrounds">Go Back</a>"#,
            fields = campground_fields(None),
        ),
    )
}

pub fn campground_edit(ctx: &PageContext, campground: &Campground) -> String {
    layout(
        ctx,
        "Edit Campground",
        &format!(
            r#"<h1>Edit {name}</h1>
    <form action="/campgrounds/{id}" method="POST">
      {fields}
      <button>Submit!</button>
    </form>
    <a href="/campgrounds/{id}">Go Back</a>"#,
            name = escape(&campground.name),
            id = escape(&campground.id),
            fields = campground_fields(Some(campground)),
        ),
    )
}

pub fn campground_show(ctx: &PageContext, campground: &Campground, comments: &[Comment]) -> String {
    let id = escape(&campground.id);

    let controls = if may_modify(ctx.user(), campground) {
        format!(
            r#"<a href="/campgrounds/{id}/edit">Edit</a>
      <form action="/campgrounds/{id}/delete" method="POST">
        <button>Delete</button>
      </form>"#
        )
    } else {
        String::new()
    };

    let mut comment_list = String::new();
    for comment in comments {
        let comment_controls = if may_modify(ctx.user(), comment) {
            format!(
                r#"
          <a href="/campgrounds/{id}/comments/{cid}/edit">Edit</a>
          <form action="/campgrounds/{id}/comments/{cid}/delete" method="POST">
            <button>Delete</button>
          </form>"#,
                cid = escape(&comment.id),
            )
        } else {
            String::new()
        };
        let _ = write!(
            comment_list,
            r#"
      <div class="comment">
        <strong><a href="/users/{author_id}">{author}</a></strong>
        <p>{text}</p>{comment_controls}
      </div>"#,
            author_id = escape(&comment.author.id),
            author = escape(&comment.author.username),
            text = escape(&comment.text),
        );
    }

    let price = campground
        .price
        .as_deref()
        .map(|p| format!(r#"<h4 class="price">${}/night</h4>"#, escape(p)))
        .unwrap_or_default();

    layout(
        ctx,
        &campground.name,
        &format!(
            r#"<article class="campground">
      <img src="{image}" alt="{name}">
      {price}
      <h1>{name}</h1>
      <p>{description}</p>
      <p class="location" data-lat="{lat}" data-lng="{lng}">{location}</p>
      <p><em>Submitted by <a href="/users/{author_id}">{author}</a></em></p>
      {controls}
    </article>
    <section class="comments">
      <a href="/campgrounds/{id}/comments/new">Add New Comment</a>{comment_list}
    </section>"#,
            image = escape(&campground.image),
            name = escape(&campground.name),
            description = escape(&campground.description),
            lat = campground.lat,
            lng = campground.lng,
            location = escape(&campground.location),
            author_id = escape(&campground.author.id),
            author = escape(&campground.author.username),
        ),
    )
}

// ─── Comments ────────────────────────────────────────────────

pub fn comment_new(ctx: &PageContext, campground: &Campground) -> String {
    layout(
        ctx,
        "New Comment",
        &format!(
            r#"<h1>Add New Comment to {name}</h1>
    <form action="/campgrounds/{id}/comments" method="POST">
      <textarea name="text" placeholder="text" required></textarea>
      <button>Submit!</button>
    </form>
    <a href="/campgrounds/{id}">Go Back</a>"#,
            name = escape(&campground.name),
            id = escape(&campground.id),
        ),
    )
}

pub fn comment_edit(ctx: &PageContext, campground_id: &str, comment: &Comment) -> String {
    layout(
        ctx,
        "Edit Comment",
        &format!(
            r#"<h1>Edit Comment</h1>
    <form action="/campgrounds/{id}/comments/{cid}" method="POST">
      <textarea name="text" required>{text}</textarea>
      <button>Submit!</button>
    </form>
    <a href="/campgrounds/{id}">Go Back</a>"#,
            id = escape(campground_id),
            cid = escape(&comment.id),
            text = escape(&comment.text),
        ),
    )
}

// ─── Profiles ────────────────────────────────────────────────

pub fn user_show(ctx: &PageContext, user: &User, campgrounds: &[Campground]) -> String {
    let mut list = String::new();
    for c in campgrounds {
        let _ = write!(
            list,
            r#"
        <li><a href="/campgrounds/{}">{}</a></li>"#,
            escape(&c.id),
            escape(&c.name)
        );
    }

    let avatar = user
        .avatar
        .as_deref()
        .map(|a| format!(r#"<img class="avatar" src="{}" alt="avatar">"#, escape(a)))
        .unwrap_or_default();

    let edit = if may_modify(ctx.user(), user) {
        format!(r#"<a href="/users/{}/edit">Edit Profile</a>"#, escape(&user.id))
    } else {
        String::new()
    };

    layout(
        ctx,
        &user.username,
        &format!(
            r#"<section class="profile">
      {avatar}
      <h1>{username}</h1>
      <p>{bio}</p>
      <a href="mailto:{email}">{email}</a>
      {edit}
    </section>
    <section>
      <h3>{username}'s campgrounds:</h3>
      <ul>{list}
      </ul>
    </section>"#,
            username = escape(&user.username),
            bio = escape(&user.bio),
            email = escape(&user.email),
        ),
    )
}

pub fn user_edit(ctx: &PageContext, user: &User) -> String {
    layout(
        ctx,
        "Edit Profile",
        &format!(
            r#"<h1>Edit {username}</h1>
    <form action="/users/{id}" method="POST">
      <input type="url" name="avatar" placeholder="avatar url" value="{avatar}">
      <textarea name="bio">{bio}</textarea>
      <button>Update</button>
    </form>
    <a href="/users/{id}">Go Back</a>"#,
            username = escape(&user.username),
            id = escape(&user.id),
            avatar = escape(user.avatar.as_deref().unwrap_or_default()),
            bio = escape(&user.bio),
        ),
    )
}
