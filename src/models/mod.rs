// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod campground;
pub mod user;

pub use campground::{Campground, Comment};
pub use user::{Author, NewUser, User};
