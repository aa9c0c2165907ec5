// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Campground listing and comment models.

use super::user::Author;
use serde::{Deserialize, Serialize};

/// Stored campground listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Campground {
    /// Random identifier (also used as document ID)
    pub id: String,
    pub name: String,
    /// Image URL
    pub image: String,
    pub description: String,
    /// Free-form price text, e.g. "12.50"
    #[serde(default)]
    pub price: Option<String>,
    /// Formatted address returned by the geocoder
    pub location: String,
    pub lat: f64,
    pub lng: f64,
    pub author: Author,
    pub created_at: String,
}

/// Comment on a campground.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: String,
    pub campground_id: String,
    pub text: String,
    pub author: Author,
    pub created_at: String,
}
