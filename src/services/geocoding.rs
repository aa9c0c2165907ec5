// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Address geocoding via the Google Geocoding API.

use crate::error::AppError;
use serde::Deserialize;

/// A resolved location.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub formatted_address: String,
    pub lat: f64,
    pub lng: f64,
}

/// Geocoding API client.
///
/// Without an API key no request is made: the trimmed input becomes the
/// formatted address and the coordinates are 0,0.
#[derive(Clone)]
pub struct GeocodingService {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GeocodingService {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "https://maps.googleapis.com/maps/api/geocode/json".to_string(),
            api_key,
        }
    }

    /// Resolve a free-form address to its best match.
    pub async fn geocode(&self, address: &str) -> Result<Location, AppError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(AppError::InvalidAddress);
        }

        let Some(api_key) = &self.api_key else {
            tracing::debug!(address, "No geocoder API key, using address as given");
            return Ok(Location {
                formatted_address: address.to_string(),
                lat: 0.0,
                lng: 0.0,
            });
        };

        let response = self
            .http
            .get(&self.base_url)
            .query(&[("address", address), ("key", api_key.as_str())])
            .send()
            .await
            .map_err(|e| AppError::Geocoding(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Geocoding(format!(
                "geocoding API returned {}",
                response.status()
            )));
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| AppError::Geocoding(format!("invalid geocoding response: {}", e)))?;

        first_location(body)
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

fn first_location(body: GeocodeResponse) -> Result<Location, AppError> {
    match body.status.as_str() {
        "OK" => body
            .results
            .into_iter()
            .next()
            .map(|r| Location {
                formatted_address: r.formatted_address,
                lat: r.geometry.location.lat,
                lng: r.geometry.location.lng,
            })
            .ok_or(AppError::InvalidAddress),
        "ZERO_RESULTS" => Err(AppError::InvalidAddress),
        other => Err(AppError::Geocoding(format!(
            "{}: {}",
            other,
            body.error_message.unwrap_or_default()
        ))),
    }
}
