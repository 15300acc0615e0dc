// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Recorder configuration loaded from environment variables.

use crate::services::location::TrackingOptions;
use std::env;
use std::time::Duration;

/// Recorder configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the activity backend
    pub api_base_url: String,
    /// Bearer token for the backend (None when running unauthenticated)
    pub api_token: Option<String>,
    /// Body weight used for calorie estimates
    pub body_weight_kg: f64,
    /// Minimum time between location samples
    pub location_interval: Duration,
    /// Minimum distance between location samples (meters)
    pub location_distance_m: f64,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            api_token: None,
            body_weight_kg: 70.0,
            location_interval: Duration::from_millis(1000),
            location_distance_m: 5.0,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();

        Ok(Self {
            api_base_url: env::var("TRAIL_API_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            api_token: env::var("TRAIL_API_TOKEN")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            body_weight_kg: parse_var("BODY_WEIGHT_KG")?.unwrap_or(defaults.body_weight_kg),
            location_interval: parse_var::<u64>("LOCATION_INTERVAL_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.location_interval),
            location_distance_m: parse_var("LOCATION_DISTANCE_M")?
                .unwrap_or(defaults.location_distance_m),
        })
    }

    /// Location subscription options derived from this config.
    pub fn tracking_options(&self) -> TrackingOptions {
        TrackingOptions {
            time_interval: self.location_interval,
            distance_interval_m: self.location_distance_m,
            ..TrackingOptions::default()
        }
    }
}

/// Parse an optional environment variable.
fn parse_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
