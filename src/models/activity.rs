// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity model for the backend API.

use chrono::{DateTime, Utc};
use geo::{Coord, LineString};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::{Validate, ValidationError};

use crate::models::{FinishedSession, GeoSample};
use crate::services::calculations;
use crate::time_utils::serialize_rfc3339;

/// How much of each recorded sample to send with an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathDetail {
    /// Coordinates plus elevation, timestamp and speed
    #[default]
    Full,
    /// Latitude/longitude pairs only
    CoordinatesOnly,
}

/// One point of a stored activity path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "bindings/")
)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPoint {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string | null"))]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

impl ActivityPoint {
    pub fn from_sample(sample: &GeoSample, detail: PathDetail) -> Self {
        match detail {
            PathDetail::Full => Self {
                latitude: sample.latitude,
                longitude: sample.longitude,
                elevation: sample.elevation,
                timestamp: Some(sample.timestamp),
                speed: sample.speed,
            },
            PathDetail::CoordinatesOnly => Self {
                latitude: sample.latitude,
                longitude: sample.longitude,
                elevation: None,
                timestamp: None,
                speed: None,
            },
        }
    }
}

/// Request body for creating an activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "bindings/")
)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_time_order"))]
pub struct ActivityCreate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trail_id: Option<String>,
    #[serde(serialize_with = "serialize_rfc3339")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub start_time: DateTime<Utc>,
    #[serde(serialize_with = "serialize_rfc3339")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub end_time: DateTime<Utc>,
    /// Meters
    #[validate(range(min = 0.0))]
    pub distance: f64,
    /// Seconds
    pub duration: u64,
    /// Meters
    #[validate(range(min = 0.0))]
    pub elevation_gain: f64,
    /// Meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0))]
    pub elevation_loss: Option<f64>,
    /// m/s
    #[validate(range(min = 0.0))]
    pub avg_speed: f64,
    /// m/s
    #[validate(range(min = 0.0))]
    pub max_speed: f64,
    #[validate(range(min = 0.0))]
    pub calories: f64,
    pub path: Vec<ActivityPoint>,
    /// GPX document for the same track, when one is attached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpx_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

fn validate_time_order(create: &ActivityCreate) -> Result<(), ValidationError> {
    if create.end_time < create.start_time {
        return Err(ValidationError::new("end_before_start"));
    }
    Ok(())
}

impl ActivityCreate {
    /// Build the request body for a finished recording.
    pub fn from_finished(finished: &FinishedSession, detail: PathDetail) -> Self {
        let profile = calculations::elevation_profile(&finished.path);
        let metrics = &finished.metrics;

        Self {
            trail_id: None,
            start_time: finished.start_time,
            end_time: finished.end_time,
            distance: metrics.distance,
            duration: metrics.duration,
            elevation_gain: metrics.elevation_gain,
            elevation_loss: Some(profile.loss),
            avg_speed: metrics.avg_speed,
            max_speed: metrics.max_speed,
            calories: metrics.calories,
            path: finished
                .path
                .iter()
                .map(|s| ActivityPoint::from_sample(s, detail))
                .collect(),
            gpx_data: None,
            notes: None,
        }
    }

    pub fn with_trail(mut self, trail_id: impl Into<String>) -> Self {
        self.trail_id = Some(trail_id.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_gpx_data(mut self, gpx: impl Into<String>) -> Self {
        self.gpx_data = Some(gpx.into());
        self
    }
}

/// Stored activity record, as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "bindings/")
)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    /// Backend-generated identifier
    pub id: String,
    #[serde(default)]
    pub trail_id: Option<String>,
    #[serde(default)]
    pub trail_name: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub start_time: DateTime<Utc>,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub end_time: DateTime<Utc>,
    pub distance: f64,
    pub duration: u64,
    pub elevation_gain: f64,
    #[serde(default)]
    pub elevation_loss: Option<f64>,
    pub avg_speed: f64,
    pub max_speed: f64,
    pub calories: f64,
    #[serde(default)]
    pub path: Vec<ActivityPoint>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ActivityRecord {
    /// The stored path as a line string (x = longitude, y = latitude).
    pub fn line_string(&self) -> LineString<f64> {
        self.path
            .iter()
            .map(|p| Coord {
                x: p.longitude,
                y: p.latitude,
            })
            .collect()
    }

    /// The stored path as an encoded polyline (precision 5).
    pub fn encoded_path(&self) -> Result<String, String> {
        polyline::encode_coordinates(self.line_string().coords().copied(), 5)
            .map_err(|e| e.to_string())
    }
}
