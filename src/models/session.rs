// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Recording session aggregate and the finished-session handoff.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::GeoSample;

/// Metrics derived from a session's path and elapsed time.
///
/// Always recomputed from the full session, never patched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetrics {
    /// Cumulative geodesic length of the path (meters)
    pub distance: f64,
    /// Sum of positive elevation deltas (meters)
    pub elevation_gain: f64,
    /// Elapsed time while not paused (seconds)
    pub duration: u64,
    /// Speed reported by the latest sample (m/s)
    pub current_speed: f64,
    /// distance / duration (m/s)
    pub avg_speed: f64,
    /// Running maximum of reported speeds (m/s)
    pub max_speed: f64,
    /// Estimated energy burned (kcal)
    pub calories: f64,
}

/// The mutable aggregate owned by the recorder.
///
/// Callers only ever see it through `Recorder::session()`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingSession {
    pub is_recording: bool,
    pub is_paused: bool,
    pub start_time: Option<DateTime<Utc>>,
    pub path: Vec<GeoSample>,
    #[serde(flatten)]
    pub metrics: SessionMetrics,
}

impl RecordingSession {
    /// A fresh session that begins at `start_time`.
    pub fn started(start_time: DateTime<Utc>) -> Self {
        Self {
            is_recording: true,
            is_paused: false,
            start_time: Some(start_time),
            path: Vec::new(),
            metrics: SessionMetrics::default(),
        }
    }
}

/// The aggregate captured by `stop()`.
///
/// This is the only copy of the session once the recorder resets, so callers
/// keep it until the backend has accepted it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishedSession {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub path: Vec<GeoSample>,
    #[serde(flatten)]
    pub metrics: SessionMetrics,
}
