// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Location source that plays back a recorded track.
//!
//! Samples are read from a JSON array of `GeoSample`s and delivered through
//! the same subscription interface as a live device, honouring the minimum
//! time and distance intervals of the subscription.

use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::models::GeoSample;
use crate::services::calculations::distance_between;
use crate::services::location::{LocationError, LocationSource, PermissionStatus, TrackingOptions};
use crate::time_utils::ManualClock;

/// How fast recorded samples are delivered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReplayPace {
    /// As fast as the subscriber consumes them
    Instant,
    /// Recorded gaps divided by the given factor
    Scaled(f64),
}

/// Plays back a recorded track as a location source.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    samples: Vec<GeoSample>,
    permission: PermissionStatus,
    pace: ReplayPace,
    clock: Option<Arc<ManualClock>>,
}

impl ReplaySource {
    pub fn new(samples: Vec<GeoSample>) -> Self {
        Self {
            samples,
            permission: PermissionStatus::Granted,
            pace: ReplayPace::Instant,
            clock: None,
        }
    }

    /// Load samples from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ReplayError> {
        let json_data =
            fs::read_to_string(path.as_ref()).map_err(|e| ReplayError::IoError(e.to_string()))?;
        Self::load_from_json(&json_data)
    }

    /// Load samples from a JSON string.
    pub fn load_from_json(json_data: &str) -> Result<Self, ReplayError> {
        let mut samples: Vec<GeoSample> =
            serde_json::from_str(json_data).map_err(|e| ReplayError::ParseError(e.to_string()))?;

        // Playback order is time order
        samples.sort_by_key(|s| s.timestamp);

        tracing::info!(count = samples.len(), "Loaded replay samples");
        Ok(Self::new(samples))
    }

    pub fn with_pace(mut self, pace: ReplayPace) -> Self {
        self.pace = pace;
        self
    }

    pub fn with_permission(mut self, permission: PermissionStatus) -> Self {
        self.permission = permission;
        self
    }

    /// Advance `clock` to each sample's timestamp as it is delivered.
    ///
    /// The channel then holds a single sample, so time only moves once the
    /// previous sample has been taken by the subscriber.
    pub fn with_clock(mut self, clock: Arc<ManualClock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn set_permission(&mut self, permission: PermissionStatus) {
        self.permission = permission;
    }

    pub fn samples(&self) -> &[GeoSample] {
        &self.samples
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.samples.first().map(|s| s.timestamp)
    }
}

impl LocationSource for ReplaySource {
    async fn request_permission(&mut self) -> PermissionStatus {
        self.permission
    }

    async fn current_position(&mut self) -> Result<GeoSample, LocationError> {
        if self.permission == PermissionStatus::Denied {
            return Err(LocationError::PermissionDenied);
        }
        self.samples.first().copied().ok_or(LocationError::NoFix)
    }

    fn watch_position(
        &mut self,
        options: TrackingOptions,
    ) -> Result<mpsc::Receiver<GeoSample>, LocationError> {
        if self.permission == PermissionStatus::Denied {
            return Err(LocationError::PermissionDenied);
        }

        let capacity = if self.clock.is_some() {
            1
        } else {
            options.buffer.max(1)
        };
        let (tx, rx) = mpsc::channel(capacity);

        tokio::spawn(play(
            self.samples.clone(),
            options,
            self.pace,
            self.clock.clone(),
            tx,
        ));

        Ok(rx)
    }
}

/// Deliver samples until the track ends or the subscriber goes away.
async fn play(
    samples: Vec<GeoSample>,
    options: TrackingOptions,
    pace: ReplayPace,
    clock: Option<Arc<ManualClock>>,
    tx: mpsc::Sender<GeoSample>,
) {
    let mut last_sent: Option<GeoSample> = None;
    let mut sent = 0usize;

    for sample in samples {
        if let Some(prev) = last_sent {
            if !passes_intervals(&prev, &sample, &options) {
                continue;
            }
            let gap = (sample.timestamp - prev.timestamp)
                .to_std()
                .unwrap_or_default();
            if let Some(delay) = pace_delay(gap, pace) {
                tokio::time::sleep(delay).await;
            }
        }

        let Ok(permit) = tx.reserve().await else {
            tracing::debug!(sent, "Replay subscriber went away");
            return;
        };
        if let Some(clock) = &clock {
            clock.set(sample.timestamp);
        }
        permit.send(sample);

        last_sent = Some(sample);
        sent += 1;
    }

    tracing::debug!(sent, "Replay finished");
}

/// How long to wait before delivering a sample recorded `gap` after the last.
///
/// `None` for instant playback, and for factors whose scaled gap is not a
/// representable duration.
fn pace_delay(gap: Duration, pace: ReplayPace) -> Option<Duration> {
    let ReplayPace::Scaled(factor) = pace else {
        return None;
    };
    if !factor.is_finite() || factor <= 0.0 {
        return None;
    }

    match Duration::try_from_secs_f64(gap.as_secs_f64() / factor) {
        Ok(delay) => Some(delay),
        Err(e) => {
            tracing::debug!(factor, error = %e, "Replay delay out of range, not pacing");
            None
        }
    }
}

/// Whether `next` is far enough from `prev` in both time and space.
fn passes_intervals(prev: &GeoSample, next: &GeoSample, options: &TrackingOptions) -> bool {
    let gap = (next.timestamp - prev.timestamp)
        .to_std()
        .unwrap_or_default();
    if gap < options.time_interval {
        return false;
    }
    distance_between(prev.point(), next.point()) >= options.distance_interval_m
}

/// Errors from loading a replay track.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("Failed to read file: {0}")]
    IoError(String),

    #[error("Failed to parse samples: {0}")]
    ParseError(String),
}
