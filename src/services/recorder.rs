// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity recording state machine.
//!
//! Lifecycle: `Idle -> Recording <-> Paused -> Idle`.
//!
//! The recorder is the only writer of its [`RecordingSession`]. Every update
//! recomputes the derived metrics from the full path and the clock, so a
//! sample and a timer tick can arrive in either order without leaving the
//! metrics inconsistent. The location subscription and the 1 Hz ticker are
//! both owned here and dropped by `stop()` before the session is reset.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior};

use crate::error::{AppError, Result};
use crate::models::{FinishedSession, GeoSample, RecordingSession};
use crate::services::calculations::{
    average_speed, elevation_gain, estimated_calories, present_elevations, total_path_distance,
    DEFAULT_WEIGHT_KG,
};
use crate::services::location::{LocationService, LocationSource, PermissionStatus, Subscription};
use crate::time_utils::{format_utc_rfc3339, whole_seconds, Clock, SystemClock};

/// Interval between duration refreshes.
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Shortest tick interval accepted; tokio rejects a zero period.
const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Lifecycle state of the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecorderState {
    Idle,
    Recording,
    Paused,
}

impl fmt::Display for RecorderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecorderState::Idle => write!(f, "idle"),
            RecorderState::Recording => write!(f, "recording"),
            RecorderState::Paused => write!(f, "paused"),
        }
    }
}

/// What `next_event()` handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderEvent {
    /// A sample arrived; `appended` is false if it was discarded while paused
    Sample { appended: bool },
    /// The timer fired; carries the refreshed duration in seconds
    Tick { duration: u64 },
    /// The location stream ended. There is no automatic resubscribe.
    SourceClosed,
}

enum Wake {
    Sample(Option<GeoSample>),
    Tick,
}

/// Records one activity at a time from a location source.
pub struct Recorder<S, C = SystemClock> {
    location: LocationService<S>,
    clock: C,
    weight_kg: f64,
    tick_interval: Duration,
    session: RecordingSession,
    /// When the current pause began
    paused_at: Option<DateTime<Utc>>,
    /// Time spent in completed pauses
    paused_total: chrono::Duration,
    subscription: Option<Subscription>,
    ticker: Option<Interval>,
}

impl<S: LocationSource> Recorder<S, SystemClock> {
    pub fn new(location: LocationService<S>) -> Self {
        Self::with_clock(location, SystemClock)
    }
}

impl<S: LocationSource, C: Clock> Recorder<S, C> {
    pub fn with_clock(location: LocationService<S>, clock: C) -> Self {
        Self {
            location,
            clock,
            weight_kg: DEFAULT_WEIGHT_KG,
            tick_interval: TICK_INTERVAL,
            session: RecordingSession::default(),
            paused_at: None,
            paused_total: chrono::Duration::zero(),
            subscription: None,
            ticker: None,
        }
    }

    /// Body weight used for calorie estimates.
    pub fn with_weight(mut self, weight_kg: f64) -> Self {
        self.weight_kg = weight_kg;
        self
    }

    /// Interval between duration refreshes, at least 1 ms.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval.max(MIN_TICK_INTERVAL);
        self
    }

    pub fn state(&self) -> RecorderState {
        match (self.session.is_recording, self.session.is_paused) {
            (false, _) => RecorderState::Idle,
            (true, false) => RecorderState::Recording,
            (true, true) => RecorderState::Paused,
        }
    }

    /// Read-only view of the current session.
    pub fn session(&self) -> &RecordingSession {
        &self.session
    }

    pub fn location(&self) -> &LocationService<S> {
        &self.location
    }

    pub fn location_mut(&mut self) -> &mut LocationService<S> {
        &mut self.location
    }

    /// Begin a new session.
    ///
    /// Fails without touching any state if a session is already active, if
    /// permission is denied, or if the location stream cannot be opened.
    pub async fn start(&mut self) -> Result<()> {
        let state = self.state();
        if state != RecorderState::Idle {
            tracing::warn!(%state, "Start requested while a session is active");
            return Err(AppError::InvalidTransition {
                action: "start",
                state,
            });
        }

        if self.location.request_permissions().await == PermissionStatus::Denied {
            tracing::warn!("Location permission denied, not recording");
            return Err(AppError::PermissionDenied);
        }

        let subscription = self.location.start_tracking()?;

        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let now = self.clock.now();
        self.session = RecordingSession::started(now);
        self.paused_at = None;
        self.paused_total = chrono::Duration::zero();
        self.subscription = Some(subscription);
        self.ticker = Some(ticker);

        tracing::info!(start_time = %format_utc_rfc3339(now), "Recording started");
        Ok(())
    }

    /// Freeze the duration and stop accepting samples.
    pub fn pause(&mut self) -> Result<()> {
        let state = self.state();
        if state != RecorderState::Recording {
            return Err(AppError::InvalidTransition {
                action: "pause",
                state,
            });
        }

        let now = self.clock.now();
        self.session.metrics.duration = whole_seconds(self.active_elapsed(now));
        self.session.is_paused = true;
        self.paused_at = Some(now);

        tracing::info!(duration = self.session.metrics.duration, "Recording paused");
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        let state = self.state();
        if state != RecorderState::Paused {
            return Err(AppError::InvalidTransition {
                action: "resume",
                state,
            });
        }

        let now = self.clock.now();
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_total += now - paused_at;
        }
        self.session.is_paused = false;

        tracing::info!(
            paused_secs = self.paused_total.num_seconds(),
            "Recording resumed"
        );
        Ok(())
    }

    /// End the session and hand back its final aggregate.
    ///
    /// The ticker and subscription are dropped first, then the aggregate is
    /// captured, then the recorder resets to idle. The returned value is the
    /// only remaining copy of the session.
    pub fn stop(&mut self) -> Result<FinishedSession> {
        let state = self.state();
        if state == RecorderState::Idle {
            return Err(AppError::InvalidTransition {
                action: "stop",
                state,
            });
        }

        self.ticker = None;
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }

        let end_time = self.clock.now();
        self.recompute(end_time);

        let session = std::mem::take(&mut self.session);
        self.paused_at = None;
        self.paused_total = chrono::Duration::zero();

        let finished = FinishedSession {
            start_time: session.start_time.unwrap_or(end_time),
            end_time,
            path: session.path,
            metrics: session.metrics,
        };

        tracing::info!(
            points = finished.path.len(),
            distance_m = finished.metrics.distance,
            duration_s = finished.metrics.duration,
            elevation_gain_m = finished.metrics.elevation_gain,
            "Recording stopped"
        );
        Ok(finished)
    }

    /// Apply one location sample.
    ///
    /// Returns `false` if the sample was discarded because the recorder is
    /// idle or paused.
    pub fn record_sample(&mut self, sample: GeoSample) -> bool {
        match self.state() {
            RecorderState::Recording => {}
            state => {
                tracing::debug!(%state, "Discarding location sample");
                return false;
            }
        }

        self.session.path.push(sample);

        // Platforms report -1 or NaN when speed is unknown
        let current_speed = sample
            .speed
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or(0.0);
        let metrics = &mut self.session.metrics;
        metrics.current_speed = current_speed;
        metrics.max_speed = metrics.max_speed.max(current_speed);

        self.recompute(self.clock.now());

        tracing::trace!(
            points = self.session.path.len(),
            distance_m = self.session.metrics.distance,
            "Sample recorded"
        );
        true
    }

    /// Recompute the duration from the clock. A no-op unless recording.
    pub fn refresh_duration(&mut self) -> u64 {
        if self.state() == RecorderState::Recording {
            let now = self.clock.now();
            self.session.metrics.duration = whole_seconds(self.active_elapsed(now));
        }
        self.session.metrics.duration
    }

    /// Wait for the next sample or timer tick and apply it.
    ///
    /// Returns `None` when idle.
    pub async fn next_event(&mut self) -> Option<RecorderEvent> {
        let wake = match (self.subscription.as_mut(), self.ticker.as_mut()) {
            (_, None) => return None,
            (Some(subscription), Some(ticker)) => tokio::select! {
                sample = subscription.recv() => Wake::Sample(sample),
                _ = ticker.tick() => Wake::Tick,
            },
            (None, Some(ticker)) => {
                ticker.tick().await;
                Wake::Tick
            }
        };

        let event = match wake {
            Wake::Sample(Some(sample)) => RecorderEvent::Sample {
                appended: self.record_sample(sample),
            },
            Wake::Sample(None) => {
                tracing::warn!("Location subscription closed");
                self.subscription = None;
                RecorderEvent::SourceClosed
            }
            Wake::Tick => RecorderEvent::Tick {
                duration: self.refresh_duration(),
            },
        };
        Some(event)
    }

    /// Wall-clock time since start, minus time spent paused.
    fn active_elapsed(&self, now: DateTime<Utc>) -> chrono::Duration {
        let Some(start) = self.session.start_time else {
            return chrono::Duration::zero();
        };

        let mut paused = self.paused_total;
        if let Some(paused_at) = self.paused_at {
            paused += now - paused_at;
        }
        now - start - paused
    }

    /// Rebuild every derived metric except the speed readings.
    fn recompute(&mut self, now: DateTime<Utc>) {
        let duration = whole_seconds(self.active_elapsed(now));
        let path = &self.session.path;
        let distance = total_path_distance(path);
        let gain = elevation_gain(&present_elevations(path));
        let minutes = duration as f64 / 60.0;

        let metrics = &mut self.session.metrics;
        metrics.duration = duration;
        metrics.distance = distance;
        metrics.elevation_gain = gain;
        metrics.avg_speed = average_speed(distance, minutes);
        metrics.calories = estimated_calories(distance, minutes, self.weight_kg);
    }
}
