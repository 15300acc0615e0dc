// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Device location access.
//!
//! A [`LocationSource`] is the platform capability (permission prompt,
//! one-shot fix, position stream). [`LocationService`] wraps one source,
//! owned by whoever drives the recording flow, and hands out at most one
//! live [`Subscription`] at a time.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::error::AppError;
use crate::models::GeoSample;

/// Outcome of a permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// How often the source should deliver samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackingOptions {
    /// Minimum time between samples
    pub time_interval: Duration,
    /// Minimum movement between samples (meters)
    pub distance_interval_m: f64,
    /// Channel capacity between the source and the subscriber
    pub buffer: usize,
}

impl Default for TrackingOptions {
    fn default() -> Self {
        Self {
            time_interval: Duration::from_millis(1000),
            distance_interval_m: 5.0,
            buffer: 64,
        }
    }
}

/// Errors from the location capability.
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("No position fix available")]
    NoFix,

    #[error("Location tracking already active")]
    AlreadyTracking,

    #[error("Location source error: {0}")]
    Source(String),
}

impl From<LocationError> for AppError {
    fn from(err: LocationError) -> Self {
        match err {
            LocationError::PermissionDenied => AppError::PermissionDenied,
            other => AppError::LocationUnavailable(other.to_string()),
        }
    }
}

/// Platform location capability.
pub trait LocationSource: Send {
    /// Ask the user for location access.
    fn request_permission(&mut self) -> impl Future<Output = PermissionStatus> + Send;

    /// Read a single position fix.
    fn current_position(
        &mut self,
    ) -> impl Future<Output = Result<GeoSample, LocationError>> + Send;

    /// Begin delivering samples. The stream ends when the receiver is
    /// closed or dropped.
    fn watch_position(
        &mut self,
        options: TrackingOptions,
    ) -> Result<mpsc::Receiver<GeoSample>, LocationError>;
}

/// A live position stream. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    receiver: mpsc::Receiver<GeoSample>,
    _active: ActiveFlag,
}

impl Subscription {
    /// Next sample, or `None` once the source has stopped.
    pub async fn recv(&mut self) -> Option<GeoSample> {
        self.receiver.recv().await
    }

    /// Detach from the source. Buffered samples are discarded.
    pub fn unsubscribe(mut self) {
        self.receiver.close();
    }
}

/// Clears the service's tracking flag when the subscription goes away.
#[derive(Debug)]
struct ActiveFlag(Arc<AtomicBool>);

impl Drop for ActiveFlag {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Location service owned by the recording flow.
pub struct LocationService<S> {
    source: S,
    options: TrackingOptions,
    tracking: Arc<AtomicBool>,
}

impl<S: LocationSource> LocationService<S> {
    pub fn new(source: S, options: TrackingOptions) -> Self {
        Self {
            source,
            options,
            tracking: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn request_permissions(&mut self) -> PermissionStatus {
        let status = self.source.request_permission().await;
        tracing::debug!(?status, "Location permission requested");
        status
    }

    /// One-shot position read. A missing fix is logged and reported as `None`.
    pub async fn current_location(&mut self) -> Option<GeoSample> {
        match self.source.current_position().await {
            Ok(sample) => Some(sample),
            Err(e) => {
                tracing::warn!(error = %e, "Error getting current location");
                None
            }
        }
    }

    /// Open the position stream. Only one subscription may be live.
    pub fn start_tracking(&mut self) -> Result<Subscription, LocationError> {
        if self.tracking.swap(true, Ordering::AcqRel) {
            return Err(LocationError::AlreadyTracking);
        }

        match self.source.watch_position(self.options) {
            Ok(receiver) => {
                tracing::debug!(
                    interval_ms = self.options.time_interval.as_millis() as u64,
                    distance_m = self.options.distance_interval_m,
                    "Location tracking started"
                );
                Ok(Subscription {
                    receiver,
                    _active: ActiveFlag(self.tracking.clone()),
                })
            }
            Err(e) => {
                self.tracking.store(false, Ordering::Release);
                Err(e)
            }
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking.load(Ordering::Acquire)
    }

    pub fn options(&self) -> TrackingOptions {
        self.options
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}
