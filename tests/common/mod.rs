// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use tokio::sync::mpsc;
use trail_recorder::models::{ActivityCreate, ActivityRecord, GeoSample};
use trail_recorder::services::{
    LocationError, LocationService, LocationSource, PermissionStatus, Recorder, RecorderEvent,
    TrackingOptions,
};
use trail_recorder::time_utils::ManualClock;

/// Location source whose stream is fed by the test.
pub struct FakeLocationSource {
    pub permission: PermissionStatus,
    pub fix: Option<GeoSample>,
    feed: Option<mpsc::Sender<GeoSample>>,
}

impl FakeLocationSource {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self {
            permission: PermissionStatus::Granted,
            fix: None,
            feed: None,
        }
    }

    /// Sender for the live subscription, if one is open.
    #[allow(dead_code)]
    pub fn feed(&self) -> Option<mpsc::Sender<GeoSample>> {
        self.feed.clone()
    }

    /// Take the sender so dropping it ends the stream.
    #[allow(dead_code)]
    pub fn take_feed(&mut self) -> Option<mpsc::Sender<GeoSample>> {
        self.feed.take()
    }
}

impl LocationSource for FakeLocationSource {
    async fn request_permission(&mut self) -> PermissionStatus {
        self.permission
    }

    async fn current_position(&mut self) -> Result<GeoSample, LocationError> {
        self.fix.ok_or(LocationError::NoFix)
    }

    fn watch_position(
        &mut self,
        options: TrackingOptions,
    ) -> Result<mpsc::Receiver<GeoSample>, LocationError> {
        if self.permission == PermissionStatus::Denied {
            return Err(LocationError::PermissionDenied);
        }
        let (tx, rx) = mpsc::channel(options.buffer.max(1));
        self.feed = Some(tx);
        Ok(rx)
    }
}

#[allow(dead_code)]
pub type TestRecorder = Recorder<FakeLocationSource, Arc<ManualClock>>;

/// Fixed start time for recordings.
#[allow(dead_code)]
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
}

/// A recorder on a fake source with a manual clock at `t0()`.
#[allow(dead_code)]
pub fn test_recorder() -> (TestRecorder, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(t0()));
    let location = LocationService::new(FakeLocationSource::new(), TrackingOptions::default());
    (Recorder::with_clock(location, clock.clone()), clock)
}

/// Push a sample through the subscription and wait until it is handled.
#[allow(dead_code)]
pub async fn deliver(recorder: &mut TestRecorder, sample: GeoSample) -> bool {
    let feed = recorder
        .location()
        .source()
        .feed()
        .expect("subscription open");
    feed.send(sample).await.expect("recorder listening");

    loop {
        match recorder.next_event().await {
            Some(RecorderEvent::Sample { appended }) => return appended,
            Some(RecorderEvent::Tick { .. }) => continue,
            other => panic!("unexpected event {:?}", other),
        }
    }
}

/// A stored record for an upload request, as the backend would return it.
#[allow(dead_code)]
pub fn stored(id: &str, activity: &ActivityCreate) -> ActivityRecord {
    ActivityRecord {
        id: id.to_string(),
        trail_id: activity.trail_id.clone(),
        trail_name: None,
        user_id: Some("user-1".to_string()),
        start_time: activity.start_time,
        end_time: activity.end_time,
        distance: activity.distance,
        duration: activity.duration,
        elevation_gain: activity.elevation_gain,
        elevation_loss: activity.elevation_loss,
        avg_speed: activity.avg_speed,
        max_speed: activity.max_speed,
        calories: activity.calories,
        path: activity.path.clone(),
        notes: activity.notes.clone(),
    }
}
