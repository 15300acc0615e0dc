// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - recording and persistence logic.

pub mod activity_client;
pub mod calculations;
pub mod formatters;
pub mod location;
pub mod recorder;
pub mod replay;
pub mod uploads;

pub use activity_client::{ActivityBackend, ActivityClient};
pub use location::{
    LocationError, LocationService, LocationSource, PermissionStatus, Subscription,
    TrackingOptions,
};
pub use recorder::{Recorder, RecorderEvent, RecorderState};
pub use replay::{ReplayError, ReplayPace, ReplaySource};
pub use uploads::{PendingUploads, UploadReport};
