// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod sample;
pub mod session;
pub mod stats;

pub use activity::{ActivityCreate, ActivityPoint, ActivityRecord, PathDetail};
pub use sample::GeoSample;
pub use session::{FinishedSession, RecordingSession, SessionMetrics};
pub use stats::ActivityStats;
