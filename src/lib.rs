// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Trail Recorder: record hiking activities from a location stream
//!
//! This crate turns a stream of GPS samples into a recorded activity with
//! live distance, elevation, speed and calorie metrics, then saves the
//! finished activity to the backend API.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod time_utils;
