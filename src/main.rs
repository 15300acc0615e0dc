// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trail Recorder
//!
//! Replays a recorded GPS track through the activity recorder, prints the
//! resulting summary and saves the activity to the backend.
//!
//! Usage: `trail-recorder <track.json> [trail-id]`

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trail_recorder::{
    config::Config,
    models::{ActivityCreate, FinishedSession, PathDetail},
    services::{
        formatters, ActivityClient, LocationService, PendingUploads, Recorder, RecorderEvent,
        ReplaySource,
    },
    time_utils::ManualClock,
};

/// Save attempts before the activity is written to disk instead.
const MAX_UPLOAD_ATTEMPTS: u32 = 3;

/// Delay before the first retry; doubled for each further attempt.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging();

    let mut args = std::env::args().skip(1);
    let track_path = args
        .next()
        .context("usage: trail-recorder <track.json> [trail-id]")?;
    let trail_id = args.next();

    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(api = %config.api_base_url, "Starting trail recorder");

    let source = ReplaySource::load_from_file(&track_path)
        .with_context(|| format!("Failed to load track {}", track_path))?;
    let start = source
        .first_timestamp()
        .context("Track contains no samples")?;

    // Recorder time follows the track, one sample at a time
    let clock = Arc::new(ManualClock::new(start));
    let source = source.with_clock(clock.clone());
    let location = LocationService::new(source, config.tracking_options());
    let mut recorder = Recorder::with_clock(location, clock).with_weight(config.body_weight_kg);

    recorder.start().await?;
    while let Some(event) = recorder.next_event().await {
        if event == RecorderEvent::SourceClosed {
            break;
        }
    }
    let finished = recorder.stop()?;
    print_summary(&finished);

    let mut activity = ActivityCreate::from_finished(&finished, PathDetail::Full);
    if let Some(trail_id) = trail_id {
        activity = activity.with_trail(trail_id);
    }

    let client = ActivityClient::from_config(&config);
    let pending = PendingUploads::new();
    let id = pending.hold(activity);

    let mut attempt = 1;
    loop {
        match pending.submit(&client, id).await {
            Ok(record) => {
                println!("Saved activity {}", record.id);
                return Ok(());
            }
            Err(e) if e.is_retryable() && attempt < MAX_UPLOAD_ATTEMPTS => {
                let delay = RETRY_BASE_DELAY * 2u32.pow(attempt - 1);
                tracing::info!(attempt, delay_ms = delay.as_millis() as u64, "Retrying upload");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                let activity = pending
                    .discard(id)
                    .context("Pending upload vanished")?;
                let out_path = format!("{}.pending.json", track_path);
                let json = serde_json::to_string_pretty(&activity)?;
                std::fs::write(&out_path, json)
                    .with_context(|| format!("Failed to write {}", out_path))?;

                tracing::error!(error = %e, path = %out_path, "Upload failed, activity kept on disk");
                return Err(e).context("Failed to save activity");
            }
        }
    }
}

fn print_summary(finished: &FinishedSession) {
    let metrics = &finished.metrics;

    println!(
        "{} - {}",
        formatters::format_date_time(finished.start_time),
        formatters::format_time(finished.end_time)
    );
    println!("  Points:    {}", finished.path.len());
    println!("  Distance:  {}", formatters::format_distance(metrics.distance));
    println!("  Duration:  {}", formatters::format_elapsed(metrics.duration));
    println!("  Elevation: {}", formatters::format_elevation(metrics.elevation_gain));
    println!("  Avg speed: {}", formatters::format_speed(metrics.avg_speed));
    println!("  Max speed: {}", formatters::format_speed(metrics.max_speed));
    println!("  Pace:      {}", formatters::format_pace(metrics.avg_speed));
    println!("  Calories:  {}", formatters::format_calories(metrics.calories));
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true)
        .with_writer(std::io::stderr);

    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("trail_recorder=debug".parse().expect("valid directive"))
        .add_directive("info".parse().expect("valid directive"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
