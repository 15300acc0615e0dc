//! Display formatting for recorded metrics.

use chrono::{DateTime, Utc};

/// "850m" below a kilometer, "1.2km" above.
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{:.0}m", meters)
    } else {
        format!("{:.1}km", meters / 1000.0)
    }
}

/// "45min" or "1h 5min".
pub fn format_duration(minutes: u64) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;

    if hours == 0 {
        format!("{}min", mins)
    } else {
        format!("{}h {}min", hours, mins)
    }
}

/// Live stopwatch display: "02:03" or "1:02:03".
pub fn format_elapsed(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

pub fn format_elevation(meters: f64) -> String {
    format!("{:.0}m", meters)
}

/// m/s rendered as km/h.
pub fn format_speed(meters_per_second: f64) -> String {
    format!("{:.1} km/h", meters_per_second * 3.6)
}

/// m/s rendered as minutes per kilometer, e.g. "12:20 /km".
pub fn format_pace(meters_per_second: f64) -> String {
    if meters_per_second.is_nan() || meters_per_second <= 0.0 {
        return "0:00 /km".to_string();
    }

    let minutes_per_km = 1000.0 / (meters_per_second * 60.0);
    let mins = minutes_per_km.floor();
    let secs = ((minutes_per_km - mins) * 60.0).floor();

    format!("{}:{:02} /km", mins as u64, secs as u64)
}

pub fn format_calories(calories: f64) -> String {
    format!("{:.0} kcal", calories)
}

/// "Jun 1, 2024"
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// "08:30 AM"
pub fn format_time(date: DateTime<Utc>) -> String {
    date.format("%I:%M %p").to_string()
}

pub fn format_date_time(date: DateTime<Utc>) -> String {
    format!("{} {}", format_date(date), format_time(date))
}
