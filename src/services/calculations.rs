// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Distance, elevation, speed and calorie calculations.
//!
//! Every function here is pure and total: undefined math (division by zero)
//! yields 0 rather than NaN or a panic.

use geo::Point;

use crate::models::GeoSample;

/// Earth radius used for Haversine distances (meters).
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Body weight assumed when none is configured (kg).
pub const DEFAULT_WEIGHT_KG: f64 = 70.0;

/// Default window for [`smooth_path`].
pub const DEFAULT_SMOOTHING_WINDOW: usize = 5;

/// Great-circle distance between two points in meters (Haversine).
///
/// Points are (x = longitude, y = latitude) in degrees.
pub fn distance_between(a: Point<f64>, b: Point<f64>) -> f64 {
    let lat1 = a.y().to_radians();
    let lat2 = b.y().to_radians();
    let d_lat = (b.y() - a.y()).to_radians();
    let d_lon = (b.x() - a.x()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push h a hair outside [0, 1] for antipodal points
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Cumulative length of a path in meters. 0 for fewer than two points.
pub fn total_path_distance<P>(path: &[P]) -> f64
where
    P: Copy + Into<Point<f64>>,
{
    path.windows(2)
        .map(|pair| distance_between(pair[0].into(), pair[1].into()))
        .sum()
}

/// Sum of positive deltas between consecutive elevations.
///
/// Callers pass only readings that exist; missing elevations are dropped
/// before this is called, not encoded as zero.
pub fn elevation_gain(elevations: &[f64]) -> f64 {
    elevations
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).max(0.0))
        .sum()
}

/// Sum of negative deltas between consecutive elevations, as a positive number.
pub fn elevation_loss(elevations: &[f64]) -> f64 {
    elevations
        .windows(2)
        .map(|pair| (pair[0] - pair[1]).max(0.0))
        .sum()
}

/// Elevations present in a path, in order.
pub fn present_elevations(path: &[GeoSample]) -> Vec<f64> {
    path.iter().filter_map(|s| s.elevation).collect()
}

/// Elevation summary for a recorded path.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ElevationProfile {
    pub gain: f64,
    pub loss: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Gain, loss, min and max over the samples that carry an elevation.
pub fn elevation_profile(path: &[GeoSample]) -> ElevationProfile {
    let elevations = present_elevations(path);

    ElevationProfile {
        gain: elevation_gain(&elevations),
        loss: elevation_loss(&elevations),
        min: elevations.iter().copied().reduce(f64::min),
        max: elevations.iter().copied().reduce(f64::max),
    }
}

/// MET value for hiking at a given speed.
fn hiking_met(speed_kmh: f64) -> f64 {
    if speed_kmh > 6.0 {
        7.5 // fast hiking
    } else if speed_kmh > 5.0 {
        6.0 // moderate hiking
    } else {
        3.5 // slow walking
    }
}

/// Estimated calories burned: `MET * weight_kg * hours`.
pub fn estimated_calories(distance_meters: f64, duration_minutes: f64, weight_kg: f64) -> f64 {
    if duration_minutes.is_nan() || duration_minutes <= 0.0 {
        return 0.0;
    }

    let hours = duration_minutes / 60.0;
    let speed_kmh = (distance_meters.max(0.0) / 1000.0) / hours;

    hiking_met(speed_kmh) * weight_kg.max(0.0) * hours
}

/// Average speed in m/s. 0 when the duration is 0.
pub fn average_speed(distance_meters: f64, duration_minutes: f64) -> f64 {
    if duration_minutes.is_nan() || duration_minutes <= 0.0 {
        return 0.0;
    }
    distance_meters.max(0.0) / (duration_minutes * 60.0)
}

/// Pace in minutes per kilometer. 0 when the distance is 0.
pub fn pace(distance_meters: f64, duration_minutes: f64) -> f64 {
    if distance_meters.is_nan() || distance_meters <= 0.0 {
        return 0.0;
    }
    duration_minutes.max(0.0) / (distance_meters / 1000.0)
}

/// Centred moving average over latitude/longitude to damp GPS jitter.
///
/// Paths shorter than the window come back unchanged.
pub fn smooth_path<P>(path: &[P], window: usize) -> Vec<Point<f64>>
where
    P: Copy + Into<Point<f64>>,
{
    let points: Vec<Point<f64>> = path.iter().map(|&p| p.into()).collect();
    if window == 0 || points.len() < window {
        return points;
    }

    let before = window / 2;
    let after = window.div_ceil(2);

    (0..points.len())
        .map(|i| {
            let slice = &points[i.saturating_sub(before)..(i + after).min(points.len())];
            let n = slice.len() as f64;
            let x = slice.iter().map(|p| p.x()).sum::<f64>() / n;
            let y = slice.iter().map(|p| p.y()).sum::<f64>() / n;
            Point::new(x, y)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn pt(lat: f64, lon: f64) -> Point<f64> {
        Point::new(lon, lat)
    }

    #[test]
    fn test_distance_is_symmetric() {
        let pairs = [
            (pt(37.3861, -122.0839), pt(37.4419, -122.1430)),
            (pt(-33.8688, 151.2093), pt(51.5074, -0.1278)),
            (pt(0.0, 179.9), pt(0.0, -179.9)),
        ];
        for (a, b) in pairs {
            assert!((distance_between(a, b) - distance_between(b, a)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_distance_identical_points_is_zero() {
        let a = pt(46.5197, 6.6323);
        assert_eq!(distance_between(a, a), 0.0);
    }

    #[test]
    fn test_distance_one_degree_latitude() {
        // One degree of arc on a 6371 km sphere
        let d = distance_between(pt(0.0, 0.0), pt(1.0, 0.0));
        assert!((d - 111_194.93).abs() < 0.1, "got {}", d);
    }

    #[test]
    fn test_distance_diagonal_millidegree() {
        let d = distance_between(pt(0.0, 0.0), pt(0.001, 0.001));
        assert!((d - 157.25).abs() < 0.1, "got {}", d);
    }

    #[test]
    fn test_distance_antipodal_is_finite() {
        let d = distance_between(pt(0.0, 0.0), pt(0.0, 180.0));
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_METERS).abs() < 1.0);
    }

    #[test]
    fn test_total_path_distance_short_paths() {
        let empty: [Point<f64>; 0] = [];
        assert_eq!(total_path_distance(&empty), 0.0);
        assert_eq!(total_path_distance(&[pt(10.0, 10.0)]), 0.0);
    }

    #[test]
    fn test_total_path_distance_sums_segments() {
        let path = [pt(0.0, 0.0), pt(1.0, 0.0), pt(2.0, 0.0)];
        let direct = distance_between(path[0], path[2]);
        assert!((total_path_distance(&path) - direct).abs() < 1e-6);
    }

    #[test]
    fn test_elevation_gain_and_loss() {
        assert_eq!(elevation_gain(&[]), 0.0);
        assert_eq!(elevation_gain(&[120.0]), 0.0);
        assert_eq!(elevation_gain(&[100.0, 110.0, 105.0, 120.0]), 25.0);
        assert_eq!(elevation_loss(&[100.0, 110.0, 105.0, 120.0]), 5.0);
    }

    #[test]
    fn test_elevation_profile_skips_missing_readings() {
        let t = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        let path = [
            GeoSample::new(0.0, 0.0, t).with_elevation(0.0),
            GeoSample::new(0.0, 0.0, t),
            GeoSample::new(0.0, 0.0, t).with_elevation(12.0),
            GeoSample::new(0.0, 0.0, t).with_elevation(4.0),
        ];

        let profile = elevation_profile(&path);

        // Sea level is a real reading, the missing one is skipped
        assert_eq!(profile.gain, 12.0);
        assert_eq!(profile.loss, 8.0);
        assert_eq!(profile.min, Some(0.0));
        assert_eq!(profile.max, Some(12.0));
        assert_eq!(elevation_profile(&[]).min, None);
    }

    #[test]
    fn test_calories_zero_duration() {
        assert_eq!(estimated_calories(5000.0, 0.0, DEFAULT_WEIGHT_KG), 0.0);
        assert_eq!(estimated_calories(0.0, 0.0, DEFAULT_WEIGHT_KG), 0.0);
        assert_eq!(estimated_calories(5000.0, -3.0, DEFAULT_WEIGHT_KG), 0.0);
    }

    #[test]
    fn test_calories_met_thresholds() {
        // 4 km/h for one hour
        assert!((estimated_calories(4000.0, 60.0, 70.0) - 245.0).abs() < 1e-9);
        // exactly 5 km/h stays in the slow band
        assert!((estimated_calories(5000.0, 60.0, 70.0) - 245.0).abs() < 1e-9);
        // 5.5 km/h
        assert!((estimated_calories(5500.0, 60.0, 70.0) - 420.0).abs() < 1e-9);
        // exactly 6 km/h stays in the moderate band
        assert!((estimated_calories(6000.0, 60.0, 70.0) - 420.0).abs() < 1e-9);
        // 7 km/h for half an hour at 80 kg
        assert!((estimated_calories(3500.0, 30.0, 80.0) - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_average_speed_and_pace_guards() {
        assert_eq!(average_speed(1000.0, 0.0), 0.0);
        assert_eq!(pace(0.0, 10.0), 0.0);
        assert!((average_speed(1200.0, 10.0) - 2.0).abs() < 1e-12);
        assert!((pace(2000.0, 24.0) - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_smooth_path() {
        let short = [pt(0.0, 0.0), pt(1.0, 1.0)];
        assert_eq!(smooth_path(&short, DEFAULT_SMOOTHING_WINDOW), short.to_vec());

        let path = [pt(0.0, 0.0), pt(3.0, 0.0), pt(0.0, 0.0), pt(3.0, 0.0)];
        let smoothed = smooth_path(&path, 3);
        assert_eq!(smoothed.len(), 4);
        // First point averages itself and its successor
        assert!((smoothed[0].y() - 1.5).abs() < 1e-12);
        // Interior points average three neighbours
        assert!((smoothed[1].y() - 1.0).abs() < 1e-12);
        assert!((smoothed[2].y() - 2.0).abs() < 1e-12);
    }
}
