//! Lifetime activity statistics for the profile screen.
//!
//! Built from the activity list, one activity at a time, so a page of
//! activities can be folded in as it arrives.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::models::ActivityRecord;

/// Totals across a user's activities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStats {
    // ─── Totals ──────────────────────────────────────────────────
    #[serde(default)]
    pub total_activities: u32,
    /// Meters
    #[serde(default)]
    pub total_distance: f64,
    /// Seconds
    #[serde(default)]
    pub total_duration: u64,
    /// Meters
    #[serde(default)]
    pub total_elevation_gain: f64,
    #[serde(default)]
    pub total_calories: f64,

    // ─── Records ─────────────────────────────────────────────────
    /// Longest single activity by distance (meters)
    #[serde(default)]
    pub longest_hike: f64,
    /// Longest single activity by time (seconds)
    #[serde(default)]
    pub longest_duration: u64,

    // ─── Time Series ─────────────────────────────────────────────
    /// Activity count per month ("YYYY-MM")
    #[serde(default)]
    pub activities_by_month: BTreeMap<String, u32>,

    // ─── Idempotency ─────────────────────────────────────────────
    #[serde(skip)]
    processed_ids: HashSet<String>,
}

impl ActivityStats {
    /// Compute stats for a list of activities.
    pub fn from_activities<'a>(activities: impl IntoIterator<Item = &'a ActivityRecord>) -> Self {
        let mut stats = Self::default();
        for activity in activities {
            stats.update_from_activity(activity);
        }
        stats
    }

    /// Fold one activity into the totals.
    ///
    /// Returns `false` if the activity was already counted.
    pub fn update_from_activity(&mut self, activity: &ActivityRecord) -> bool {
        if !self.processed_ids.insert(activity.id.clone()) {
            return false;
        }

        self.total_activities += 1;
        self.total_distance += activity.distance.max(0.0);
        self.total_duration += activity.duration;
        self.total_elevation_gain += activity.elevation_gain.max(0.0);
        self.total_calories += activity.calories.max(0.0);

        self.longest_hike = self.longest_hike.max(activity.distance);
        self.longest_duration = self.longest_duration.max(activity.duration);

        let month_key = activity.start_time.format("%Y-%m").to_string();
        *self.activities_by_month.entry(month_key).or_insert(0) += 1;

        true
    }
}
