// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Finished activities waiting to be accepted by the backend.
//!
//! `stop()` hands back the only copy of a session. It is held here until a
//! create call succeeds, so a failed save can be retried instead of lost.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::AppError;
use crate::models::{ActivityCreate, ActivityRecord};
use crate::services::activity_client::ActivityBackend;

/// Outcome of retrying every held upload.
#[derive(Debug, Default)]
pub struct UploadReport {
    pub saved: Vec<ActivityRecord>,
    pub failed: Vec<(u64, AppError)>,
}

/// In-memory store of activities not yet saved.
#[derive(Debug, Default)]
pub struct PendingUploads {
    entries: DashMap<u64, ActivityCreate>,
    next_id: AtomicU64,
}

impl PendingUploads {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep an activity until it is saved. Returns its local id.
    pub fn hold(&self, activity: ActivityCreate) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(id, activity);
        tracing::debug!(pending_id = id, "Holding activity for upload");
        id
    }

    pub fn get(&self, id: u64) -> Option<ActivityCreate> {
        self.entries.get(&id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Local ids in ascending order.
    pub fn ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.entries.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        ids
    }

    /// Drop an activity without saving it.
    pub fn discard(&self, id: u64) -> Option<ActivityCreate> {
        self.entries.remove(&id).map(|(_, activity)| activity)
    }

    /// Try to save one held activity. It is released only on success.
    pub async fn submit<B: ActivityBackend>(
        &self,
        backend: &B,
        id: u64,
    ) -> Result<ActivityRecord, AppError> {
        // Clone out so no map guard is held across the await
        let activity = self
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("Pending upload {}", id)))?;

        match backend.create_activity(&activity).await {
            Ok(record) => {
                self.entries.remove(&id);
                tracing::info!(pending_id = id, activity_id = %record.id, "Pending upload saved");
                Ok(record)
            }
            Err(e) => {
                tracing::warn!(
                    pending_id = id,
                    error = %e,
                    retryable = e.is_retryable(),
                    "Upload failed, keeping activity"
                );
                Err(e)
            }
        }
    }

    /// Submit every held activity once, oldest first.
    pub async fn retry_all<B: ActivityBackend>(&self, backend: &B) -> UploadReport {
        let mut report = UploadReport::default();

        for id in self.ids() {
            match self.submit(backend, id).await {
                Ok(record) => report.saved.push(record),
                Err(e) => report.failed.push((id, e)),
            }
        }

        tracing::info!(
            saved = report.saved.len(),
            failed = report.failed.len(),
            "Retried pending uploads"
        );
        report
    }
}
