// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types shared by the recorder and the backend client.

use crate::services::recorder::RecorderState;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: RecorderState,
    },

    #[error("Failed to save activity: {0}")]
    PersistenceFailure(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid activity: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Marker for backend authentication failures (401).
    pub const BACKEND_AUTH_ERROR: &'static str = "Backend rejected credentials";

    /// Whether this error is a rejected `start()` on an active session.
    pub fn is_already_recording(&self) -> bool {
        matches!(
            self,
            AppError::InvalidTransition {
                action: "start",
                state: RecorderState::Recording | RecorderState::Paused,
            }
        )
    }

    /// Whether retrying the same request could succeed.
    ///
    /// Validation and auth failures will not go away by themselves.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::PersistenceFailure(msg) => msg != Self::BACKEND_AUTH_ERROR,
            AppError::LocationUnavailable(_) => true,
            _ => false,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Result type alias for recorder and client operations
pub type Result<T> = std::result::Result<T, AppError>;
