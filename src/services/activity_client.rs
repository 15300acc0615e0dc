// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity backend client.
//!
//! Handles:
//! - Creating an activity from a finished recording
//! - Listing, fetching and deleting stored activities
//! - GPX export and import
//! - Mapping HTTP failures onto `AppError`

use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use std::future::Future;
use validator::Validate;

use crate::config::Config;
use crate::error::AppError;
use crate::models::{ActivityCreate, ActivityRecord};

/// Persistence boundary for recorded activities.
pub trait ActivityBackend: Send + Sync {
    /// Store a new activity and return the stored record.
    fn create_activity(
        &self,
        activity: &ActivityCreate,
    ) -> impl Future<Output = Result<ActivityRecord, AppError>> + Send;

    /// Activities belonging to the authenticated user.
    fn list_activities(&self) -> impl Future<Output = Result<Vec<ActivityRecord>, AppError>> + Send;

    fn get_activity(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<ActivityRecord, AppError>> + Send;

    fn delete_activity(&self, id: &str) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Content type sent with imported GPX files.
const GPX_MIME: &str = "application/gpx+xml";

/// HTTP client for the activity backend.
#[derive(Clone)]
pub struct ActivityClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ActivityClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_base_url.clone(), config.api_token.clone())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Request builder with the bearer token attached when one is configured.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self.http.request(method, self.url(path));
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, AppError> {
        request
            .send()
            .await
            .map_err(|e| AppError::PersistenceFailure(format!("Request failed: {}", e)))
    }

    fn export_gpx_request(&self, id: &str) -> RequestBuilder {
        self.request(Method::GET, &format!("/api/gpx/export/{}", id))
    }

    fn import_gpx_request(
        &self,
        file_name: &str,
        gpx: Vec<u8>,
    ) -> Result<RequestBuilder, AppError> {
        let part = Part::bytes(gpx)
            .file_name(file_name.to_string())
            .mime_str(GPX_MIME)
            .map_err(|e| AppError::Internal(e.into()))?;

        Ok(self
            .request(Method::POST, "/api/gpx/import")
            .multipart(Form::new().part("file", part)))
    }

    /// Download a stored activity as a GPX document.
    pub async fn export_gpx(&self, id: &str) -> Result<String, AppError> {
        let response = self.send(self.export_gpx_request(id)).await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::PersistenceFailure(format!("Failed to read GPX: {}", e)))
    }

    /// Upload a GPX file; the backend creates an activity from it.
    pub async fn import_gpx(
        &self,
        file_name: &str,
        gpx: Vec<u8>,
    ) -> Result<ActivityRecord, AppError> {
        let size = gpx.len();
        let response = self.send(self.import_gpx_request(file_name, gpx)?).await?;
        let record: ActivityRecord = self.check_response_json(response).await?;

        tracing::info!(activity_id = %record.id, bytes = size, "GPX imported");
        Ok(record)
    }

    /// Check response status and return error if not successful.
    async fn check_response(&self, response: reqwest::Response) -> Result<(), AppError> {
        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, body))
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::PersistenceFailure(format!("JSON parse error: {}", e)))
    }
}

/// Map a non-success status onto the error callers act on.
fn status_error(status: reqwest::StatusCode, body: String) -> AppError {
    match status.as_u16() {
        404 => AppError::NotFound(body),
        401 | 403 => {
            tracing::warn!(%status, "Activity backend rejected credentials");
            AppError::PersistenceFailure(AppError::BACKEND_AUTH_ERROR.to_string())
        }
        _ => AppError::PersistenceFailure(format!("HTTP {}: {}", status, body)),
    }
}

impl ActivityBackend for ActivityClient {
    async fn create_activity(&self, activity: &ActivityCreate) -> Result<ActivityRecord, AppError> {
        activity.validate()?;

        let response = self
            .send(self.request(Method::POST, "/api/activities").json(activity))
            .await?;
        let record: ActivityRecord = self.check_response_json(response).await?;

        tracing::info!(
            activity_id = %record.id,
            distance_m = record.distance,
            "Activity saved"
        );
        Ok(record)
    }

    async fn list_activities(&self) -> Result<Vec<ActivityRecord>, AppError> {
        let response = self
            .send(self.request(Method::GET, "/api/users/me/activities"))
            .await?;
        self.check_response_json(response).await
    }

    async fn get_activity(&self, id: &str) -> Result<ActivityRecord, AppError> {
        let response = self
            .send(self.request(Method::GET, &format!("/api/activities/{}", id)))
            .await?;
        self.check_response_json(response).await
    }

    async fn delete_activity(&self, id: &str) -> Result<(), AppError> {
        let response = self
            .send(self.request(Method::DELETE, &format!("/api/activities/{}", id)))
            .await?;
        self.check_response(response).await?;

        tracing::info!(activity_id = %id, "Activity deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_mapping() {
        assert!(matches!(
            status_error(reqwest::StatusCode::NOT_FOUND, "gone".to_string()),
            AppError::NotFound(body) if body == "gone"
        ));

        let auth = status_error(reqwest::StatusCode::UNAUTHORIZED, String::new());
        assert!(!auth.is_retryable());

        let unavailable = status_error(reqwest::StatusCode::SERVICE_UNAVAILABLE, "busy".to_string());
        assert!(unavailable.is_retryable());
        assert_eq!(
            unavailable.to_string(),
            "Failed to save activity: HTTP 503 Service Unavailable: busy"
        );
    }

    #[test]
    fn test_export_gpx_request() {
        let client = ActivityClient::new("http://localhost:8000", Some("tok".to_string()));
        let request = client.export_gpx_request("act-7").build().unwrap();

        assert_eq!(request.method(), &Method::GET);
        assert_eq!(
            request.url().as_str(),
            "http://localhost:8000/api/gpx/export/act-7"
        );
        assert_eq!(
            request.headers()[reqwest::header::AUTHORIZATION],
            "Bearer tok"
        );
    }

    #[test]
    fn test_import_gpx_request_is_multipart() {
        let client = ActivityClient::from_config(&Config::default());
        let request = client
            .import_gpx_request("morning.gpx", b"<gpx/>".to_vec())
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.url().path(), "/api/gpx/import");
        assert!(request.headers().get(reqwest::header::AUTHORIZATION).is_none());
        let content_type = request.headers()[reqwest::header::CONTENT_TYPE]
            .to_str()
            .unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
    }

    #[test]
    fn test_url_joins_base() {
        let client = ActivityClient::from_config(&Config::default());
        assert_eq!(
            client.url("/api/activities"),
            "http://localhost:8000/api/activities"
        );
    }
}
