//! Job and reminder mutation client
//!
//! Thin client for the job CRUD endpoints. Two contracts matter here: every
//! mutating request carries the CSRF header, and every successful mutation
//! triggers a full calendar refresh so the next fetch bypasses the (now
//! stale) event cache. Failures surface through toasts with the server's
//! message when it sent one.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use gts_core::{CalendarRefresh, CsrfTokenProvider, Toasts};
use gts_domain::constants::{CSRF_HEADER, GENERIC_MUTATION_ERROR};
use gts_domain::{GtsError, Result};
use reqwest::{Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::errors::InfraError;
use crate::http::HttpClient;

/// Create/update payload for a job occurrence.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPayload {
    /// Absent for creates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub all_day: bool,
    pub calendar_id: Option<String>,
    pub business_name: Option<String>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub trailer: Option<String>,
    pub notes: Option<String>,
}

/// Client for the job mutation endpoints.
pub struct JobMutationsClient {
    http: HttpClient,
    jobs_url: Url,
    csrf: Arc<dyn CsrfTokenProvider>,
    toasts: Arc<dyn Toasts>,
    refresh: Arc<dyn CalendarRefresh>,
}

impl JobMutationsClient {
    pub fn new(
        http: HttpClient,
        jobs_url: Url,
        csrf: Arc<dyn CsrfTokenProvider>,
        toasts: Arc<dyn Toasts>,
        refresh: Arc<dyn CalendarRefresh>,
    ) -> Self {
        Self { http, jobs_url, csrf, toasts, refresh }
    }

    /// Create or update a job; the payload's `id` decides which.
    pub async fn save_job(&self, payload: &JobPayload) -> Result<()> {
        let url = match &payload.id {
            Some(id) => self.job_url(id)?,
            None => self.jobs_url.clone(),
        };
        let request = self.http.request(Method::POST, url).json(payload);
        self.execute(request, "Job saved").await
    }

    pub async fn delete_job(&self, job_id: &str) -> Result<()> {
        let request = self.http.request(Method::DELETE, self.job_url(job_id)?);
        self.execute(request, "Job deleted").await
    }

    pub async fn set_job_status(&self, job_id: &str, status: &str) -> Result<()> {
        let url = self
            .jobs_url
            .join(&format!("{job_id}/status/"))
            .map_err(InfraError::from)?;
        let request = self
            .http
            .request(Method::POST, url)
            .json(&serde_json::json!({ "status": status }));
        self.execute(request, "Status updated").await
    }

    fn job_url(&self, job_id: &str) -> Result<Url> {
        Ok(self.jobs_url.join(&format!("{job_id}/")).map_err(InfraError::from)?)
    }

    async fn execute(&self, request: RequestBuilder, success_message: &str) -> Result<()> {
        let request = match self.csrf.token() {
            Some(token) => request.header(CSRF_HEADER, token),
            None => request,
        };

        let response = match self.http.send(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "job mutation transport failure");
                self.toasts.error(GENERIC_MUTATION_ERROR);
                return Err(err);
            }
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let envelope: MutationEnvelope = serde_json::from_str(&body).unwrap_or_default();

        if status.is_success() && !envelope.is_error() {
            debug!(%status, "job mutation applied");
            self.toasts.success(success_message);
            // The invalidation contract: stale cache entries must not
            // survive a known mutation.
            self.refresh.refresh_calendar();
            return Ok(());
        }

        let message = envelope.error.unwrap_or_else(|| GENERIC_MUTATION_ERROR.to_string());
        warn!(%status, message = %message, "job mutation rejected");
        self.toasts.error(&message);
        Err(GtsError::Network(message))
    }
}

#[derive(Debug, Default, Deserialize)]
struct MutationEnvelope {
    status: Option<String>,
    error: Option<String>,
}

impl MutationEnvelope {
    fn is_error(&self) -> bool {
        self.status.as_deref() == Some("error")
    }
}
