//! Calendar events endpoint client
//!
//! Implements the core's [`EventsApi`] port against the backend's JSON
//! endpoint. Failure handling follows the calendar's degradation ladder: a
//! non-2xx status is a hard failure (the controller decides what the user
//! sees), while a 2xx response with an empty or malformed body degrades to
//! zero events with a logged diagnostic. An empty calendar beats a broken
//! one.

use async_trait::async_trait;
use gts_core::EventsApi;
use gts_domain::{CalendarEvent, EventQuery, GtsError, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::http::HttpClient;

/// Maximum body length echoed into diagnostics.
const BODY_SNIPPET_CHARS: usize = 200;

/// HTTP implementation of the events port.
pub struct HttpEventsApi {
    http: HttpClient,
    events_url: Url,
}

impl HttpEventsApi {
    pub fn new(http: HttpClient, events_url: Url) -> Self {
        Self { http, events_url }
    }
}

#[async_trait]
impl EventsApi for HttpEventsApi {
    async fn fetch_events(
        &self,
        query: &EventQuery,
        cancel: CancellationToken,
    ) -> Result<Vec<CalendarEvent>> {
        let request = self
            .http
            .request(Method::GET, self.events_url.clone())
            .query(&query.query_params());

        let response = self.http.send_cancellable(request, &cancel).await?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                warn!(url = %self.events_url, %status, error = %err, "failed reading events response body");
                return Err(GtsError::Network(format!("events response body unreadable: {err}")));
            }
        };

        if !status.is_success() {
            warn!(
                url = %self.events_url,
                %status,
                content_type,
                snippet = %snippet(&body),
                "calendar events request failed"
            );
            return Err(GtsError::Network(format!("calendar events request returned {status}")));
        }

        if body.trim().is_empty() {
            warn!(url = %self.events_url, content_type, "empty events response body; treating as zero events");
            return Ok(Vec::new());
        }

        match serde_json::from_str::<EventsEnvelope>(&body) {
            Ok(EventsEnvelope::Success { events }) => {
                debug!(count = events.len(), "calendar events fetched");
                Ok(events)
            }
            Ok(EventsEnvelope::Error { error }) => {
                warn!(url = %self.events_url, error = %error, "server rejected calendar events request");
                Err(GtsError::Network(error))
            }
            Err(err) => {
                warn!(
                    url = %self.events_url,
                    content_type,
                    error = %err,
                    snippet = %snippet(&body),
                    "malformed events payload; treating as zero events"
                );
                Ok(Vec::new())
            }
        }
    }
}

fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_CHARS).collect()
}

/// Response envelope of the events endpoint.
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum EventsEnvelope {
    Success {
        #[serde(default)]
        events: Vec<CalendarEvent>,
    },
    Error {
        #[serde(default)]
        error: String,
    },
}
