//! Thin reqwest wrapper shared by the API clients.
//!
//! Deliberately retry-free: the stale-while-revalidate layer above already
//! owns failure policy (serve cached data, revalidate in the background),
//! and transparent retries would fight its last-request-wins cancellation.
//! Timeouts are the transport's own; no additional deadline is enforced
//! here.

use std::time::Duration;

use gts_domain::{GtsError, Result};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::InfraError;

/// HTTP client with cancellation support.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the request.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        builder.send().await.map_err(|err| InfraError::from(err).into())
    }

    /// Execute the request, aborting with [`GtsError::Cancelled`] as soon as
    /// the token fires. Each fetch lane passes its own token, which is what
    /// keeps interactive navigation and background revalidation isolated.
    pub async fn send_cancellable(
        &self,
        builder: RequestBuilder,
        cancel: &CancellationToken,
    ) -> Result<Response> {
        tokio::select! {
            () = cancel.cancelled() => {
                debug!("request aborted by cancellation token");
                Err(GtsError::Cancelled)
            }
            result = builder.send() => result.map_err(|err| InfraError::from(err).into()),
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30), user_agent: None, default_headers: None }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout);

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| GtsError::from(InfraError::from(err)))?;
        Ok(HttpClient { client })
    }
}
