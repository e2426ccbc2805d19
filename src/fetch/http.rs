//! The network-facing [`FetchPage`] implementation.

use super::{FetchPage, FetchRequest, FetchedPage};
use crate::config::ExtractorConfig;
use crate::error::FetchError;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Response, StatusCode, redirect};
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Issues GET requests with a primary browser User-Agent, retrying once with
/// an alternate one when the site answers 403.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    user_agent: String,
    fallback_user_agent: String,
}

impl HttpFetcher {
    pub fn new(config: &ExtractorConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .redirect(redirect::Policy::limited(config.max_redirects))
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| FetchError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
            fallback_user_agent: config.fallback_user_agent.clone(),
        })
    }

    async fn send(&self, request: &FetchRequest, user_agent: &str) -> Result<Response, FetchError> {
        let response = self
            .client
            .get(request.url.clone())
            .headers(request.headers.clone())
            .header(USER_AGENT, user_agent)
            .timeout(request.timeout)
            .send()
            .await?;
        Ok(response)
    }
}

impl FetchPage for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(url = %request.url))]
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedPage, FetchError> {
        let t0 = Instant::now();
        let mut response = self.send(request, &self.user_agent).await?;

        if response.status() == StatusCode::FORBIDDEN {
            warn!("Got 403; retrying with alternate User-Agent");
            response = self.send(request, &self.fallback_user_agent).await?;
        }

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            return Err(FetchError::AccessDenied);
        }
        if !(status.is_success() || status.is_redirection()) {
            return Err(FetchError::HttpError(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let url = response.url().clone();
        let body = response.text().await?;

        debug!(
            status = status.as_u16(),
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched"
        );
        Ok(FetchedPage {
            url,
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}
