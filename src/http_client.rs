use anyhow::{Context, Result};
use rand::seq::IndexedRandom;
use reqwest::{header, Client, ClientBuilder};
use std::time::Duration;

use crate::config::Config;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to fetch {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned non-HTML content ({content_type})")]
    NotHtml { url: String, content_type: String },
}

/// Client builder with the headers shared by every page request.
/// The User-Agent is not set here; it is chosen per request.
pub fn http_client_builder(accept_language: &str, timeout: Duration) -> Result<ClientBuilder> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::ACCEPT_LANGUAGE,
        header::HeaderValue::from_str(accept_language)
            .context("Invalid Accept-Language header value")?,
    );

    Ok(Client::builder()
        .default_headers(headers)
        .timeout(timeout))
}

pub fn create_http_client(accept_language: &str, timeout: Duration) -> Result<Client> {
    http_client_builder(accept_language, timeout)?
        .build()
        .context("Failed to create HTTP client")
}

/// Uniformly random pick from the User-Agent pool
pub fn pick_user_agent(pool: &[String]) -> Option<&str> {
    pool.choose(&mut rand::rng()).map(String::as_str)
}

/// Issues single, non-retried GET requests for listing pages
pub struct PageFetcher {
    client: Client,
    user_agents: Vec<String>,
}

impl PageFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let client = create_http_client(&config.accept_language, config.request_timeout())?;
        Ok(Self::with_client(client, config.user_agents.clone()))
    }

    pub fn with_client(client: Client, user_agents: Vec<String>) -> Self {
        Self { client, user_agents }
    }

    /// Fetch `url` and return its body. Transport failures, non-success
    /// statuses and non-HTML responses all come back as [`FetchError`].
    pub async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let mut request = self.client.get(url);
        if let Some(user_agent) = pick_user_agent(&self.user_agents) {
            tracing::trace!("Using User-Agent: {}", user_agent);
            request = request.header(header::USER_AGENT, user_agent);
        }

        let response = request
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|source| FetchError::Request { url: url.to_string(), source })?;

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.contains("text/html") {
            return Err(FetchError::NotHtml { url: url.to_string(), content_type });
        }

        let html = response
            .text()
            .await
            .map_err(|source| FetchError::Request { url: url.to_string(), source })?;

        tracing::debug!("Fetched {} bytes from {}", html.len(), url);
        Ok(html)
    }
}
