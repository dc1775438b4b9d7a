//! Page fetching
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building HTTP clients with proper user agent strings
//! - Waiting for a catalog page to show its product listing
//! - Bounding that wait with the configured readiness timeout

use crate::config::{Config, UserAgentConfig};
use crate::crawler::parser::{has_products, CompiledRules};
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Result of a fetch operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// The page became ready; `markup` contains at least one product entry
    Success {
        /// The page that was requested
        url: Url,
        /// Page body content
        markup: String,
    },

    /// The page did not become ready within the readiness timeout
    Timeout {
        /// The page that was requested
        url: Url,
    },
}

/// A session that can load catalog pages one at a time
///
/// Implementations are owned by the pagination controller for the whole run
/// and closed once when the run ends.
#[async_trait]
pub trait PageFetcher: Send {
    /// Loads `url` and waits until its product listing is present
    async fn fetch(&mut self, url: &Url) -> FetchResult;

    /// Releases the session's resources
    async fn close(&mut self) {}
}

/// Formats the user agent string: `CrawlerName/Version (+ContactURL; ContactEmail)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use catalog_harvest::config::UserAgentConfig;
/// use catalog_harvest::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "CatalogHarvest".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "ops@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// HTTP-backed page session
///
/// A fetch repeatedly requests the page until the markup contains a product
/// entry, sleeping the poll interval between attempts. The whole wait is
/// bounded by the readiness timeout.
pub struct HttpSession {
    client: Client,
    rules: CompiledRules,
    ready_timeout: Duration,
    poll_interval: Duration,
    requests_sent: u64,
}

impl HttpSession {
    /// Creates a session from the full configuration and its compiled rules
    pub fn new(config: &Config, rules: CompiledRules) -> Result<Self> {
        Self::from_parts(
            &config.user_agent,
            rules,
            Duration::from_secs(config.crawler.ready_timeout_secs),
            Duration::from_millis(config.crawler.ready_poll_interval_ms),
        )
    }

    /// Creates a session from its individual settings
    pub fn from_parts(
        user_agent: &UserAgentConfig,
        rules: CompiledRules,
        ready_timeout: Duration,
        poll_interval: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: build_http_client(user_agent)?,
            rules,
            ready_timeout,
            poll_interval,
            requests_sent: 0,
        })
    }

    /// Number of HTTP requests sent over the session's lifetime
    pub fn requests_sent(&self) -> u64 {
        self.requests_sent
    }

    async fn poll_until_ready(&mut self, url: &Url) -> String {
        loop {
            self.requests_sent += 1;
            match self.client.get(url.clone()).send().await {
                Ok(response) if response.status().is_success() => match response.text().await {
                    Ok(markup) if has_products(&markup, &self.rules) => return markup,
                    Ok(_) => tracing::trace!("{} has no product listing yet", url),
                    Err(e) => tracing::debug!("Failed to read body of {}: {}", url, e),
                },
                Ok(response) => {
                    tracing::debug!("{} answered HTTP {}", url, response.status().as_u16())
                }
                Err(e) => tracing::debug!("Request to {} failed: {}", url, e),
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl PageFetcher for HttpSession {
    async fn fetch(&mut self, url: &Url) -> FetchResult {
        let ready_timeout = self.ready_timeout;
        match tokio::time::timeout(ready_timeout, self.poll_until_ready(url)).await {
            Ok(markup) => FetchResult::Success {
                url: url.clone(),
                markup,
            },
            Err(_) => {
                tracing::warn!(
                    "Timed out after {:?} waiting for products on {}",
                    ready_timeout,
                    url
                );
                FetchResult::Timeout { url: url.clone() }
            }
        }
    }

    async fn close(&mut self) {
        tracing::debug!("Closing HTTP session after {} requests", self.requests_sent);
    }
}
