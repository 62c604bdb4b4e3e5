//! Network fetch collaborator

use std::collections::BTreeMap;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;
use tracing::{debug, warn};

use crate::config::DEFAULT_FETCH_TIMEOUT_SECS;
use crate::update::error::ProviderError;

/// Options of one outbound request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    pub headers: BTreeMap<String, String>,
    pub timeout: Duration,
}

impl FetchOptions {
    pub fn new(timeout: Duration) -> Self {
        Self {
            headers: BTreeMap::new(),
            timeout,
        }
    }

    /// Add `extra` headers without replacing any header already present.
    ///
    /// Header names are compared case-insensitively.
    pub fn merge_headers(&mut self, extra: BTreeMap<String, String>) {
        for (name, value) in extra {
            let present = self
                .headers
                .keys()
                .any(|existing| existing.eq_ignore_ascii_case(&name));
            if !present {
                self.headers.insert(name, value);
            }
        }
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS))
    }
}

/// Raw response of a provider request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for performing the single network request of a resolution pass
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url`, failing with `ProviderError::Network` on transport errors or timeout
    async fn fetch(&self, url: &str, options: &FetchOptions)
    -> Result<FetchResponse, ProviderError>;
}

/// Fetcher implementation backed by reqwest
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> Result<FetchResponse, ProviderError> {
        debug!("Fetching {}", url);

        let mut request = self.client.get(url).timeout(options.timeout);
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                warn!("Request to {} timed out after {:?}", url, options.timeout);
                ProviderError::Network(format!("timed out after {:?}: {}", options.timeout, url))
            } else {
                warn!("Request to {} failed: {}", url, e);
                ProviderError::from(e)
            }
        })?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!("{} responded with status {}", url, status);
        Ok(FetchResponse { status, body })
    }
}
