//! GitHub Releases API adapter

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::descriptor::LocalDescriptor;
use crate::update::error::ProviderError;
use crate::update::fetcher::FetchResponse;
use crate::update::provider::{ProviderAdapter, decode_body, source_parts, source_url};
use crate::update::types::UpdateManifest;

pub const PROVIDER_ID: &str = "github";

/// Response from the GitHub "latest release" endpoint
#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
    #[serde(default)]
    assets: Vec<Asset>,
    #[serde(default)]
    zipball_url: Option<String>,
    #[serde(default)]
    html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Asset {
    browser_download_url: String,
}

/// Adapter for `https://github.com/{owner}/{repo}` update sources
#[derive(Debug, Clone, Default)]
pub struct GitHubAdapter {
    api_base: Option<String>,
    access_token: Option<String>,
}

impl GitHubAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed API base instead of `https://api.<host>`
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = Some(api_base.trim_end_matches('/').to_string());
        self
    }

    /// Authenticate API requests and downloads with a personal access token
    pub fn with_access_token(mut self, token: &str) -> Self {
        self.access_token = Some(token.to_string());
        self
    }

    fn auth_header(&self) -> Option<BTreeMap<String, String>> {
        self.access_token.as_ref().map(|token| {
            BTreeMap::from([("Authorization".to_string(), format!("token {}", token))])
        })
    }
}

impl ProviderAdapter for GitHubAdapter {
    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    fn build_query_url(&self, local: &LocalDescriptor) -> Result<String, ProviderError> {
        let source = source_url(local)?;
        let (url, segments) = source_parts(source)?;

        let [owner, repo, ..] = segments.as_slice() else {
            return Err(ProviderError::InvalidSourceUrl(format!(
                "{}: expected https://<host>/<owner>/<repo>",
                source
            )));
        };

        let api_base = match &self.api_base {
            Some(base) => base.clone(),
            None => {
                let host = url.host_str().unwrap_or_default();
                let host = host.strip_prefix("www.").unwrap_or(host);
                format!("{}://api.{}", url.scheme(), host)
            }
        };

        Ok(format!("{}/repos/{}/{}/releases/latest", api_base, owner, repo))
    }

    fn normalize(
        &self,
        local: &LocalDescriptor,
        response: &FetchResponse,
    ) -> Result<UpdateManifest, ProviderError> {
        let release: Release = decode_body(PROVIDER_ID, local, response)?;

        let download_link = release
            .assets
            .into_iter()
            .next()
            .map(|asset| asset.browser_download_url)
            .or(release.zipball_url)
            .unwrap_or_default();

        Ok(UpdateManifest {
            homepage: release.html_url.unwrap_or_default(),
            auth_header: self.auth_header(),
            ..UpdateManifest::new(local, PROVIDER_ID, &release.tag_name, download_link)
        })
    }

    fn request_headers(&self) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::from([(
            "Accept".to_string(),
            "application/vnd.github+json".to_string(),
        )]);
        if let Some(auth) = self.auth_header() {
            headers.extend(auth);
        }
        headers
    }
}
