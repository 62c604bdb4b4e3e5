//! GitLab Releases API adapter

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::descriptor::LocalDescriptor;
use crate::update::error::ProviderError;
use crate::update::fetcher::FetchResponse;
use crate::update::provider::{ProviderAdapter, decode_body, source_parts, source_url};
use crate::update::types::UpdateManifest;

pub const PROVIDER_ID: &str = "gitlab";

/// One entry of the GitLab project releases list
#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
    #[serde(default)]
    assets: Assets,
    #[serde(default, rename = "_links")]
    links: Option<ReleaseLinks>,
}

#[derive(Debug, Default, Deserialize)]
struct Assets {
    #[serde(default)]
    links: Vec<AssetLink>,
    #[serde(default)]
    sources: Vec<AssetSource>,
}

#[derive(Debug, Deserialize)]
struct AssetLink {
    url: String,
}

#[derive(Debug, Deserialize)]
struct AssetSource {
    format: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct ReleaseLinks {
    #[serde(default, rename = "self")]
    self_url: Option<String>,
}

/// Adapter for `https://gitlab.<domain>/{namespace}/{project}` update sources
#[derive(Debug, Clone, Default)]
pub struct GitLabAdapter {
    api_base: Option<String>,
    access_token: Option<String>,
}

impl GitLabAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed API base instead of `<scheme>://<host>/api/v4`
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
        self.access_token
            .as_ref()
            .map(|token| BTreeMap::from([("PRIVATE-TOKEN".to_string(), token.clone())]))
    }
}

impl ProviderAdapter for GitLabAdapter {
    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    fn build_query_url(&self, local: &LocalDescriptor) -> Result<String, ProviderError> {
        let source = source_url(local)?;
        let (url, segments) = source_parts(source)?;

        // Project paths end where GitLab's "/-/" route separator begins
        let project: Vec<&str> = segments
            .iter()
            .map(String::as_str)
            .take_while(|segment| *segment != "-")
            .collect();
        if project.len() < 2 {
            return Err(ProviderError::InvalidSourceUrl(format!(
                "{}: expected https://<host>/<namespace>/<project>",
                source
            )));
        }

        let api_base = match &self.api_base {
            Some(base) => base.clone(),
            None => format!(
                "{}://{}/api/v4",
                url.scheme(),
                url.host_str().unwrap_or_default()
            ),
        };
        let encoded = urlencoding::encode(&project.join("/")).into_owned();

        Ok(format!("{}/projects/{}/releases", api_base, encoded))
    }

    /// GitLab lists releases newest first; the first entry is the latest.
    fn normalize(
        &self,
        local: &LocalDescriptor,
        response: &FetchResponse,
    ) -> Result<UpdateManifest, ProviderError> {
        let releases: Vec<Release> = decode_body(PROVIDER_ID, local, response)?;

        let Some(latest) = releases.into_iter().next() else {
            return Err(ProviderError::MalformedResponse(format!(
                "{}: no releases published for {}",
                PROVIDER_ID, local.slug
            )));
        };

        let Assets { links, sources } = latest.assets;
        let download_link = links
            .into_iter()
            .next()
            .map(|link| link.url)
            .or_else(|| {
                sources
                    .into_iter()
                    .find(|source| source.format == "zip")
                    .map(|source| source.url)
            })
            .unwrap_or_default();

        Ok(UpdateManifest {
            homepage: latest
                .links
                .and_then(|links| links.self_url)
                .unwrap_or_default(),
            auth_header: self.auth_header(),
            ..UpdateManifest::new(local, PROVIDER_ID, &latest.tag_name, download_link)
        })
    }

    fn request_headers(&self) -> BTreeMap<String, String> {
        let mut headers =
            BTreeMap::from([("Accept".to_string(), "application/json".to_string())]);
        if let Some(auth) = self.auth_header() {
            headers.extend(auth);
        }
        headers
    }
}
