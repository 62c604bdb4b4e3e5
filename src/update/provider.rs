//! Provider adapter trait for turning release APIs into manifests

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::descriptor::LocalDescriptor;
use crate::update::error::ProviderError;
use crate::update::fetcher::FetchResponse;
use crate::update::types::UpdateManifest;

/// Trait implemented once per hosting provider
pub trait ProviderAdapter: Send + Sync {
    /// Identifier recorded in the manifest (e.g. "github")
    fn provider_id(&self) -> &str;

    /// Build the release API URL for the package's declared update source
    fn build_query_url(&self, local: &LocalDescriptor) -> Result<String, ProviderError>;

    /// Normalize a raw provider response into a manifest
    fn normalize(
        &self,
        local: &LocalDescriptor,
        response: &FetchResponse,
    ) -> Result<UpdateManifest, ProviderError>;

    /// Extra request headers the provider needs.
    ///
    /// These are merged into the caller's headers and never replace them.
    fn request_headers(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }
}

/// Check the status of `response` and decode its JSON body into `T`.
///
/// - 404 or a payload carrying a non-null `error` field: `RemoteRepoNotFound`
/// - any other non-2xx status: `Network`
/// - empty or non-JSON body, or a body of the wrong shape: `MalformedResponse`
pub(crate) fn decode_body<T: DeserializeOwned>(
    provider_id: &str,
    local: &LocalDescriptor,
    response: &FetchResponse,
) -> Result<T, ProviderError> {
    if response.status == 404 {
        return Err(ProviderError::RemoteRepoNotFound(local.slug.clone()));
    }

    if !response.is_success() {
        warn!(
            "{} API returned status {} for {}",
            provider_id, response.status, local.slug
        );
        return Err(ProviderError::Network(format!(
            "Unexpected status: {}",
            response.status
        )));
    }

    if response.body.trim().is_empty() {
        return Err(ProviderError::MalformedResponse(format!(
            "{}: empty body",
            provider_id
        )));
    }

    let value: serde_json::Value = serde_json::from_str(&response.body).map_err(|e| {
        ProviderError::MalformedResponse(format!("{}: body is not JSON: {}", provider_id, e))
    })?;

    if value.get("error").is_some_and(|error| !error.is_null()) {
        return Err(ProviderError::RemoteRepoNotFound(local.slug.clone()));
    }

    serde_json::from_value(value).map_err(|e| {
        ProviderError::MalformedResponse(format!("{}: unexpected shape: {}", provider_id, e))
    })
}

/// Split an update source URL into its host and non-empty path segments.
///
/// A trailing `.git` on the last segment is dropped.
pub(crate) fn source_parts(source_url: &str) -> Result<(url::Url, Vec<String>), ProviderError> {
    let parsed = url::Url::parse(source_url)
        .map_err(|e| ProviderError::InvalidSourceUrl(format!("{}: {}", source_url, e)))?;

    if parsed.host_str().is_none() {
        return Err(ProviderError::InvalidSourceUrl(source_url.to_string()));
    }

    let mut segments: Vec<String> = parsed
        .path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if let Some(last) = segments.last_mut() {
        if let Some(stripped) = last.strip_suffix(".git") {
            *last = stripped.to_string();
        }
    }

    Ok((parsed, segments))
}

/// The declared update source, or `InvalidSourceUrl` when absent
pub(crate) fn source_url(local: &LocalDescriptor) -> Result<&str, ProviderError> {
    local
        .update_source_url
        .as_deref()
        .ok_or_else(|| ProviderError::InvalidSourceUrl(format!("{} has no update source", local.slug)))
}
