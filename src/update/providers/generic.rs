//! Pass-through adapter for update sources that already serve a manifest
//!
//! The update source URL is queried as-is and is expected to answer with an
//! update-api style object:
//!
//! ```json
//! {
//!   "version": "1.4.0",
//!   "download_link": "https://example.com/my-plugin-1.4.0.zip",
//!   "tested": "6.5",
//!   "requires": "6.0",
//!   "requires_php": "8.0",
//!   "icons": {"1x": "https://example.com/icon.png"},
//!   "git": "bitbucket"
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

use crate::descriptor::LocalDescriptor;
use crate::update::error::ProviderError;
use crate::update::fetcher::FetchResponse;
use crate::update::provider::{ProviderAdapter, decode_body, source_parts, source_url};
use crate::update::types::UpdateManifest;

pub const PROVIDER_ID: &str = "generic";

#[derive(Debug, Deserialize)]
struct Payload {
    version: String,
    #[serde(default)]
    download_link: String,
    #[serde(default)]
    tested: String,
    #[serde(default)]
    requires: String,
    #[serde(default)]
    requires_php: String,
    #[serde(default, alias = "url")]
    homepage: String,
    #[serde(default, deserialize_with = "string_map")]
    icons: Option<BTreeMap<String, String>>,
    #[serde(default, deserialize_with = "string_map")]
    banners: Option<BTreeMap<String, String>>,
    #[serde(default, deserialize_with = "string_map")]
    auth_header: Option<BTreeMap<String, String>>,
    #[serde(default)]
    git: Option<String>,
}

/// Accept an object of strings; anything else (`[]`, `null`) means absent.
fn string_map<'de, D>(deserializer: D) -> Result<Option<BTreeMap<String, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let map = match value {
        serde_json::Value::Object(object) => object
            .into_iter()
            .filter_map(|(key, value)| match value {
                serde_json::Value::String(s) => Some((key, s)),
                _ => None,
            })
            .collect::<BTreeMap<_, _>>(),
        _ => return Ok(None),
    };
    Ok((!map.is_empty()).then_some(map))
}

/// Fallback adapter used when no provider matches the update source host
#[derive(Debug, Clone, Default)]
pub struct GenericAdapter;

impl ProviderAdapter for GenericAdapter {
    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    fn build_query_url(&self, local: &LocalDescriptor) -> Result<String, ProviderError> {
        let source = source_url(local)?;
        source_parts(source)?;
        Ok(source.to_string())
    }

    fn normalize(
        &self,
        local: &LocalDescriptor,
        response: &FetchResponse,
    ) -> Result<UpdateManifest, ProviderError> {
        let payload: Payload = decode_body(PROVIDER_ID, local, response)?;
        let provider_id = payload.git.as_deref().unwrap_or(PROVIDER_ID);

        Ok(UpdateManifest {
            tested: payload.tested,
            requires: payload.requires,
            requires_php: payload.requires_php,
            homepage: payload.homepage,
            icons: payload.icons,
            banners: payload.banners,
            auth_header: payload.auth_header,
            ..UpdateManifest::new(local, provider_id, &payload.version, payload.download_link)
        })
    }

    fn request_headers(&self) -> BTreeMap<String, String> {
        BTreeMap::from([("Accept".to_string(), "application/json".to_string())])
    }
}
