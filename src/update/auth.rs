//! Authorization for package downloads

use std::collections::BTreeMap;

use tracing::debug;

use crate::update::fetcher::FetchOptions;
use crate::update::types::UpdateManifest;

/// Adds a manifest's authorization headers to the download request of its package.
///
/// An injector is built for one download and consumed by [`inject`](Self::inject).
#[derive(Debug, Clone)]
pub struct AuthHeaderInjector {
    slug: String,
    auth_header: Option<BTreeMap<String, String>>,
}

impl AuthHeaderInjector {
    pub fn for_manifest(manifest: &UpdateManifest) -> Self {
        Self {
            slug: manifest.slug.clone(),
            auth_header: manifest.auth_header.clone(),
        }
    }

    /// Merge the authorization headers into `options` when `url` refers to the package.
    ///
    /// Returns `options` unchanged if the manifest carries no authorization or
    /// the URL does not mention the package slug.
    pub fn inject(self, mut options: FetchOptions, url: &str) -> FetchOptions {
        let Some(auth_header) = self.auth_header else {
            return options;
        };
        if self.slug.is_empty() || !url.contains(&self.slug) {
            return options;
        }

        debug!("Adding authorization for {} download", self.slug);
        for (name, value) in auth_header {
            options
                .headers
                .retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
            options.headers.insert(name, value);
        }
        options
    }
}
