//! Update resolution pass for a single installed package

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::descriptor::{DescriptorSource, LocalDescriptor};
use crate::update::cache::{ManifestStore, cache_key};
use crate::update::error::{ProviderError, ResolveError};
use crate::update::fetcher::{FetchOptions, Fetcher};
use crate::update::resolver::ProviderResolver;
use crate::update::types::{UpdateDecision, UpdateManifest};

/// Resolves whether a newer release of a package exists.
///
/// One call runs validate, cache lookup, fetch on miss and compare, in that
/// order. A pass performs at most one network request and writes the cache
/// only after a successful fetch.
pub struct UpdateResolutionEngine<S: ManifestStore> {
    store: Arc<S>,
    fetcher: Arc<dyn Fetcher>,
    descriptors: Arc<dyn DescriptorSource>,
    resolver: ProviderResolver,
    ttl: Duration,
    timeout: Duration,
    request_headers: BTreeMap<String, String>,
}

impl<S: ManifestStore> UpdateResolutionEngine<S> {
    pub fn new(
        store: Arc<S>,
        fetcher: Arc<dyn Fetcher>,
        descriptors: Arc<dyn DescriptorSource>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            store,
            fetcher,
            descriptors,
            resolver: ProviderResolver::from_config(&config.providers),
            ttl: config.cache.ttl(),
            timeout: config.fetch.timeout(),
            request_headers: BTreeMap::new(),
        }
    }

    /// Replace the provider resolver
    pub fn with_resolver(mut self, resolver: ProviderResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Headers sent with every release request; provider headers never override them
    pub fn with_request_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.request_headers = headers;
        self
    }

    /// Read the descriptor of the package whose primary file is `path` and resolve it
    pub async fn resolve_package(&self, path: &Path) -> Result<UpdateDecision, ResolveError> {
        let local = self.descriptors.read(path)?;
        self.resolve_update(&local).await
    }

    /// Resolve the update decision for `local`
    pub async fn resolve_update(
        &self,
        local: &LocalDescriptor,
    ) -> Result<UpdateDecision, ResolveError> {
        let Some(source_url) = local.update_source_url.as_deref() else {
            debug!("{} declares no update source", local.package_file);
            return Err(ResolveError::MissingUpdateSource);
        };

        let key = cache_key(&local.package_file);
        let manifest = match self.store.get(&key)? {
            Some(entry) => {
                debug!("Cache hit for {} (expires {})", key, entry.expires_at);
                entry.manifest
            }
            None => {
                debug!("Cache miss for {}", key);
                let manifest = self.fetch_manifest(local, source_url).await?;
                self.store.set(&key, &manifest, self.ttl)?;
                manifest
            }
        };

        let decision = UpdateDecision::decide(manifest, &local.local_version);
        if decision.has_update {
            info!(
                "Update available for {}: {} -> {}",
                local.package_file, local.local_version, decision.manifest.remote_version
            );
        } else {
            debug!(
                "No update for {}: installed {}, remote {}",
                local.package_file, local.local_version, decision.manifest.remote_version
            );
        }

        Ok(decision)
    }

    async fn fetch_manifest(
        &self,
        local: &LocalDescriptor,
        source_url: &str,
    ) -> Result<UpdateManifest, ProviderError> {
        let adapter = self.resolver.resolve(source_url)?;
        let provider_id = adapter.provider_id().to_string();
        let url = adapter.build_query_url(local)?;

        let mut options = FetchOptions::new(self.timeout);
        options.headers = self.request_headers.clone();
        options.merge_headers(adapter.request_headers());

        let response = self.fetcher.fetch(&url, &options).await.inspect_err(|e| {
            warn!("Failed to fetch {} release from {}: {}", provider_id, url, e);
        })?;

        adapter.normalize(local, &response).inspect_err(|e| match e {
            ProviderError::MalformedResponse(_) => {
                warn!("Malformed {} response from {}: {}", provider_id, url, e)
            }
            _ => warn!("{} rejected {}: {}", provider_id, url, e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{DescriptorError, PackageKind};
    use crate::update::cache::{CacheEntry, MockManifestStore};
    use crate::update::fetcher::{FetchResponse, MockFetcher};

    struct NoDescriptors;

    impl DescriptorSource for NoDescriptors {
        fn read(&self, path: &Path) -> Result<LocalDescriptor, DescriptorError> {
            Err(DescriptorError::NoSlug(path.display().to_string()))
        }
    }

    fn local(version: &str, source: Option<&str>) -> LocalDescriptor {
        LocalDescriptor::new(
            "my-plugin/my-plugin.php",
            "my-plugin",
            version,
            source.map(str::to_string),
            PackageKind::Plugin,
        )
    }

    fn engine(store: MockManifestStore, fetcher: MockFetcher) -> UpdateResolutionEngine<MockManifestStore> {
        UpdateResolutionEngine::new(
            Arc::new(store),
            Arc::new(fetcher),
            Arc::new(NoDescriptors),
            &EngineConfig::default(),
        )
    }

    const RELEASE: &str = r#"{"tag_name": "v2.1.0", "assets": [{"browser_download_url": "https://x/a.zip"}]}"#;

    #[tokio::test]
    async fn missing_update_source_short_circuits() {
        let mut store = MockManifestStore::new();
        store.expect_get().never();
        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch().never();

        let result = engine(store, fetcher).resolve_update(&local("2.0.0", None)).await;

        assert!(matches!(result, Err(ResolveError::MissingUpdateSource)));
    }

    #[tokio::test]
    async fn cache_miss_fetches_normalizes_and_caches_once() {
        let mut store = MockManifestStore::new();
        store
            .expect_get()
            .withf(|key| key == "updatesync_my-plugin/my-plugin.php")
            .times(1)
            .returning(|_| Ok(None));
        store
            .expect_set()
            .withf(|key, manifest, ttl| {
                key == "updatesync_my-plugin/my-plugin.php"
                    && manifest.remote_version == "2.1.0"
                    && *ttl == Duration::from_secs(300)
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|url, options| {
                url == "https://api.github.com/repos/owner/my-plugin/releases/latest"
                    && options.headers.get("Accept").map(String::as_str)
                        == Some("application/vnd.github+json")
                    && options.timeout == Duration::from_secs(15)
            })
            .times(1)
            .returning(|_, _| Ok(FetchResponse::new(200, RELEASE)));

        let decision = engine(store, fetcher)
            .resolve_update(&local("2.0.0", Some("https://github.com/owner/my-plugin")))
            .await
            .unwrap();

        assert!(decision.has_update);
        assert_eq!(decision.manifest.remote_version, "2.1.0");
        assert_eq!(decision.manifest.download_link, "https://x/a.zip");
    }

    #[tokio::test]
    async fn cache_hit_skips_network() {
        let local = local("2.1.0", Some("https://github.com/owner/my-plugin"));
        let cached = UpdateManifest::new(&local, "github", "2.1.0", "https://x/a.zip");
        let entry = CacheEntry {
            key: "updatesync_my-plugin/my-plugin.php".to_string(),
            manifest: cached.clone(),
            expires_at: chrono::Utc::now(),
        };

        let mut store = MockManifestStore::new();
        store
            .expect_get()
            .times(1)
            .returning(move |_| Ok(Some(entry.clone())));
        store.expect_set().never();
        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch().never();

        let decision = engine(store, fetcher).resolve_update(&local).await.unwrap();

        assert!(!decision.has_update);
        assert_eq!(decision.manifest, cached);
    }

    #[tokio::test]
    async fn failed_fetch_is_not_cached() {
        let mut store = MockManifestStore::new();
        store.expect_get().returning(|_| Ok(None));
        store.expect_set().never();
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .times(1)
            .returning(|_, _| Err(ProviderError::Network("timed out".to_string())));

        let result = engine(store, fetcher)
            .resolve_update(&local("2.0.0", Some("https://github.com/owner/my-plugin")))
            .await;

        assert!(matches!(
            result,
            Err(ResolveError::Provider(ProviderError::Network(_)))
        ));
    }

    #[tokio::test]
    async fn malformed_response_is_not_cached() {
        let mut store = MockManifestStore::new();
        store.expect_get().returning(|_| Ok(None));
        store.expect_set().never();
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|_, _| Ok(FetchResponse::new(200, "")));

        let result = engine(store, fetcher)
            .resolve_update(&local("2.0.0", Some("https://github.com/owner/my-plugin")))
            .await;

        assert!(matches!(
            result,
            Err(ResolveError::Provider(ProviderError::MalformedResponse(_)))
        ));
    }

    #[tokio::test]
    async fn caller_headers_win_over_provider_headers() {
        let mut store = MockManifestStore::new();
        store.expect_get().returning(|_| Ok(None));
        store.expect_set().returning(|_, _, _| Ok(()));
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|_, options| {
                options.headers.get("Accept").map(String::as_str) == Some("application/json")
            })
            .times(1)
            .returning(|_, _| Ok(FetchResponse::new(200, RELEASE)));

        let engine = engine(store, fetcher).with_request_headers(BTreeMap::from([(
            "Accept".to_string(),
            "application/json".to_string(),
        )]));

        let result = engine
            .resolve_update(&local("2.0.0", Some("https://github.com/owner/my-plugin")))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn resolve_package_propagates_descriptor_errors() {
        let mut store = MockManifestStore::new();
        store.expect_get().never();
        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch().never();

        let result = engine(store, fetcher)
            .resolve_package(Path::new("my-plugin.php"))
            .await;

        assert!(matches!(result, Err(ResolveError::Descriptor(_))));
    }
}
