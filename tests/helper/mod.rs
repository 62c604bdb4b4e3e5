//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use update_sync::config::{EngineConfig, ProviderConfig};
use update_sync::descriptor::HeaderDescriptorSource;
use update_sync::update::cache::Cache;
use update_sync::update::engine::UpdateResolutionEngine;
use update_sync::update::fetcher::HttpFetcher;

/// Create a cache backed by a fresh database in a temporary directory
pub fn create_test_cache() -> (TempDir, Arc<Cache>) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let cache = Cache::new(&db_path).unwrap();
    (temp_dir, Arc::new(cache))
}

/// Engine config whose GitHub and GitLab API requests go to `api_base`
pub fn config_for_server(api_base: &str, ttl_seconds: u64) -> EngineConfig {
    let mut config = EngineConfig::default();
    config.cache.ttl_seconds = ttl_seconds;
    config.providers.github = ProviderConfig {
        api_base_url: Some(api_base.to_string()),
        access_token: None,
    };
    config.providers.gitlab = ProviderConfig {
        api_base_url: Some(api_base.to_string()),
        access_token: None,
    };
    config
}

/// Create an engine with the real HTTP fetcher and header reader
pub fn create_test_engine(cache: Arc<Cache>, config: &EngineConfig) -> UpdateResolutionEngine<Cache> {
    UpdateResolutionEngine::new(
        cache,
        Arc::new(HttpFetcher::new(&config.fetch.user_agent).unwrap()),
        Arc::new(HeaderDescriptorSource::new()),
        config,
    )
}

/// Write `<root>/<slug>/<slug>.php` with a plugin header
pub fn write_plugin(root: &Path, slug: &str, version: &str, update_uri: Option<&str>) -> PathBuf {
    let dir = root.join(slug);
    fs::create_dir_all(&dir).unwrap();

    let mut header = format!("<?php\n/**\n * Plugin Name: {}\n * Version: {}\n", slug, version);
    if let Some(uri) = update_uri {
        header.push_str(&format!(" * Update URI: {}\n", uri));
    }
    header.push_str(" */\n");

    let path = dir.join(format!("{}.php", slug));
    fs::write(&path, header).unwrap();
    path
}

/// A GitHub "latest release" payload
pub fn github_release(tag: &str, asset: Option<&str>) -> String {
    let assets = match asset {
        Some(url) => format!(r#"[{{"browser_download_url": "{}"}}]"#, url),
        None => "[]".to_string(),
    };
    format!(
        r#"{{"tag_name": "{}", "html_url": "https://github.com/owner/repo/releases/tag/{}", "zipball_url": "https://api.github.com/repos/owner/repo/zipball/{}", "assets": {}}}"#,
        tag, tag, tag, assets
    )
}
