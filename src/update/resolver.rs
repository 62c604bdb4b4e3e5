//! Provider selection by update source host

use std::sync::Arc;

use tracing::debug;

use crate::config::ProvidersConfig;
use crate::update::error::ProviderError;
use crate::update::provider::{ProviderAdapter, source_parts};
use crate::update::providers::{GenericAdapter, GitHubAdapter, GitLabAdapter};

/// Host pattern of a registered provider.
///
/// - `github.com` matches that host exactly
/// - `*.example.com` matches `example.com` and any subdomain of it
/// - `gitlab.*` matches any host whose first label is `gitlab`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPattern(String);

impl HostPattern {
    pub fn new(pattern: &str) -> Self {
        Self(pattern.to_ascii_lowercase())
    }

    pub fn matches(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        let pattern = self.0.as_str();

        if let Some(domain) = pattern.strip_prefix("*.") {
            host == domain || host.ends_with(&format!(".{}", domain))
        } else if let Some(label) = pattern.strip_suffix(".*") {
            host.strip_prefix(label)
                .is_some_and(|rest| rest.starts_with('.') && rest.len() > 1)
        } else {
            host == pattern
        }
    }
}

/// Selects the provider adapter for an update source URL.
///
/// Registered patterns are tried in order and the first match wins; hosts
/// matching no pattern are served by the fallback adapter.
pub struct ProviderResolver {
    providers: Vec<(HostPattern, Arc<dyn ProviderAdapter>)>,
    fallback: Arc<dyn ProviderAdapter>,
}

impl ProviderResolver {
    /// Create a resolver with no registered providers
    pub fn new(fallback: Arc<dyn ProviderAdapter>) -> Self {
        Self {
            providers: Vec::new(),
            fallback,
        }
    }

    /// Create the default resolver for GitHub and GitLab hosts
    pub fn from_config(config: &ProvidersConfig) -> Self {
        let mut github = GitHubAdapter::new();
        if let Some(base) = &config.github.api_base_url {
            github = github.with_api_base(base);
        }
        if let Some(token) = &config.github.access_token {
            github = github.with_access_token(token);
        }

        let mut gitlab = GitLabAdapter::new();
        if let Some(base) = &config.gitlab.api_base_url {
            gitlab = gitlab.with_api_base(base);
        }
        if let Some(token) = &config.gitlab.access_token {
            gitlab = gitlab.with_access_token(token);
        }

        let github: Arc<dyn ProviderAdapter> = Arc::new(github);
        let gitlab: Arc<dyn ProviderAdapter> = Arc::new(gitlab);

        Self::new(Arc::new(GenericAdapter))
            .register(HostPattern::new("github.com"), github.clone())
            .register(HostPattern::new("www.github.com"), github)
            .register(HostPattern::new("gitlab.*"), gitlab)
    }

    /// Append a provider to the lookup table
    pub fn register(mut self, pattern: HostPattern, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.providers.push((pattern, adapter));
        self
    }

    /// Find the registered adapter for `update_source_url`.
    ///
    /// Fails with `UnknownProvider` when no pattern matches the host.
    pub fn resolve_strict(
        &self,
        update_source_url: &str,
    ) -> Result<Arc<dyn ProviderAdapter>, ProviderError> {
        let (url, _) = source_parts(update_source_url)?;
        let host = url.host_str().unwrap_or_default();

        self.providers
            .iter()
            .find(|(pattern, _)| pattern.matches(host))
            .map(|(_, adapter)| adapter.clone())
            .ok_or_else(|| ProviderError::UnknownProvider(host.to_string()))
    }

    /// Find the adapter for `update_source_url`, falling back to pass-through
    /// for unknown hosts. Only a malformed URL is an error.
    pub fn resolve(
        &self,
        update_source_url: &str,
    ) -> Result<Arc<dyn ProviderAdapter>, ProviderError> {
        match self.resolve_strict(update_source_url) {
            Err(ProviderError::UnknownProvider(host)) => {
                debug!(
                    "No provider registered for {}, using {} adapter",
                    host,
                    self.fallback.provider_id()
                );
                Ok(self.fallback.clone())
            }
            result => result,
        }
    }
}

impl Default for ProviderResolver {
    fn default() -> Self {
        Self::from_config(&ProvidersConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("github.com", "github.com", true)]
    #[case("github.com", "GitHub.com", true)]
    #[case("github.com", "api.github.com", false)]
    #[case("*.example.com", "example.com", true)]
    #[case("*.example.com", "git.example.com", true)]
    #[case("*.example.com", "badexample.com", false)]
    #[case("gitlab.*", "gitlab.com", true)]
    #[case("gitlab.*", "gitlab.example.org", true)]
    #[case("gitlab.*", "gitlabs.com", false)]
    #[case("gitlab.*", "gitlab", false)]
    fn host_pattern_matches(#[case] pattern: &str, #[case] host: &str, #[case] expected: bool) {
        assert_eq!(HostPattern::new(pattern).matches(host), expected);
    }

    #[rstest]
    #[case("https://github.com/owner/repo", "github")]
    #[case("https://www.github.com/owner/repo", "github")]
    #[case("https://gitlab.com/group/project", "gitlab")]
    #[case("https://gitlab.example.com/group/project", "gitlab")]
    #[case("https://updates.example.com/api/my-plugin", "generic")]
    fn resolve_selects_adapter_by_host(#[case] url: &str, #[case] expected: &str) {
        let resolver = ProviderResolver::default();

        assert_eq!(resolver.resolve(url).unwrap().provider_id(), expected);
    }

    #[test]
    fn resolve_strict_reports_unknown_provider() {
        let resolver = ProviderResolver::default();

        let result = resolver.resolve_strict("https://bitbucket.org/owner/repo");

        assert!(matches!(
            result,
            Err(ProviderError::UnknownProvider(host)) if host == "bitbucket.org"
        ));
    }

    #[test]
    fn resolve_rejects_malformed_url() {
        let resolver = ProviderResolver::default();

        assert!(matches!(
            resolver.resolve("not a url"),
            Err(ProviderError::InvalidSourceUrl(_))
        ));
    }

    #[test]
    fn first_registered_pattern_wins() {
        let resolver = ProviderResolver::new(Arc::new(GenericAdapter))
            .register(HostPattern::new("*.example.com"), Arc::new(GitLabAdapter::new()))
            .register(HostPattern::new("git.example.com"), Arc::new(GitHubAdapter::new()));

        assert_eq!(
            resolver
                .resolve("https://git.example.com/a/b")
                .unwrap()
                .provider_id(),
            "gitlab"
        );
    }
}
