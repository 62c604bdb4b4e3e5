use thiserror::Error;

use crate::descriptor::DescriptorError;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Failed to (de)serialize cached manifest: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache connection lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Remote repository not found: {0}")]
    RemoteRepoNotFound(String),

    #[error("Unknown provider for {0}")]
    UnknownProvider(String),

    #[error("Invalid update source URL: {0}")]
    InvalidSourceUrl(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::Network(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("No update source declared")]
    MissingUpdateSource,

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),
}

impl ResolveError {
    /// A package without an update source simply has no update to offer
    pub fn is_missing_update_source(&self) -> bool {
        matches!(self, ResolveError::MissingUpdateSource)
    }
}
