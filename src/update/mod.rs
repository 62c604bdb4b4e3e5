//! Update resolution layer
//!
//! Looks up the latest release of a package on its hosting provider, caches
//! the normalized manifest and decides whether it is newer than the
//! installed version.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Resolver   │────▶│  Provider   │────▶│   Fetcher   │
//! │ (host match)│     │ (url, norm) │     │   (HTTP)    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        ▲                   │
//!        │                   ▼
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Engine    │────▶│    Cache    │     │   Semver    │
//! │  (resolve)  │     │  (storage)  │     │ (compare)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`auth`]: Authorization headers for package downloads
//! - [`cache`]: SQLite-based manifest cache with TTL
//! - [`engine`]: The resolution pass (validate, cache, fetch, compare)
//! - [`error`]: Error types for cache, provider and resolution failures
//! - [`fetcher`]: Network fetch trait and reqwest implementation
//! - [`provider`]: Provider adapter trait
//! - [`providers`]: GitHub, GitLab and pass-through adapters
//! - [`resolver`]: Selects the adapter for an update source URL
//! - [`semver`]: Version normalization and comparison
//! - [`types`]: Manifest and decision types

pub mod auth;
pub mod cache;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod provider;
pub mod providers;
pub mod resolver;
pub mod semver;
pub mod types;

pub use auth::AuthHeaderInjector;
pub use cache::{Cache, CacheEntry, ManifestStore, cache_key};
pub use engine::UpdateResolutionEngine;
pub use error::{CacheError, ProviderError, ResolveError};
pub use fetcher::{FetchOptions, FetchResponse, Fetcher, HttpFetcher};
pub use provider::ProviderAdapter;
pub use resolver::{HostPattern, ProviderResolver};
pub use types::{UpdateDecision, UpdateManifest, UpdateOffer};
