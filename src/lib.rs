//! Update resolution for git-hosted plugins and themes.
//!
//! - [`descriptor`]: reads the local version metadata of an installed package
//! - [`update`]: provider lookup, manifest normalization, caching and version gating
//! - [`install`]: remaps an extracted archive folder onto the package slug
//! - [`config`]: engine configuration and data paths
//! - [`logging`]: tracing setup for hosts

pub mod config;
pub mod descriptor;
pub mod install;
pub mod logging;
pub mod update;
