//! Provider-agnostic update types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::descriptor::{LocalDescriptor, PackageKind};
use crate::update::semver::{is_newer, normalize_version};

/// Normalized description of the latest remote release of a package.
///
/// Built once by a provider adapter and never mutated afterwards. Optional
/// text fields are empty strings rather than absent so the shape stays total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateManifest {
    pub slug: String,
    pub package_type: PackageKind,
    pub provider_id: String,
    /// Version token without a leading `v`
    pub remote_version: String,
    /// Empty, or a fetchable URL
    pub download_link: String,
    /// Host version the release was tested up to
    pub tested: String,
    /// Minimum host version
    pub requires: String,
    /// Minimum PHP version
    pub requires_php: String,
    /// Release or project page
    pub homepage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icons: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banners: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_header: Option<BTreeMap<String, String>>,
}

impl UpdateManifest {
    /// Create a manifest for `local` with every optional field at its default
    pub fn new(
        local: &LocalDescriptor,
        provider_id: &str,
        remote_version: &str,
        download_link: impl Into<String>,
    ) -> Self {
        Self {
            slug: local.slug.clone(),
            package_type: local.kind,
            provider_id: provider_id.to_string(),
            remote_version: normalize_version(remote_version).to_string(),
            download_link: download_link.into(),
            tested: String::new(),
            requires: String::new(),
            requires_php: String::new(),
            homepage: String::new(),
            icons: None,
            banners: None,
            auth_header: None,
        }
    }
}

/// Outcome of one resolution pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateDecision {
    pub has_update: bool,
    pub manifest: UpdateManifest,
}

impl UpdateDecision {
    /// Gate `manifest` against the locally installed version
    pub fn decide(manifest: UpdateManifest, local_version: &str) -> Self {
        Self {
            has_update: is_newer(&manifest.remote_version, local_version),
            manifest,
        }
    }

    /// Project the decision into the record a host update list expects.
    ///
    /// Returns `None` when the installed version is current.
    pub fn to_update_offer(&self, local: &LocalDescriptor) -> Option<UpdateOffer> {
        if !self.has_update {
            return None;
        }

        let manifest = &self.manifest;
        let package_key = match manifest.package_type {
            PackageKind::Plugin => local.package_file.clone(),
            PackageKind::Theme => manifest.slug.clone(),
        };
        let url = if manifest.homepage.is_empty() {
            manifest.slug.clone()
        } else {
            manifest.homepage.clone()
        };

        Some(UpdateOffer {
            slug: manifest.slug.clone(),
            package_key,
            new_version: manifest.remote_version.clone(),
            package: manifest.download_link.clone(),
            tested: manifest.tested.clone(),
            requires: manifest.requires.clone(),
            requires_php: manifest.requires_php.clone(),
            url,
        })
    }
}

/// Host-facing update record for a package with a newer release
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateOffer {
    pub slug: String,
    /// Key of the entry in the host's update list (plugin file or theme slug)
    pub package_key: String,
    pub new_version: String,
    /// Download URL; empty when automatic update is unavailable
    pub package: String,
    pub tested: String,
    pub requires: String,
    pub requires_php: String,
    pub url: String,
}
