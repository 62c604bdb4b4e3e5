//! Common types for local descriptors

use serde::{Deserialize, Serialize};

/// Kind of installable package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageKind {
    Plugin,
    Theme,
}

impl PackageKind {
    /// Returns the string representation of the package kind
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageKind::Plugin => "plugin",
            PackageKind::Theme => "theme",
        }
    }
}

impl std::str::FromStr for PackageKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plugin" => Ok(PackageKind::Plugin),
            "theme" => Ok(PackageKind::Theme),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for PackageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Version metadata of an installed package, read once per resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDescriptor {
    /// Package file identifier relative to the install root (e.g. "my-plugin/my-plugin.php")
    pub package_file: String,
    /// Directory name of the package
    pub slug: String,
    /// Installed version from the `Version` header
    pub local_version: String,
    /// Declared `Update URI`, if any
    pub update_source_url: Option<String>,
    pub kind: PackageKind,
}

impl LocalDescriptor {
    pub fn new(
        package_file: impl Into<String>,
        slug: impl Into<String>,
        local_version: impl Into<String>,
        update_source_url: Option<String>,
        kind: PackageKind,
    ) -> Self {
        Self {
            package_file: package_file.into(),
            slug: slug.into(),
            local_version: local_version.into(),
            update_source_url,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PackageKind::Plugin, "plugin")]
    #[case(PackageKind::Theme, "theme")]
    fn package_kind_as_str_round_trips_through_from_str(
        #[case] kind: PackageKind,
        #[case] expected: &str,
    ) {
        assert_eq!(kind.as_str(), expected);
        assert_eq!(expected.parse::<PackageKind>(), Ok(kind));
    }

    #[test]
    fn package_kind_from_str_rejects_unknown_kind() {
        assert!("mu-plugin".parse::<PackageKind>().is_err());
    }
}
