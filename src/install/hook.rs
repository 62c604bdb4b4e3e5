use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::descriptor::PackageKind;
use crate::install::remap::{ArchiveSourceRemapper, RemapError};

/// Context the host passes alongside an extracted archive
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct HookExtra {
    /// `install` for a fresh install, `update` otherwise
    pub action: Option<String>,
    /// Package file of the plugin being updated (`my-plugin/my-plugin.php`)
    pub plugin: Option<String>,
    /// Slug of the theme being updated
    pub theme: Option<String>,
}

impl HookExtra {
    pub fn is_fresh_install(&self) -> bool {
        self.action.as_deref() == Some("install")
    }

    /// Slug the installed package is expected to live under
    pub fn expected_slug(&self, kind: PackageKind) -> Option<String> {
        let slug = match kind {
            PackageKind::Plugin => self
                .plugin
                .as_deref()
                .and_then(|file| Path::new(file).parent())
                .and_then(|dir| dir.file_name())
                .map(|name| name.to_string_lossy().into_owned()),
            PackageKind::Theme => self.theme.clone(),
        };
        slug.filter(|slug| !slug.is_empty())
    }
}

/// Arguments of the install-time source selection hook
#[derive(Debug, Clone)]
pub struct SourceSelection {
    pub extracted_path: PathBuf,
    /// Directory the archive was extracted into
    pub remote_source: PathBuf,
    pub kind: PackageKind,
    pub hook_extra: HookExtra,
}

/// Pick the directory the host installs from.
///
/// Fresh installs and selections without a known slug keep the extracted
/// path; updates are remapped into `remote_source/<slug>`.
pub fn select_source(
    remapper: &ArchiveSourceRemapper,
    selection: SourceSelection,
) -> Result<PathBuf, RemapError> {
    if selection.hook_extra.is_fresh_install() {
        debug!(
            "Fresh install of {}, keeping {}",
            selection.kind,
            selection.extracted_path.display()
        );
        return Ok(selection.extracted_path);
    }

    let Some(slug) = selection.hook_extra.expected_slug(selection.kind) else {
        debug!(
            "No {} slug in hook context, keeping {}",
            selection.kind,
            selection.extracted_path.display()
        );
        return Ok(selection.extracted_path);
    };

    remapper.remap_into(
        &selection.extracted_path,
        &selection.remote_source,
        &slug,
        selection.kind,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InstallConfig;
    use crate::install::remap::MockDirMover;
    use rstest::rstest;
    use std::sync::Arc;

    fn selection(kind: PackageKind, hook_extra: HookExtra) -> SourceSelection {
        SourceSelection {
            extracted_path: PathBuf::from("/tmp/upgrade/owner-repo-abc123/"),
            remote_source: PathBuf::from("/tmp/upgrade"),
            kind,
            hook_extra,
        }
    }

    #[rstest]
    #[case(Some("my-plugin/my-plugin.php"), Some("my-plugin"))]
    #[case(Some("hello.php"), None)]
    #[case(None, None)]
    fn expected_plugin_slug_is_package_directory(
        #[case] plugin: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        let extra = HookExtra {
            plugin: plugin.map(str::to_string),
            ..Default::default()
        };

        assert_eq!(
            extra.expected_slug(PackageKind::Plugin).as_deref(),
            expected
        );
    }

    #[test]
    fn hook_extra_deserializes_partial_object() {
        let extra: HookExtra =
            serde_json::from_value(serde_json::json!({ "theme": "my-theme" })).unwrap();

        assert_eq!(extra.theme.as_deref(), Some("my-theme"));
        assert!(!extra.is_fresh_install());
    }

    #[test]
    fn select_source_keeps_path_on_fresh_install() {
        let mut mover = MockDirMover::new();
        mover.expect_move_dir().never();
        let remapper =
            ArchiveSourceRemapper::new(&InstallConfig::default()).with_mover(Arc::new(mover));

        let result = select_source(
            &remapper,
            selection(
                PackageKind::Plugin,
                HookExtra {
                    action: Some("install".to_string()),
                    plugin: Some("my-plugin/my-plugin.php".to_string()),
                    theme: None,
                },
            ),
        )
        .unwrap();

        assert_eq!(result, PathBuf::from("/tmp/upgrade/owner-repo-abc123/"));
    }

    #[test]
    fn select_source_remaps_theme_update_into_remote_source() {
        let mut mover = MockDirMover::new();
        mover
            .expect_move_dir()
            .withf(|from, to| {
                from == Path::new("/tmp/upgrade/owner-repo-abc123")
                    && to == Path::new("/tmp/upgrade/my-theme")
            })
            .times(1)
            .returning(|_, _| Ok(()));
        let remapper =
            ArchiveSourceRemapper::new(&InstallConfig::default()).with_mover(Arc::new(mover));

        let result = select_source(
            &remapper,
            selection(
                PackageKind::Theme,
                HookExtra {
                    action: Some("update".to_string()),
                    plugin: None,
                    theme: Some("my-theme".to_string()),
                },
            ),
        )
        .unwrap();

        assert_eq!(result, PathBuf::from("/tmp/upgrade/my-theme"));
    }

    #[test]
    fn select_source_without_slug_keeps_path() {
        let mut mover = MockDirMover::new();
        mover.expect_move_dir().never();
        let remapper =
            ArchiveSourceRemapper::new(&InstallConfig::default()).with_mover(Arc::new(mover));

        let result = select_source(
            &remapper,
            selection(PackageKind::Plugin, HookExtra::default()),
        )
        .unwrap();

        assert_eq!(result, PathBuf::from("/tmp/upgrade/owner-repo-abc123/"));
    }
}
