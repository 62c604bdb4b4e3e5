use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::InstallConfig;
use crate::descriptor::PackageKind;

#[derive(Debug, Error)]
pub enum RemapError {
    #[error("Failed to move {} to {}: {source}", from.display(), to.display())]
    RemapFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid package slug: {0:?}")]
    InvalidSlug(String),
}

/// Moves a directory to a new location
#[cfg_attr(test, automock)]
pub trait DirMover: Send + Sync {
    fn move_dir(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// Filesystem mover.
///
/// A stale directory at the destination is removed first. Moves across
/// devices fall back to copying the tree and deleting the source.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsMover;

impl DirMover for FsMover {
    fn move_dir(&self, from: &Path, to: &Path) -> io::Result<()> {
        if to.exists() && !same_dir(from, to)? {
            debug!("Removing stale directory {}", to.display());
            fs::remove_dir_all(to)?;
        }

        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                debug!(
                    "{} and {} are on different devices, copying",
                    from.display(),
                    to.display()
                );
                copy_dir_all(from, to)?;
                fs::remove_dir_all(from)
            }
            Err(e) => Err(e),
        }
    }
}

/// Whether two existing paths are the same directory entry
#[cfg(unix)]
fn same_dir(a: &Path, b: &Path) -> io::Result<bool> {
    use std::os::unix::fs::MetadataExt;

    let (a, b) = (fs::metadata(a)?, fs::metadata(b)?);
    Ok(a.dev() == b.dev() && a.ino() == b.ino())
}

#[cfg(not(unix))]
fn same_dir(a: &Path, b: &Path) -> io::Result<bool> {
    Ok(fs::canonicalize(a)? == fs::canonicalize(b)?)
}

fn copy_dir_all(from: &Path, to: &Path) -> io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let dest = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &dest)?;
        } else {
            fs::copy(entry.path(), dest)?;
        }
    }
    Ok(())
}

/// Renames an extracted archive folder to the package slug.
pub struct ArchiveSourceRemapper {
    mover: Arc<dyn DirMover>,
    case_insensitive: bool,
}

impl ArchiveSourceRemapper {
    pub fn new(config: &InstallConfig) -> Self {
        Self {
            mover: Arc::new(FsMover),
            case_insensitive: config.case_insensitive_paths,
        }
    }

    /// Replace the directory mover
    pub fn with_mover(mut self, mover: Arc<dyn DirMover>) -> Self {
        self.mover = mover;
        self
    }

    /// Remap `extracted` to a sibling directory named `slug`
    pub fn remap(
        &self,
        extracted: &Path,
        slug: &str,
        kind: PackageKind,
    ) -> Result<PathBuf, RemapError> {
        let extracted = normalize(extracted);
        let parent = extracted.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
        self.remap_into(&extracted, &parent, slug, kind)
    }

    /// Remap `extracted` to `target_parent/slug`.
    ///
    /// Returns the path the package now lives at:
    /// - `extracted` itself when its folder name already equals `slug`
    /// - the target without touching the filesystem when both paths differ
    ///   only by case and case-insensitive paths are enabled
    /// - the target after moving the directory otherwise
    pub fn remap_into(
        &self,
        extracted: &Path,
        target_parent: &Path,
        slug: &str,
        kind: PackageKind,
    ) -> Result<PathBuf, RemapError> {
        validate_slug(slug)?;

        let extracted = normalize(extracted);
        if extracted.file_name().is_some_and(|name| name == slug) {
            debug!("{} already named {}", extracted.display(), slug);
            return Ok(extracted);
        }

        let target = normalize(target_parent).join(slug);
        if self.case_insensitive && eq_ignore_case(&extracted, &target) {
            debug!(
                "{} and {} differ only by case, skipping move",
                extracted.display(),
                target.display()
            );
            return Ok(target);
        }

        self.mover
            .move_dir(&extracted, &target)
            .map_err(|source| {
                warn!(
                    "Failed to remap {} {} to {}: {}",
                    kind,
                    extracted.display(),
                    target.display(),
                    source
                );
                RemapError::RemapFailed {
                    from: extracted.clone(),
                    to: target.clone(),
                    source,
                }
            })?;

        info!(
            "Remapped {} {} to {}",
            kind,
            extracted.display(),
            target.display()
        );
        Ok(target)
    }
}

fn validate_slug(slug: &str) -> Result<(), RemapError> {
    if slug.is_empty() || slug == "." || slug == ".." || slug.contains(['/', '\\']) {
        return Err(RemapError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}

/// Drop trailing separators and `.` components
fn normalize(path: &Path) -> PathBuf {
    path.components().collect()
}

fn eq_ignore_case(a: &Path, b: &Path) -> bool {
    a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
}
