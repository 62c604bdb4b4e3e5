//! Descriptor source trait definition

use std::path::Path;

use crate::descriptor::types::LocalDescriptor;

/// Trait for reading the local descriptor of an installed package
pub trait DescriptorSource: Send + Sync {
    /// Read the descriptor for the package whose primary file is `path`
    fn read(&self, path: &Path) -> Result<LocalDescriptor, DescriptorError>;
}

/// Error type for descriptor reading
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    /// The primary file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The header declares no version
    #[error("No Version header in {0}")]
    MissingVersion(String),

    /// The path has no parent directory to derive a slug from
    #[error("Cannot derive package slug from {0}")]
    NoSlug(String),
}
