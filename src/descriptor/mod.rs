//! Local package metadata
//!
//! Reads the version and declared update source of an installed plugin or
//! theme from the header of its primary file.

pub mod header;
pub mod traits;
pub mod types;

pub use header::HeaderDescriptorSource;
pub use traits::{DescriptorError, DescriptorSource};
pub use types::{LocalDescriptor, PackageKind};
