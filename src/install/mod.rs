//! Install-time remapping of extracted package archives
//!
//! Hosting providers name archive folders after the repository and ref
//! (`owner-repo-abc123`), while the host expects the package slug. The
//! remapper moves the extracted folder into place before installation.

pub mod hook;
pub mod remap;

pub use hook::{HookExtra, SourceSelection, select_source};
pub use remap::{ArchiveSourceRemapper, DirMover, FsMover, RemapError};
