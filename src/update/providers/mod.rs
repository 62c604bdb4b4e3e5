//! Provider adapter implementations

pub mod generic;
pub mod github;
pub mod gitlab;

pub use generic::GenericAdapter;
pub use github::GitHubAdapter;
pub use gitlab::GitLabAdapter;
