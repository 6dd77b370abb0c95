//! Error taxonomy for a deployment run
//!
//! Only [`DeployError::UserDirectoryNotFound`] aborts a run. Every other
//! variant is reported as a warning and skips the step that produced it.

use crate::types::ResourceGroup;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("Maya user directory not found at {}", path.display())]
    UserDirectoryNotFound { path: PathBuf },

    #[error("{group} source not found at {}", path.display())]
    MissingSourceBundle { group: ResourceGroup, path: PathBuf },

    #[error("No installed Maya version was detected")]
    VersionNotDetected,

    #[error("No {product} executable could be resolved")]
    ExecutableNotFound { product: String },

    #[error("Failed to copy {group} into {}: {reason}", path.display())]
    CopyFailed {
        group: ResourceGroup,
        path: PathBuf,
        reason: String,
    },

    #[error("Failed to write module manifest {}: {reason}", path.display())]
    ManifestWriteFailed { path: PathBuf, reason: String },

    #[error("Failed to start {}: {reason}", path.display())]
    LaunchFailed { path: PathBuf, reason: String },

    #[error("Invalid version token '{0}': expected exactly 4 digits")]
    InvalidVersionToken(String),
}

impl DeployError {
    /// Whether this error aborts the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(self, DeployError::UserDirectoryNotFound { .. })
    }
}
