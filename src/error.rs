use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Unrecoverable failures of a sync, clean or status pass.
///
/// Failures to delete stale files from the target directory are not part of
/// this type: they are collected per entry in a [`crate::CleanupReport`].
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Failed to create target directory {}: {source}", path.display())]
    CreateTarget { path: PathBuf, source: io::Error },

    #[error("Failed to read target directory {}: {source}", path.display())]
    ReadTarget { path: PathBuf, source: io::Error },

    #[error("Failed to read source directory {}: {source}", path.display())]
    ReadSource { path: PathBuf, source: io::Error },

    #[error("Link already exists: {}", link.display())]
    LinkExists { link: PathBuf },

    #[error("Failed to create symlink {}: {source}", link.display())]
    CreateLink { link: PathBuf, source: io::Error },

    #[error("Failed to remove symlink {}: {source}", link.display())]
    RemoveLink { link: PathBuf, source: io::Error },

    #[error("Cannot calculate relative path from {} to {}", from.display(), to.display())]
    RelativePath { from: PathBuf, to: PathBuf },

    #[error("Invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl From<walkdir::Error> for SyncError {
    fn from(e: walkdir::Error) -> Self {
        let path = e.path().map(PathBuf::from).unwrap_or_default();
        SyncError::ReadSource {
            path,
            source: e.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
