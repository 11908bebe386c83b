//! Header discovery
//!
//! Lists the entries of one search path whose file names match the header
//! pattern. Only the directory itself is scanned, never its subdirectories.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Result, SyncError};
use crate::pattern::Pattern;

/// Return the matching entries of `search_path`, sorted by file name.
///
/// A missing or unreadable search path is an error rather than an empty
/// result, so a typo in the configuration does not silently produce an
/// incomplete include directory.
pub fn discover_headers(search_path: &Path, pattern: &Pattern) -> Result<Vec<PathBuf>> {
    if !search_path.is_dir() {
        return Err(SyncError::ReadSource {
            path: search_path.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "search path is not a directory",
            ),
        });
    }

    let mut headers = Vec::new();
    for entry in WalkDir::new(search_path)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if pattern.matches(&entry.file_name().to_string_lossy()) {
            headers.push(entry.into_path());
        }
    }

    tracing::debug!(
        search_path = %search_path.display(),
        found = headers.len(),
        "Discovered headers"
    );
    Ok(headers)
}
