//! Read-only inspection of an include directory
//!
//! Compares what is in the target directory with what a sync would produce,
//! without changing anything.

use serde::Serialize;
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;

use crate::discover::discover_headers;
use crate::error::{Result, SyncError};
use crate::linker::Linker;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum LinkState {
    /// Link exists and points at the header
    Linked,
    Missing,
    WrongTarget { points_to: String },
    /// Something other than a symlink occupies the name
    NotALink,
    /// Symlink that no discovered header accounts for
    Stale { points_to: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusEntry {
    pub link: String,
    pub header: Option<String>,
    #[serde(flatten)]
    pub state: LinkState,
}

impl StatusEntry {
    pub fn is_problem(&self) -> bool {
        self.state != LinkState::Linked
    }
}

/// Inspect every header the linker would link, then every leftover symlink.
pub fn inspect(linker: &Linker) -> Result<Vec<StatusEntry>> {
    let target = linker.target_dir();
    let mut entries = Vec::new();
    let mut seen: HashSet<OsString> = HashSet::new();

    for search_path in &linker.config().search_paths {
        for header in discover_headers(search_path, linker.pattern())? {
            let Some(name) = header.file_name() else {
                continue;
            };
            let link = target.join(name);
            let expected = linker.link_target_for(&header)?;

            let state = if link.symlink_metadata().is_err() {
                LinkState::Missing
            } else if !link.is_symlink() {
                LinkState::NotALink
            } else {
                match fs::read_link(&link) {
                    Ok(current) if current == expected => LinkState::Linked,
                    Ok(current) => LinkState::WrongTarget {
                        points_to: current.display().to_string(),
                    },
                    Err(e) => {
                        return Err(SyncError::ReadTarget {
                            path: link.clone(),
                            source: e,
                        });
                    }
                }
            };

            seen.insert(name.to_os_string());
            entries.push(StatusEntry {
                link: link.display().to_string(),
                header: Some(header.display().to_string()),
                state,
            });
        }
    }

    if target.is_dir() {
        let read_target = |source: std::io::Error| SyncError::ReadTarget {
            path: target.to_path_buf(),
            source,
        };

        let mut stale = Vec::new();
        for entry in fs::read_dir(target).map_err(read_target)? {
            let entry = entry.map_err(read_target)?;
            let path = entry.path();
            if !path.is_symlink() || seen.contains(&entry.file_name()) {
                continue;
            }
            let points_to = fs::read_link(&path)
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            stale.push(StatusEntry {
                link: path.display().to_string(),
                header: None,
                state: LinkState::Stale { points_to },
            });
        }
        stale.sort_by(|a, b| a.link.cmp(&b.link));
        entries.extend(stale);
    }

    Ok(entries)
}
