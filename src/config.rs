//! Configuration for include directory synchronization
//!
//! A sync is described by a [`SyncConfig`]: the target directory, the ordered
//! search paths and the file-name pattern. Values come from an optional
//! `makeinclude.toml`; anything not set there falls back to the defaults
//! (`include`, `Core` + `UI`, `*.h`).

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::pattern::Pattern;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "makeinclude.toml";

/// Default target directory name
pub const DEFAULT_TARGET_DIR: &str = "include";

/// Default search paths, in iteration order
pub const DEFAULT_SEARCH_PATHS: [&str; 2] = ["Core", "UI"];

/// Default header pattern
pub const DEFAULT_PATTERN: &str = "*.h";

/// What to do when a link name is already taken in the target directory
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// Abort the pass with a `LinkExists` error
    #[default]
    Fail,
    /// Replace an existing symlink; anything else still fails
    Replace,
}

/// Root configuration structure
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Directory that receives the links
    #[serde(default = "default_target_dir")]
    pub target_dir: PathBuf,

    /// Directories scanned for headers, non-recursively
    #[serde(default = "default_search_paths")]
    pub search_paths: Vec<PathBuf>,

    /// File-name glob selecting headers
    #[serde(default = "default_pattern")]
    pub pattern: String,

    #[serde(default)]
    pub on_conflict: ConflictPolicy,

    /// Remove links in the target directory that no header accounts for
    #[serde(default)]
    pub prune_stale: bool,
}

fn default_target_dir() -> PathBuf {
    PathBuf::from(DEFAULT_TARGET_DIR)
}

fn default_search_paths() -> Vec<PathBuf> {
    DEFAULT_SEARCH_PATHS.iter().map(PathBuf::from).collect()
}

fn default_pattern() -> String {
    DEFAULT_PATTERN.to_string()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            target_dir: default_target_dir(),
            search_paths: default_search_paths(),
            pattern: default_pattern(),
            on_conflict: ConflictPolicy::default(),
            prune_stale: false,
        }
    }
}

impl SyncConfig {
    /// Load configuration from a file. Relative paths in the file are
    /// resolved against the directory containing it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: SyncConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.resolved_against(base))
    }

    /// Find configuration file by searching up from the start directory
    pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
        let mut current = start_dir.to_path_buf();

        loop {
            let candidate = current.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                return Some(candidate);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Load the nearest configuration file, or fall back to the defaults
    /// rooted at `start_dir`.
    pub fn locate(start_dir: &Path) -> Result<Self> {
        match Self::find_config(start_dir) {
            Some(path) => {
                tracing::debug!(config = %path.display(), "Using config file");
                Self::load(&path)
            }
            None => {
                tracing::debug!(base = %start_dir.display(), "No config file, using defaults");
                Ok(Self::default().resolved_against(start_dir))
            }
        }
    }

    /// Join every relative path onto `base`. Absolute paths are kept.
    pub fn resolved_against(mut self, base: &Path) -> Self {
        self.target_dir = base.join(&self.target_dir);
        self.search_paths = self
            .search_paths
            .into_iter()
            .map(|p| base.join(p))
            .collect();
        self
    }

    /// Validated header pattern
    pub fn header_pattern(&self) -> crate::error::Result<Pattern> {
        Pattern::new(&self.pattern)
    }
}
