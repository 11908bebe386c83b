//! Default configuration file generation

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;

use crate::config::CONFIG_FILE_NAME;

/// Default configuration template
pub const DEFAULT_CONFIG: &str = r#"# makeinclude configuration
# Paths are relative to this file.

# Directory that receives one symlink per header
target_dir = "include"

# Directories scanned for headers, in order (not recursive)
search_paths = ["Core", "UI"]

# File-name pattern selecting headers
pattern = "*.h"

# What to do when a link name already exists in target_dir:
#   "fail"    - stop with an error (default)
#   "replace" - replace existing symlinks; other entries still fail
on_conflict = "fail"

# Remove symlinks in target_dir whose header no longer exists
prune_stale = false
"#;

/// Write the default configuration into `dir`.
///
/// Returns `false` when a config already exists and `force` is not set.
pub fn init(dir: &Path, force: bool) -> Result<bool> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        println!(
            "  {} Config already exists: {} (use --force to overwrite)",
            "!".yellow(),
            config_path.display()
        );
        return Ok(false);
    }

    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }

    fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
    println!("  {} Created: {}", "✔".green(), config_path.display());

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyncConfig;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_parses_to_defaults() {
        let config: SyncConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, SyncConfig::default());
    }

    #[test]
    fn test_init_writes_config() {
        let temp_dir = TempDir::new().unwrap();

        assert!(init(temp_dir.path(), false).unwrap());

        let written = fs::read_to_string(temp_dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(written, DEFAULT_CONFIG);
    }

    #[test]
    fn test_init_keeps_existing_without_force() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "pattern = \"*.hpp\"\n").unwrap();

        assert!(!init(temp_dir.path(), false).unwrap());
        assert_eq!(
            fs::read_to_string(&config_path).unwrap(),
            "pattern = \"*.hpp\"\n"
        );

        assert!(init(temp_dir.path(), true).unwrap());
        assert_eq!(fs::read_to_string(&config_path).unwrap(), DEFAULT_CONFIG);
    }
}
