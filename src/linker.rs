//! Include directory synchronization
//!
//! Clears stale regular files out of the target directory, then creates one
//! relative symbolic link per discovered header. Link targets are computed
//! from canonical paths, so the process working directory is never touched.

use colored::Colorize;
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::{ConflictPolicy, SyncConfig};
use crate::discover::discover_headers;
use crate::error::{Result, SyncError};
use crate::pattern::Pattern;

/// Options for the sync operation
#[derive(Debug, Default)]
pub struct SyncOptions {
    /// Show what would be done without making changes
    pub dry_run: bool,
    /// Show detailed output
    pub verbose: bool,
}

/// Result of deleting one stale file from the target directory
#[derive(Debug)]
pub enum RemovalOutcome {
    Removed,
    /// Dry run: the file would have been removed
    Planned,
    /// The file disappeared before it could be removed
    Vanished,
    Failed(io::Error),
}

#[derive(Debug)]
pub struct RemovalEntry {
    pub path: PathBuf,
    pub outcome: RemovalOutcome,
}

/// Outcome of preparing the target directory
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// The target directory did not exist and was created
    pub created_target: bool,
    pub entries: Vec<RemovalEntry>,
}

impl CleanupReport {
    pub fn removed(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, RemovalOutcome::Removed))
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &RemovalEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, RemovalOutcome::Failed(_)))
    }
}

/// Result of a sync operation
#[derive(Debug, Default)]
pub struct SyncReport {
    pub cleanup: CleanupReport,
    pub created: usize,
    pub replaced: usize,
    pub skipped: usize,
    pub pruned: usize,
    /// Links produced by this run, in creation order
    pub links: Vec<PathBuf>,
}

/// What happened to a single header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAction {
    Created,
    Replaced,
    /// Link already pointed at the header
    Skipped,
}

/// Performs the synchronization of an include directory
pub struct Linker {
    config: SyncConfig,
    pattern: Pattern,
}

impl Linker {
    /// Create a new linker from a configuration
    pub fn new(config: SyncConfig) -> Result<Self> {
        let pattern = config.header_pattern()?;
        Ok(Self { config, pattern })
    }

    /// Get the config
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn target_dir(&self) -> &Path {
        &self.config.target_dir
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Perform the sync operation
    pub fn sync(&self, options: &SyncOptions) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        if options.dry_run {
            println!("{}", "Running in dry-run mode\n".cyan());
        }

        report.cleanup = self.prepare_target(options)?;

        // In a dry run nothing was deleted, so names cleared by cleanup
        // must not count as collisions.
        let cleared: HashSet<OsString> = if options.dry_run {
            report
                .cleanup
                .entries
                .iter()
                .filter(|e| matches!(e.outcome, RemovalOutcome::Planned))
                .filter_map(|e| e.path.file_name().map(OsString::from))
                .collect()
        } else {
            HashSet::new()
        };

        let mut produced: HashSet<OsString> = HashSet::new();

        for search_path in &self.config.search_paths {
            if options.verbose {
                println!("  Scanning: {}", search_path.display().to_string().dimmed());
            }

            for header in discover_headers(search_path, &self.pattern)? {
                let action = self.link_one(&header, options, &cleared, &produced)?;
                match action {
                    LinkAction::Created => report.created += 1,
                    LinkAction::Replaced => report.replaced += 1,
                    LinkAction::Skipped => report.skipped += 1,
                }

                let name = link_name(&header)?;
                report.links.push(self.config.target_dir.join(&name));
                produced.insert(name);
            }
        }

        if self.config.prune_stale {
            report.pruned = self.prune_stale(&produced, options)?;
        }

        Ok(report)
    }

    /// Make sure the target directory exists and holds no regular files.
    ///
    /// Directories and symlinks inside it are left alone. Deletion failures
    /// are collected into the report instead of aborting.
    pub fn prepare_target(&self, options: &SyncOptions) -> Result<CleanupReport> {
        let target = &self.config.target_dir;
        let mut report = CleanupReport::default();

        if !target.exists() {
            report.created_target = true;
            if options.dry_run {
                println!(
                    "  {} Would create directory: {}",
                    "→".cyan(),
                    target.display()
                );
            } else {
                fs::create_dir_all(target).map_err(|source| SyncError::CreateTarget {
                    path: target.clone(),
                    source,
                })?;
                tracing::debug!(dir = %target.display(), "Created target directory");
                if options.verbose {
                    println!("  {} Created directory: {}", "✔".green(), target.display());
                }
            }
            return Ok(report);
        }

        self.clear_regular_files(options, &mut report, |path| fs::remove_file(path))?;
        Ok(report)
    }

    /// Cleanup loop of `prepare_target`, with the file removal passed in.
    fn clear_regular_files<F>(
        &self,
        options: &SyncOptions,
        report: &mut CleanupReport,
        mut remove: F,
    ) -> Result<()>
    where
        F: FnMut(&Path) -> io::Result<()>,
    {
        let target = &self.config.target_dir;
        let read_target = |source: io::Error| SyncError::ReadTarget {
            path: target.clone(),
            source,
        };

        for entry in fs::read_dir(target).map_err(read_target)? {
            let entry = entry.map_err(read_target)?;
            let path = entry.path();

            let file_type = match entry.file_type() {
                Ok(ft) => ft,
                Err(e) => {
                    report.entries.push(removal_failed(path, e));
                    continue;
                }
            };
            if !file_type.is_file() {
                continue;
            }

            if options.dry_run {
                println!("  {} Would remove: {}", "→".cyan(), path.display());
                report.entries.push(RemovalEntry {
                    path,
                    outcome: RemovalOutcome::Planned,
                });
                continue;
            }

            let entry = match remove(&path) {
                Ok(()) => {
                    if options.verbose {
                        println!("  {} Removed: {}", "✔".green(), path.display());
                    }
                    RemovalEntry {
                        path,
                        outcome: RemovalOutcome::Removed,
                    }
                }
                Err(e) => removal_failed(path, e),
            };
            report.entries.push(entry);
        }

        Ok(())
    }

    /// Link a single header into the target directory
    pub fn link_header(&self, header: &Path, options: &SyncOptions) -> Result<LinkAction> {
        self.link_one(header, options, &HashSet::new(), &HashSet::new())
    }

    fn link_one(
        &self,
        header: &Path,
        options: &SyncOptions,
        cleared: &HashSet<OsString>,
        produced: &HashSet<OsString>,
    ) -> Result<LinkAction> {
        let name = link_name(header)?;
        let link = self.config.target_dir.join(&name);
        let relative_source = self.link_target_for(header)?;

        // Two search paths providing the same name always collide, whatever
        // the policy.
        if produced.contains(&name) {
            return Err(SyncError::LinkExists { link });
        }

        let mut action = LinkAction::Created;
        let occupied = !cleared.contains(&name) && link.symlink_metadata().is_ok();

        if occupied {
            if self.config.on_conflict == ConflictPolicy::Fail || !link.is_symlink() {
                return Err(SyncError::LinkExists { link });
            }

            let current_target = fs::read_link(&link).map_err(|source| SyncError::RemoveLink {
                link: link.clone(),
                source,
            })?;
            if current_target == relative_source {
                if options.verbose {
                    println!("  {} Already linked: {}", "✔".green(), link.display());
                }
                return Ok(LinkAction::Skipped);
            }

            if options.dry_run {
                println!(
                    "  {} Would update symlink: {} -> {}",
                    "→".cyan(),
                    link.display(),
                    relative_source.display()
                );
                return Ok(LinkAction::Replaced);
            }

            fs::remove_file(&link).map_err(|source| SyncError::RemoveLink {
                link: link.clone(),
                source,
            })?;
            if options.verbose {
                println!(
                    "  {} Removed old symlink: {} (was -> {})",
                    "○".yellow(),
                    link.display(),
                    current_target.display()
                );
            }
            action = LinkAction::Replaced;
        }

        if options.dry_run {
            println!(
                "  {} Would link: {} -> {}",
                "→".cyan(),
                link.display(),
                relative_source.display()
            );
            return Ok(action);
        }

        create_symlink(header, &relative_source, &link)?;
        tracing::debug!(
            link = %link.display(),
            points_to = %relative_source.display(),
            "Created symlink"
        );

        println!(
            "  {} Linked: {} -> {}",
            "✔".green(),
            link.display(),
            relative_source.display()
        );

        Ok(action)
    }

    /// Path a link for `header` should contain: the header's location
    /// relative to the target directory.
    ///
    /// The header's own name is kept as is, so a header that is itself a
    /// symlink is linked to, not resolved through.
    pub fn link_target_for(&self, header: &Path) -> Result<PathBuf> {
        let target_abs = canonicalize_lenient(&self.config.target_dir);

        let header_dir = header.parent().unwrap_or_else(|| Path::new("."));
        let header_abs = match header.file_name() {
            Some(name) => canonicalize_lenient(header_dir).join(name),
            None => canonicalize_lenient(header),
        };

        pathdiff::diff_paths(&header_abs, &target_abs).ok_or_else(|| SyncError::RelativePath {
            from: target_abs.clone(),
            to: header_abs.clone(),
        })
    }

    /// Remove symlinks in the target directory that were not produced by
    /// this run.
    fn prune_stale(&self, keep: &HashSet<OsString>, options: &SyncOptions) -> Result<usize> {
        let target = &self.config.target_dir;
        if !target.is_dir() {
            return Ok(0);
        }

        let read_target = |source: io::Error| SyncError::ReadTarget {
            path: target.clone(),
            source,
        };

        let mut pruned = 0;
        for entry in fs::read_dir(target).map_err(read_target)? {
            let entry = entry.map_err(read_target)?;
            let path = entry.path();
            if !path.is_symlink() || keep.contains(&entry.file_name()) {
                continue;
            }

            if options.dry_run {
                println!("  {} Would prune: {}", "→".cyan(), path.display());
            } else {
                fs::remove_file(&path).map_err(|source| SyncError::RemoveLink {
                    link: path.clone(),
                    source,
                })?;
                println!("  {} Pruned stale link: {}", "○".yellow(), path.display());
            }
            pruned += 1;
        }

        Ok(pruned)
    }

    /// Remove every symlink in the target directory, then the directory
    /// itself if nothing else is left in it
    pub fn clean(&self, options: &SyncOptions) -> Result<usize> {
        let target = &self.config.target_dir;

        println!("{}", "Cleaning include links...".cyan());

        if !target.is_dir() {
            if options.verbose {
                println!(
                    "  {} Nothing to clean: {}",
                    "○".yellow(),
                    target.display()
                );
            }
            return Ok(0);
        }

        let read_target = |source: io::Error| SyncError::ReadTarget {
            path: target.clone(),
            source,
        };

        let mut removed = 0;
        for entry in fs::read_dir(target).map_err(read_target)? {
            let entry = entry.map_err(read_target)?;
            let path = entry.path();
            if !path.is_symlink() {
                continue;
            }

            if options.dry_run {
                println!("  {} Would remove: {}", "→".cyan(), path.display());
            } else {
                fs::remove_file(&path).map_err(|source| SyncError::RemoveLink {
                    link: path.clone(),
                    source,
                })?;
                println!("  {} Removed: {}", "✔".green(), path.display());
            }
            removed += 1;
        }

        if !options.dry_run {
            let _ = fs::remove_dir(target);
        }

        Ok(removed)
    }
}

fn link_name(header: &Path) -> Result<OsString> {
    header
        .file_name()
        .map(OsString::from)
        .ok_or_else(|| SyncError::RelativePath {
            from: PathBuf::new(),
            to: header.to_path_buf(),
        })
}

fn removal_failed(path: PathBuf, error: io::Error) -> RemovalEntry {
    if error.kind() == io::ErrorKind::NotFound {
        tracing::debug!(path = %path.display(), "Stale file vanished before removal");
        return RemovalEntry {
            path,
            outcome: RemovalOutcome::Vanished,
        };
    }

    println!(
        "  {} Failed to remove {}: {}",
        "✘".red(),
        path.display(),
        error
    );
    tracing::warn!(path = %path.display(), error = %error, "Failed to remove stale file");
    RemovalEntry {
        path,
        outcome: RemovalOutcome::Failed(error),
    }
}

/// Canonicalize the longest existing prefix of `path` and append the rest.
fn canonicalize_lenient(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

    let mut existing = absolute.as_path();
    let mut rest = Vec::new();
    loop {
        if let Ok(canonical) = fs::canonicalize(existing) {
            return rest
                .iter()
                .rev()
                .fold(canonical, |acc: PathBuf, part| acc.join(part));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                rest.push(name.to_os_string());
                existing = parent;
            }
            _ => return absolute,
        }
    }
}

fn symlink_error(link: &Path, source: io::Error) -> SyncError {
    if source.kind() == io::ErrorKind::AlreadyExists {
        SyncError::LinkExists {
            link: link.to_path_buf(),
        }
    } else {
        SyncError::CreateLink {
            link: link.to_path_buf(),
            source,
        }
    }
}

#[cfg(unix)]
fn create_symlink(_header: &Path, relative_source: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(relative_source, link).map_err(|e| symlink_error(link, e))
}

#[cfg(windows)]
fn create_symlink(header: &Path, relative_source: &Path, link: &Path) -> Result<()> {
    let created = if header.is_dir() {
        std::os::windows::fs::symlink_dir(relative_source, link)
    } else {
        std::os::windows::fs::symlink_file(relative_source, link)
    };
    created.map_err(|e| symlink_error(link, e))
}
