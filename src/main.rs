//! makeinclude CLI
//!
//! Command-line interface for building a flat include directory of symlinks.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::env;
use std::path::PathBuf;

use makeinclude::status::{self, LinkState};
use makeinclude::{ConflictPolicy, Linker, SyncConfig, SyncOptions, init};

#[derive(Parser)]
#[command(name = "makeinclude")]
#[command(
    author,
    version,
    about = "Collect header files into a flat include directory of symbolic links"
)]
#[command(propagate_version = true)]
struct Cli {
    /// Show detailed output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Recreate the include directory links (default when no command is given)
    #[command(alias = "apply")]
    Sync(SyncArgs),

    /// Remove all symlinks from the include directory
    Clean {
        #[command(flatten)]
        location: LocationArgs,

        /// Show what would be done without making changes
        #[arg(long)]
        dry_run: bool,
    },

    /// Compare the include directory with the headers in the search paths
    Status {
        #[command(flatten)]
        location: LocationArgs,

        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a default makeinclude.toml
    Init {
        /// Directory to write the config into (default: current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Where the config lives and which values to override
#[derive(Args, Default)]
struct LocationArgs {
    /// Directory to start looking for makeinclude.toml (default: current directory)
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target directory for the links
    #[arg(short, long)]
    target: Option<PathBuf>,

    /// Directory to scan for headers; repeat to give several, in order
    #[arg(short = 's', long = "search-path")]
    search_paths: Vec<PathBuf>,

    /// File-name pattern selecting headers
    #[arg(long)]
    pattern: Option<String>,
}

#[derive(Args, Default)]
struct SyncArgs {
    #[command(flatten)]
    location: LocationArgs,

    /// Replace existing symlinks instead of failing
    #[arg(short, long)]
    force: bool,

    /// Remove symlinks whose header no longer exists
    #[arg(long)]
    prune: bool,

    /// Show what would be done without making changes
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        tracing::error!(error = %e, "makeinclude failed");
        return Err(e);
    }

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command.unwrap_or_else(|| Commands::Sync(SyncArgs::default())) {
        Commands::Sync(args) => {
            let mut config = load_config(&args.location)?;
            if args.force {
                config.on_conflict = ConflictPolicy::Replace;
            }
            if args.prune {
                config.prune_stale = true;
            }

            let linker = Linker::new(config)?;
            let options = SyncOptions {
                dry_run: args.dry_run,
                verbose: cli.verbose,
            };

            println!(
                "{} {}",
                "➤ Syncing".cyan().bold(),
                linker.target_dir().display()
            );
            let report = linker.sync(&options)?;

            let failures = report.cleanup.failures().count();

            println!("\n{}", "✨ Sync complete!".green().bold());
            println!(
                "  Created: {}, Replaced: {}, Skipped: {}, Pruned: {}, Cleanup errors: {}",
                report.created.to_string().green(),
                report.replaced.to_string().yellow(),
                report.skipped.to_string().dimmed(),
                report.pruned.to_string().dimmed(),
                if failures > 0 {
                    failures.to_string().red()
                } else {
                    failures.to_string().dimmed()
                }
            );
        }

        Commands::Clean { location, dry_run } => {
            let config = load_config(&location)?;
            let linker = Linker::new(config)?;
            let options = SyncOptions {
                dry_run,
                verbose: cli.verbose,
            };

            let removed = linker.clean(&options)?;

            println!("\n{}", "✨ Clean complete!".green().bold());
            println!("  Removed: {} symlinks", removed.to_string().green());
        }

        Commands::Status { location, json } => {
            let config = load_config(&location)?;
            let linker = Linker::new(config)?;
            let entries = status::inspect(&linker)?;
            let problems = entries.iter().filter(|e| e.is_problem()).count();

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for e in &entries {
                    match &e.state {
                        LinkState::Linked => println!("{} OK: {}", "✔".green(), e.link),
                        LinkState::Missing => println!("{} Missing: {}", "!".yellow(), e.link),
                        LinkState::WrongTarget { points_to } => println!(
                            "{} Incorrect link: {} -> {} (expected: {})",
                            "✗".red(),
                            e.link,
                            points_to,
                            e.header.as_deref().unwrap_or("<unknown>")
                        ),
                        LinkState::NotALink => {
                            println!("{} Exists but not a symlink: {}", "✗".red(), e.link)
                        }
                        LinkState::Stale { points_to } => {
                            println!("{} Stale link: {} -> {}", "·".dimmed(), e.link, points_to)
                        }
                    }
                }

                if problems > 0 {
                    println!("\nStatus: {} problems found", problems);
                } else {
                    println!("\nStatus: All good");
                }
            }

            if problems > 0 {
                std::process::exit(1);
            }
        }

        Commands::Init { path, force } => {
            let dir = match path {
                Some(p) => p,
                None => env::current_dir()?,
            };

            println!("{}", "Initializing makeinclude configuration...\n".cyan());
            if init::init(&dir, force)? {
                println!("\n{}", "✨ Initialization complete!".green().bold());
                println!(
                    "\nNext steps:\n  1. Edit {} to list your header directories\n  2. Run {} to create the links",
                    makeinclude::config::CONFIG_FILE_NAME.cyan(),
                    "makeinclude sync".cyan()
                );
            }
        }
    }

    Ok(())
}

/// Resolve the sync configuration: explicit file, nearest file, or defaults,
/// then apply command-line overrides relative to the start directory.
fn load_config(args: &LocationArgs) -> Result<SyncConfig> {
    let start_dir = match &args.path {
        Some(p) => p.clone(),
        None => env::current_dir()?,
    };

    let mut config = match &args.config {
        Some(p) => SyncConfig::load(p)?,
        None => SyncConfig::locate(&start_dir)?,
    };

    if let Some(target) = &args.target {
        config.target_dir = start_dir.join(target);
    }
    if !args.search_paths.is_empty() {
        config.search_paths = args.search_paths.iter().map(|p| start_dir.join(p)).collect();
    }
    if let Some(pattern) = &args.pattern {
        config.pattern = pattern.clone();
    }

    Ok(config)
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
