//! Library-level scenarios for include directory synchronization.

#![cfg(unix)]

use anyhow::Result;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use makeinclude::{ConflictPolicy, Linker, SyncConfig, SyncError, SyncOptions};

fn write(root: &Path, rel: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, format!("#pragma once // {rel}\n")).unwrap();
}

fn sorted_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn core_and_ui_headers_are_flattened() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write(root, "Core/a.h");
    write(root, "Core/b.h");
    write(root, "Core/notes.txt");
    write(root, "UI/c.h");

    let linker = Linker::new(SyncConfig::default().resolved_against(root))?;
    let report = linker.sync(&SyncOptions::default())?;

    assert_eq!(report.created, 3);
    let include = root.join("include");
    assert_eq!(sorted_names(&include), vec!["a.h", "b.h", "c.h"]);
    for name in ["a.h", "b.h", "c.h"] {
        let link = include.join(name);
        assert!(link.is_symlink(), "{name} should be a symlink");
        assert!(fs::read_link(&link)?.is_relative());
    }
    assert_eq!(
        fs::read_to_string(include.join("b.h"))?,
        "#pragma once // Core/b.h\n"
    );
    Ok(())
}

#[test]
fn stale_regular_files_are_removed_before_linking() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write(root, "Core/a.h");
    write(root, "UI/c.h");
    write(root, "include/a.h");
    write(root, "include/copied.h");

    let linker = Linker::new(SyncConfig::default().resolved_against(root))?;
    let report = linker.sync(&SyncOptions::default())?;

    assert_eq!(report.cleanup.removed(), 2);
    assert_eq!(report.cleanup.failures().count(), 0);
    assert_eq!(sorted_names(&root.join("include")), vec!["a.h", "c.h"]);
    assert!(root.join("include/a.h").is_symlink());
    Ok(())
}

#[test]
fn rerun_fails_by_default_and_succeeds_with_replace() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write(root, "Core/a.h");
    write(root, "UI/c.h");

    let config = SyncConfig::default().resolved_against(root);
    let linker = Linker::new(config.clone())?;
    linker.sync(&SyncOptions::default())?;

    let err = linker.sync(&SyncOptions::default()).unwrap_err();
    assert!(matches!(err, SyncError::LinkExists { .. }));

    let replacing = Linker::new(SyncConfig {
        on_conflict: ConflictPolicy::Replace,
        ..config
    })?;
    let report = replacing.sync(&SyncOptions::default())?;
    assert_eq!(report.skipped, 2);
    assert_eq!(report.created, 0);
    Ok(())
}

#[test]
fn custom_layout_from_config_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write(root, "src/core/engine.hpp");
    write(root, "src/core/engine.h");
    write(root, "src/gui/window.hpp");
    fs::write(
        root.join("makeinclude.toml"),
        r#"
            target_dir = "build/include"
            search_paths = ["src/core", "src/gui"]
            pattern = "*.hpp"
        "#,
    )?;

    let config = SyncConfig::locate(&root.join("src"))?;
    let linker = Linker::new(config)?;
    linker.sync(&SyncOptions::default())?;

    let include = root.join("build/include");
    assert_eq!(sorted_names(&include), vec!["engine.hpp", "window.hpp"]);
    assert_eq!(
        fs::read_link(include.join("window.hpp"))?,
        Path::new("../../src/gui/window.hpp")
    );
    Ok(())
}

#[test]
fn links_survive_moving_the_whole_tree() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let original = temp_dir.path().join("project");
    write(&original, "Core/a.h");
    fs::create_dir_all(original.join("UI"))?;

    let linker = Linker::new(SyncConfig::default().resolved_against(&original))?;
    linker.sync(&SyncOptions::default())?;

    let moved = temp_dir.path().join("moved");
    fs::rename(&original, &moved)?;

    assert_eq!(
        fs::read_to_string(moved.join("include/a.h"))?,
        "#pragma once // Core/a.h\n"
    );
    Ok(())
}
