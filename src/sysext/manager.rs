// src/sysext/manager.rs

//! Installed-state management for staged extensions

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::Transfer;
use crate::error::{Error, Result};
use crate::version::{self, extract_version_multi};

/// Enumerate installed versions for a transfer and resolve the current one.
///
/// Symlink entries are skipped when counting versions. `current` is the
/// version the current symlink points at when it resolves through any target
/// pattern; otherwise the newest installed version, or empty.
pub fn get_installed_versions(t: &Transfer) -> Result<(Vec<String>, String)> {
    let patterns = &t.target.match_patterns;
    let target_dir = &t.target.path;

    let entries = match fs::read_dir(target_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok((Vec::new(), String::new()))
        }
        Err(e) => {
            return Err(Error::System(format!(
                "failed to read {}: {e}",
                target_dir.display()
            )))
        }
    };

    let mut versions = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| Error::System(format!("failed to read directory entry: {e}")))?;
        let file_type = entry
            .file_type()
            .map_err(|e| Error::System(format!("failed to stat directory entry: {e}")))?;
        if file_type.is_symlink() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if let Some((v, _)) = extract_version_multi(&name, patterns) {
            versions.push(v);
        }
    }

    let mut current = current_symlink_version(t);
    if current.is_empty() && !versions.is_empty() {
        version::sort_descending(&mut versions);
        current = versions[0].clone();
    }

    Ok((versions, current))
}

/// Resolve the version named by the staging current symlink, possibly through
/// a chain of links. Empty when absent or unmatched.
fn current_symlink_version(t: &Transfer) -> String {
    if t.target.current_symlink.is_empty() {
        return String::new();
    }
    let symlink_path = t.target.path.join(&t.target.current_symlink);
    let Ok(target) = fs::read_link(&symlink_path) else {
        return String::new();
    };

    let base = base_name(&target);
    if let Some((v, _)) = extract_version_multi(&base, &t.target.match_patterns) {
        return v;
    }

    // The direct target may itself be a link; match the fully resolved name
    if let Ok(resolved) = fs::canonicalize(&symlink_path) {
        let base = base_name(&resolved);
        if let Some((v, _)) = extract_version_multi(&base, &t.target.match_patterns) {
            return v;
        }
    }

    String::new()
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// The version currently active according to the activator.
///
/// Checks the staging current symlink first, then the runtime extensions
/// directory the activator populates. Empty when nothing is active.
pub fn get_active_version(t: &Transfer, run_extensions_dir: &Path) -> Result<String> {
    let from_symlink = current_symlink_version(t);
    if !from_symlink.is_empty() {
        return Ok(from_symlink);
    }

    let entries = match fs::read_dir(run_extensions_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(String::new()),
        Err(e) => {
            return Err(Error::System(format!(
                "failed to read {}: {e}",
                run_extensions_dir.display()
            )))
        }
    };

    for entry in entries {
        let entry =
            entry.map_err(|e| Error::System(format!("failed to read directory entry: {e}")))?;
        let name = entry.file_name().to_string_lossy().to_string();
        if let Some((v, _)) = extract_version_multi(&name, &t.target.match_patterns) {
            return Ok(v);
        }
    }

    Ok(String::new())
}

/// Whether the staging current symlink resolves, and the base name it points
/// at when it does.
pub fn is_extension_active(t: &Transfer) -> (bool, String) {
    if t.target.current_symlink.is_empty() {
        return (false, String::new());
    }
    let symlink_path = t.target.path.join(&t.target.current_symlink);
    match fs::read_link(&symlink_path) {
        Ok(target) => (true, base_name(&target)),
        Err(_) => (false, String::new()),
    }
}

/// Replace `dir/name` with a relative symlink to `target`
pub fn update_symlink(dir: &Path, name: &str, target: &str) -> Result<()> {
    let symlink_path = dir.join(name);

    if fs::symlink_metadata(&symlink_path).is_ok() {
        fs::remove_file(&symlink_path).map_err(|e| {
            Error::System(format!(
                "failed to remove existing {}: {e}",
                symlink_path.display()
            ))
        })?;
    }

    std::os::unix::fs::symlink(target, &symlink_path).map_err(|e| {
        Error::System(format!(
            "failed to create symlink {} -> {target}: {e}",
            symlink_path.display()
        ))
    })?;
    Ok(())
}

/// Publish the staged current version into the activation directory.
///
/// Reads the staging current symlink, resolves it to the concrete image path,
/// and creates an absolute symlink of the same name under `sysext_dir`. Any
/// existing entry at the destination is replaced.
pub fn link_to_sysext(t: &Transfer, sysext_dir: &Path) -> Result<()> {
    if t.target.current_symlink.is_empty() {
        return Err(Error::Config(format!(
            "{}: no CurrentSymlink configured",
            t.component
        )));
    }

    let staging_symlink = t.target.path.join(&t.target.current_symlink);
    let link_target = fs::read_link(&staging_symlink).map_err(|e| {
        Error::System(format!(
            "failed to read staging symlink {}: {e}",
            staging_symlink.display()
        ))
    })?;

    let concrete = if link_target.is_absolute() {
        link_target
    } else {
        t.target.path.join(link_target)
    };

    fs::create_dir_all(sysext_dir).map_err(|e| {
        Error::System(format!(
            "failed to create activation directory {}: {e}",
            sysext_dir.display()
        ))
    })?;

    let dest = sysext_dir.join(&t.target.current_symlink);
    if fs::symlink_metadata(&dest).is_ok() {
        fs::remove_file(&dest).map_err(|e| {
            Error::System(format!("failed to remove existing {}: {e}", dest.display()))
        })?;
    }

    std::os::unix::fs::symlink(&concrete, &dest).map_err(|e| {
        Error::System(format!(
            "failed to create symlink {} -> {}: {e}",
            dest.display(),
            concrete.display()
        ))
    })?;

    debug!("linked {} -> {}", dest.display(), concrete.display());
    Ok(())
}

/// Remove the activation-directory symlink for a transfer, tolerating absence
pub fn unlink_from_sysext(t: &Transfer, sysext_dir: &Path) -> Result<()> {
    if t.target.current_symlink.is_empty() {
        return Err(Error::Config(format!(
            "{}: no CurrentSymlink configured",
            t.component
        )));
    }

    let dest = sysext_dir.join(&t.target.current_symlink);
    match fs::symlink_metadata(&dest) {
        Ok(_) => fs::remove_file(&dest)
            .map_err(|e| Error::System(format!("failed to remove {}: {e}", dest.display()))),
        Err(_) => Ok(()),
    }
}

/// Retention sweep. Returns `(removed, kept)` version lists.
///
/// Versions sort newest first. A version equal to the protect version is
/// always kept and occupies its ranked slot; other versions are kept while
/// fewer than `instances_max` entries have been kept so far, and removed
/// beyond that.
pub fn vacuum_with_details(t: &Transfer) -> Result<(Vec<String>, Vec<String>)> {
    let patterns = &t.target.match_patterns;
    let target_dir = &t.target.path;

    let entries = match fs::read_dir(target_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok((Vec::new(), Vec::new())),
        Err(e) => {
            return Err(Error::System(format!(
                "failed to read {}: {e}",
                target_dir.display()
            )))
        }
    };

    // Collect installed (version, filename) pairs, symlinks excluded
    let mut installed: Vec<(String, String)> = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| Error::System(format!("failed to read directory entry: {e}")))?;
        let file_type = entry
            .file_type()
            .map_err(|e| Error::System(format!("failed to stat directory entry: {e}")))?;
        if file_type.is_symlink() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if let Some((v, _)) = extract_version_multi(&name, patterns) {
            installed.push((v, name));
        }
    }

    if installed.is_empty() {
        return Ok((Vec::new(), Vec::new()));
    }

    let mut versions: Vec<String> = installed.iter().map(|(v, _)| v.clone()).collect();
    versions.sort();
    versions.dedup();
    version::sort_descending(&mut versions);

    let protect = &t.transfer.protect_version;
    let mut removed = Vec::new();
    let mut kept = Vec::new();
    let mut kept_count = 0usize;

    for v in &versions {
        if !protect.is_empty() && v == protect {
            kept.push(v.clone());
            kept_count += 1;
            continue;
        }
        if kept_count < t.transfer.instances_max {
            kept.push(v.clone());
            kept_count += 1;
            continue;
        }

        for (iv, name) in &installed {
            if iv == v {
                let path = target_dir.join(name);
                fs::remove_file(&path).map_err(|e| {
                    Error::System(format!("failed to remove {}: {e}", path.display()))
                })?;
                debug!("vacuumed {}", path.display());
            }
        }
        removed.push(v.clone());
    }

    Ok((removed, kept))
}

/// Remove the staging current symlink and every regular file matching any
/// target pattern with `@v` widened to a glob wildcard. Returns the removed
/// paths.
pub fn remove_matching_files(t: &Transfer) -> Result<Vec<String>> {
    let target_dir = &t.target.path;
    let mut removed = Vec::new();

    if !t.target.current_symlink.is_empty() {
        let symlink_path = target_dir.join(&t.target.current_symlink);
        if fs::symlink_metadata(&symlink_path).is_ok() {
            fs::remove_file(&symlink_path).map_err(|e| {
                Error::System(format!(
                    "failed to remove symlink {}: {e}",
                    symlink_path.display()
                ))
            })?;
            removed.push(symlink_path.display().to_string());
        }
    }

    let globs: Vec<glob::Pattern> = t
        .target
        .match_patterns
        .iter()
        .filter_map(|p| glob::Pattern::new(&pattern_to_glob(p)).ok())
        .collect();

    let entries = match fs::read_dir(target_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(removed),
        Err(e) => {
            return Err(Error::System(format!(
                "failed to read {}: {e}",
                target_dir.display()
            )))
        }
    };

    let mut matching: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| Error::System(format!("failed to read directory entry: {e}")))?;
        let file_type = entry
            .file_type()
            .map_err(|e| Error::System(format!("failed to stat directory entry: {e}")))?;
        if !file_type.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if globs.iter().any(|g| g.matches(&name)) {
            matching.push(entry.path());
        }
    }
    matching.sort();

    for path in matching {
        fs::remove_file(&path)
            .map_err(|e| Error::System(format!("failed to remove {}: {e}", path.display())))?;
        removed.push(path.display().to_string());
    }

    Ok(removed)
}

/// Widen a match pattern into a glob: `@v` and every other placeholder become `*`
fn pattern_to_glob(pattern: &str) -> String {
    let mut glob_str = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '@' && chars.peek().is_some() {
            chars.next();
            glob_str.push('*');
        } else {
            glob_str.push(c);
        }
    }
    glob_str
}
