//! Per-session Chrome profile directories
//!
//! Every session gets a fresh UUID-named profile so concurrent sessions never
//! contend on Chrome's SingletonLock. Profiles are removed when dropped.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Name prefix of every profile directory this crate creates
pub const PROFILE_PREFIX: &str = "pricewatch_chrome";

/// RAII wrapper for a Chrome profile directory
#[derive(Debug)]
pub struct BrowserProfile {
    path: PathBuf,
}

impl BrowserProfile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for BrowserProfile {
    fn drop(&mut self) {
        if self.path.exists() {
            debug!("Removing profile directory {}", self.path.display());
            if let Err(e) = std::fs::remove_dir_all(&self.path) {
                warn!(
                    "Failed to remove profile directory {}: {}",
                    self.path.display(),
                    e
                );
            }
        }
    }
}

/// Create a unique profile directory under `base` (system temp dir when `None`)
pub fn create_profile(base: Option<&Path>) -> Result<BrowserProfile> {
    let base = base.map_or_else(std::env::temp_dir, Path::to_path_buf);
    std::fs::create_dir_all(&base)
        .with_context(|| format!("Failed to create profile base: {}", base.display()))?;

    let path = base.join(format!("{PROFILE_PREFIX}_{}", Uuid::new_v4()));

    // create_dir rather than create_dir_all: fail on collision
    std::fs::create_dir(&path)
        .with_context(|| format!("Failed to create profile directory: {}", path.display()))?;

    debug!("Created Chrome profile directory: {}", path.display());
    Ok(BrowserProfile { path })
}

/// Whether the profile's SingletonLock points at a process that no longer runs
///
/// The lock is a symlink to `{hostname}-{pid}`.
#[cfg(unix)]
pub fn is_singleton_lock_stale(profile_dir: &Path) -> bool {
    let lock_path = profile_dir.join("SingletonLock");
    if !lock_path.exists() && !lock_path.is_symlink() {
        return true;
    }

    match std::fs::read_link(&lock_path) {
        Ok(target) => {
            let target = target.to_string_lossy();
            let Some(pid) = target.rsplit('-').next().and_then(|p| p.parse::<i32>().ok()) else {
                warn!("Could not parse PID from SingletonLock target: {}", target);
                return false;
            };
            // kill(pid, 0) only probes for existence
            let alive = unsafe { libc::kill(pid, 0) == 0 };
            !alive
        }
        Err(_) => lock_path.is_file(),
    }
}

#[cfg(not(unix))]
pub fn is_singleton_lock_stale(_profile_dir: &Path) -> bool {
    true
}

/// Remove profiles left behind by crashed processes
///
/// Returns the number of directories removed.
pub fn cleanup_stale_profiles(base: Option<&Path>) -> Result<usize> {
    let base = base.map_or_else(std::env::temp_dir, Path::to_path_buf);
    if !base.exists() {
        return Ok(0);
    }

    let entries = std::fs::read_dir(&base)
        .with_context(|| format!("Failed to read profile base: {}", base.display()))?;

    let mut cleaned = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        let is_ours = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(PROFILE_PREFIX));

        if is_ours && path.is_dir() && is_singleton_lock_stale(&path) {
            match std::fs::remove_dir_all(&path) {
                Ok(()) => cleaned += 1,
                Err(e) => warn!("Failed to remove stale profile {}: {}", path.display(), e),
            }
        }
    }

    if cleaned > 0 {
        info!("Cleaned {} stale Chrome profile directories", cleaned);
    }
    Ok(cleaned)
}
