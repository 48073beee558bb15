// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Dependency validation for the external tools the provider drives.
//!
//! Each dependency name is resolved on the executable search path by its own
//! task. All tasks are joined before any result is inspected, so a caller sees
//! every missing tool in a single report instead of discovering them one at a
//! time. Results are sorted by name to keep the report reproducible.
//!
//! # Example
//!
//! ```rust,no_run
//! use kind_native::dependencies::DependencyChecker;
//!
//! # async fn example() -> kind_native::errors::Result<()> {
//! let resolved = DependencyChecker::new().check(&["kind", "docker"]).await?;
//! for (name, path) in resolved {
//!     println!("{name} -> {}", path.display());
//! }
//! # Ok(())
//! # }
//! ```

use crate::errors::{MissingDependency, ProviderError, Result};
use futures::future::join_all;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Resolves dependency names on a search path.
#[derive(Debug, Clone, Default)]
pub struct DependencyChecker {
    /// Explicit search path; `None` means the process `PATH` at check time
    search_path: Option<OsString>,
}

impl DependencyChecker {
    /// Checker that searches the process `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checker that searches `search_path` (same syntax as `PATH`) instead.
    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(search_path.into()),
        }
    }

    /// Verify that every dependency resolves to an executable file.
    ///
    /// Returns the resolved `(name, path)` pairs sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::DependencyMissing`] naming every dependency that
    /// could not be resolved.
    pub async fn check<S: AsRef<str>>(
        &self,
        dependencies: &[S],
    ) -> Result<Vec<(String, PathBuf)>> {
        info!(count = dependencies.len(), "Starting dependency checks");

        let lookups = dependencies.iter().map(|dependency| {
            let name = dependency.as_ref().to_string();
            let search_path = self.search_path.clone();
            let task = tokio::task::spawn_blocking({
                let name = name.clone();
                move || find_executable(&name, search_path.as_deref())
            });
            async move {
                let result = match task.await {
                    Ok(result) => result,
                    Err(e) => Err(format!("lookup task failed: {e}")),
                };
                (name, result)
            }
        });

        let mut results: Vec<(String, std::result::Result<PathBuf, String>)> =
            join_all(lookups).await;
        results.sort_by(|a, b| a.0.cmp(&b.0));

        let mut resolved = Vec::with_capacity(results.len());
        let mut missing = Vec::new();
        for (name, result) in results {
            match result {
                Ok(path) => {
                    debug!(dependency = %name, path = %path.display(), "Dependency resolved");
                    resolved.push((name, path));
                }
                Err(reason) => {
                    warn!(dependency = %name, %reason, "Dependency check failed");
                    missing.push(MissingDependency { name, reason });
                }
            }
        }

        if !missing.is_empty() {
            return Err(ProviderError::DependencyMissing { missing });
        }

        info!("Local dependencies satisfied");
        Ok(resolved)
    }
}

/// Resolve `name` to an executable file.
///
/// A name containing a path separator is checked as-is; anything else is
/// searched for in each directory of `search_path` (or `PATH` when `None`).
///
/// # Errors
///
/// Returns a human-readable reason when no executable file is found.
pub fn find_executable(
    name: &str,
    search_path: Option<&OsStr>,
) -> std::result::Result<PathBuf, String> {
    if name.trim().is_empty() {
        return Err("executable name is empty".to_string());
    }

    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        return if is_executable(candidate) {
            Ok(candidate.to_path_buf())
        } else {
            Err(format!("{} is not an executable file", candidate.display()))
        };
    }

    let path = match search_path {
        Some(path) => path.to_os_string(),
        None => std::env::var_os("PATH").ok_or_else(|| "PATH is not set".to_string())?,
    };

    std::env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|p| is_executable(p))
        .ok_or_else(|| "not found on PATH".to_string())
}

fn is_executable(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => has_execute_permission(&metadata),
        _ => false,
    }
}

#[cfg(unix)]
fn has_execute_permission(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn has_execute_permission(_metadata: &std::fs::Metadata) -> bool {
    true
}

#[cfg(test)]
#[path = "dependencies_tests.rs"]
mod dependencies_tests;
