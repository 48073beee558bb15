// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Read-only existence checks against the external namespaces.
//!
//! A probe never mutates anything. When the listing tool itself fails the probe
//! returns an infrastructure error rather than guessing "absent".

use crate::command::{run_checked, CommandRunner, Toolchain};
use crate::errors::{ProviderError, Result};
use std::sync::Arc;
use tracing::debug;

/// Answers "does this cluster / do these volumes exist right now?".
#[derive(Clone)]
pub struct ExistenceProber {
    runner: Arc<dyn CommandRunner>,
    tools: Toolchain,
}

impl ExistenceProber {
    pub fn new(runner: Arc<dyn CommandRunner>, tools: Toolchain) -> Self {
        Self { runner, tools }
    }

    /// Whether a kind cluster named `name` is listed by `kind get clusters`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Infrastructure`] if the listing command fails.
    pub async fn cluster_exists(&self, name: &str) -> Result<bool> {
        let listing = self.tools.get_clusters();
        let stdout = run_checked(self.runner.as_ref(), &listing)
            .await
            .map_err(|e| ProviderError::infrastructure("failed to list kind clusters", e))?;

        let exists = stdout.lines().map(str::trim).any(|line| line == name);
        debug!(cluster = %name, exists, "Probed kind cluster");
        Ok(exists)
    }

    /// Whether every volume in `names` exists. An empty set is trivially present.
    ///
    /// Stops at the first missing volume.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Infrastructure`] if a listing command fails.
    pub async fn volumes_exist<S: AsRef<str>>(&self, names: &[S]) -> Result<bool> {
        for name in names {
            let name = name.as_ref();
            let listing = self.tools.list_volumes_named(name);
            let stdout = run_checked(self.runner.as_ref(), &listing)
                .await
                .map_err(|e| {
                    ProviderError::infrastructure(
                        format!("failed to list docker volume '{name}'"),
                        e,
                    )
                })?;

            // The docker name filter matches substrings, so require an exact line.
            if !stdout.lines().map(str::trim).any(|line| line == name) {
                debug!(volume = %name, "Docker volume not found");
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl std::fmt::Debug for ExistenceProber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExistenceProber")
            .field("tools", &self.tools)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "prober_tests.rs"]
mod prober_tests;
