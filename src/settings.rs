// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Runtime settings for the provider.
//!
//! Settings are built once at startup and handed to
//! [`KindClusterProvider`](crate::provider::KindClusterProvider). The provider
//! version is injected by the caller rather than read from a global, typically:
//!
//! ```rust,no_run
//! use kind_native::settings::ProviderSettings;
//!
//! # fn example() -> anyhow::Result<()> {
//! let settings = ProviderSettings::from_env(env!("CARGO_PKG_VERSION"))?;
//! # Ok(())
//! # }
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `KIND_NATIVE_KIND_BINARY` | `kind` | kind executable |
//! | `KIND_NATIVE_DOCKER_BINARY` | `docker` | docker executable |
//! | `KIND_NATIVE_COMMAND_TIMEOUT_SECS` | `600` | per-command timeout |
//! | `KIND_NATIVE_DEPENDENCIES` | `kind,docker` | executables checked by `initialize` |

use crate::constants::{
    DEFAULT_COMMAND_TIMEOUT_SECS, DEFAULT_DEPENDENCIES, DOCKER_BINARY, ENV_COMMAND_TIMEOUT_SECS,
    ENV_DEPENDENCIES, ENV_DOCKER_BINARY, ENV_KIND_BINARY, KIND_BINARY,
};
use anyhow::{bail, Context, Result};
use std::time::Duration;
use tracing::debug;

/// Settings shared by every component of the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    /// Semantic version reported by `plugin_info`
    pub version: String,
    /// kind executable name or path
    pub kind_binary: String,
    /// docker executable name or path
    pub docker_binary: String,
    /// Upper bound for any single external command
    pub command_timeout: Duration,
    /// Executables verified by `initialize`
    pub dependencies: Vec<String>,
}

impl ProviderSettings {
    /// Settings with every default applied.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            kind_binary: KIND_BINARY.to_string(),
            docker_binary: DOCKER_BINARY.to_string(),
            command_timeout: Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS),
            dependencies: DEFAULT_DEPENDENCIES
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    /// Defaults overridden by the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unusable value (empty binary
    /// name, non-numeric or zero timeout, empty dependency list).
    pub fn from_env(version: impl Into<String>) -> Result<Self> {
        Self::from_lookup(version, |key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable lookup.
    ///
    /// # Errors
    ///
    /// See [`from_env`](Self::from_env).
    pub fn from_lookup<F>(version: impl Into<String>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::new(version);

        if let Some(kind) = lookup(ENV_KIND_BINARY) {
            settings.kind_binary = non_empty(ENV_KIND_BINARY, kind)?;
        }
        if let Some(docker) = lookup(ENV_DOCKER_BINARY) {
            settings.docker_binary = non_empty(ENV_DOCKER_BINARY, docker)?;
        }
        if let Some(raw) = lookup(ENV_COMMAND_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().with_context(|| {
                format!("{ENV_COMMAND_TIMEOUT_SECS} must be a whole number of seconds, got '{raw}'")
            })?;
            if secs == 0 {
                bail!("{ENV_COMMAND_TIMEOUT_SECS} must be greater than zero");
            }
            settings.command_timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = lookup(ENV_DEPENDENCIES) {
            let dependencies: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(ToString::to_string)
                .collect();
            if dependencies.is_empty() {
                bail!("{ENV_DEPENDENCIES} must name at least one executable");
            }
            settings.dependencies = dependencies;
        }

        debug!(?settings, "Loaded provider settings");
        Ok(settings)
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_VERSION"))
    }
}

fn non_empty(key: &str, value: String) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("{key} must not be empty");
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod settings_tests;
