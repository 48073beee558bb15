// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the kind-native provider.
//!
//! The provider distinguishes four failure classes, and callers are expected to
//! treat them differently:
//!
//! - [`ProviderError::Validation`] - the supplied configuration is structurally
//!   wrong. Detected before any external command runs; fix the input.
//! - [`ProviderError::DependencyMissing`] - one or more required executables are
//!   not installed. Every missing tool is reported at once.
//! - [`ProviderError::Infrastructure`] - an external command could not be run,
//!   timed out, or exited non-zero. Wraps the tool's own stderr.
//! - [`ProviderError::NotFound`] - a read found no cluster with the given name.
//!
//! Nothing in this crate retries. Multi-step operations are not transactional,
//! so a failed update or delete leaves the external state unknown and should be
//! re-read before retrying.

use crate::constants::{
    ERROR_TYPE_DEPENDENCY_MISSING, ERROR_TYPE_INFRASTRUCTURE, ERROR_TYPE_NOT_FOUND,
    ERROR_TYPE_TIMEOUT, ERROR_TYPE_VALIDATION,
};
use std::time::Duration;
use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T, E = ProviderError> = std::result::Result<T, E>;

/// A single property that failed to build or validate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{property}: {reason}")]
pub struct FieldError {
    /// Property name as the orchestration engine knows it (e.g. `clusterName`)
    pub property: String,
    /// Human-readable explanation
    pub reason: String,
}

impl FieldError {
    pub fn new(property: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            reason: reason.into(),
        }
    }
}

/// Every field-level failure found while building or validating a configuration.
///
/// Checks are independent, so all failures are collected before returning.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("invalid configuration: {}", join_field_errors(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, property: impl Into<String>, reason: impl Into<String>) {
        self.errors.push(FieldError::new(property, reason));
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Names of the properties that failed, in the order they were found.
    #[must_use]
    pub fn properties(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.property.as_str()).collect()
    }

    /// `Ok(())` when nothing failed, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns `self` if at least one field error was recorded.
    pub fn into_result(self) -> std::result::Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A required executable that could not be resolved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("dependency '{name}' is not installed: {reason}")]
pub struct MissingDependency {
    pub name: String,
    pub reason: String,
}

/// Failure of a single external invocation.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The process could not be started (executable missing, permissions, ...)
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process did not exit within the configured timeout and was killed
    #[error("`{command}` timed out after {}s", .timeout.as_secs())]
    TimedOut { command: String, timeout: Duration },

    /// The process exited unsuccessfully
    #[error("`{command}` exited with {}: {}", describe_exit(.exit_code), .stderr.trim())]
    Failed {
        command: String,
        /// `None` when the process was terminated by a signal
        exit_code: Option<i32>,
        stderr: String,
    },
}

impl CommandError {
    /// The rendered command line that failed.
    #[must_use]
    pub fn command(&self) -> &str {
        match self {
            Self::Spawn { command, .. }
            | Self::TimedOut { command, .. }
            | Self::Failed { command, .. } => command,
        }
    }

    /// Captured stderr, when the process ran to completion.
    #[must_use]
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::Failed { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

fn describe_exit(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Top-level error returned by every provider operation.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("missing dependencies: {}", join_missing(.missing))]
    DependencyMissing { missing: Vec<MissingDependency> },

    #[error("{context}: {source}")]
    Infrastructure {
        context: String,
        #[source]
        source: CommandError,
    },

    #[error("kind cluster '{cluster_name}' does not exist")]
    NotFound { cluster_name: String },
}

impl ProviderError {
    /// Wrap a command failure with a sentence describing what was being attempted.
    pub fn infrastructure(context: impl Into<String>, source: CommandError) -> Self {
        Self::Infrastructure {
            context: context.into(),
            source,
        }
    }

    /// Shorthand for a validation failure on a single property.
    pub fn invalid(property: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation(FieldError::new(property, reason).into())
    }

    /// Stable category label, used for metrics.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Validation(_) => ERROR_TYPE_VALIDATION,
            Self::DependencyMissing { .. } => ERROR_TYPE_DEPENDENCY_MISSING,
            Self::Infrastructure {
                source: CommandError::TimedOut { .. },
                ..
            } => ERROR_TYPE_TIMEOUT,
            Self::Infrastructure { .. } => ERROR_TYPE_INFRASTRUCTURE,
            Self::NotFound { .. } => ERROR_TYPE_NOT_FOUND,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

fn join_missing(missing: &[MissingDependency]) -> String {
    missing
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
