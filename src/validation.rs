// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Structural validation of configurations.
//!
//! These are pure functions: no I/O, no external commands. Every check runs and
//! every failure is reported, but any failure at all stops the caller before it
//! issues an external command.

use crate::args::{ClusterConfig, VolumeSetConfig};
use crate::constants::{
    CONFIG_FILE_EXTENSION, PROP_CLUSTER_NAME, PROP_CONFIG_FILE, PROP_WORKING_DIR,
};
use crate::errors::ValidationErrors;

/// Property name used in volume-set validation errors.
pub const PROP_VOLUME_NAMES: &str = "volumeNames";

/// Validate a [`ClusterConfig`].
///
/// Accepts the configuration iff the cluster name is non-empty, the config file
/// path ends in `.yaml`, and the working directory is non-empty.
///
/// # Errors
///
/// Returns one field error per failed check.
pub fn validate_cluster_config(config: &ClusterConfig) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if config.cluster_name.is_empty() {
        errors.push(PROP_CLUSTER_NAME, "cluster name cannot be empty");
    }

    if !config
        .config_file_path
        .to_string_lossy()
        .ends_with(CONFIG_FILE_EXTENSION)
    {
        let path = config.config_file_path.display();
        errors.push(
            PROP_CONFIG_FILE,
            format!("config file must be a {CONFIG_FILE_EXTENSION} path, got '{path}'"),
        );
    }

    if config.working_directory.as_os_str().is_empty() {
        errors.push(PROP_WORKING_DIR, "working directory cannot be empty");
    }

    errors.into_result()
}

/// Validate a [`VolumeSetConfig`].
///
/// Rejects the set iff the cluster name is empty, the volume list is empty, or
/// any volume name is empty.
///
/// # Errors
///
/// Returns one field error per failed check; empty entries are reported with
/// their index.
pub fn validate_volume_set_config(config: &VolumeSetConfig) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if config.cluster_name.is_empty() {
        errors.push(PROP_CLUSTER_NAME, "cluster name cannot be empty");
    }

    if config.volume_names.is_empty() {
        errors.push(PROP_VOLUME_NAMES, "at least one volume name is required");
    }

    for (index, name) in config.volume_names.iter().enumerate() {
        if name.is_empty() {
            errors.push(
                format!("{PROP_VOLUME_NAMES}[{index}]"),
                "volume name cannot be empty",
            );
        }
    }

    errors.into_result()
}

/// Check that a cluster name uses only ASCII letters, digits and hyphens.
///
/// # Errors
///
/// Returns a `clusterName` field error naming the offending value.
pub fn validate_cluster_name(name: &str) -> Result<(), ValidationErrors> {
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Ok(());
    }
    Err(crate::errors::FieldError::new(
        PROP_CLUSTER_NAME,
        format!("invalid cluster name '{name}': only alphanumerics and hyphens are allowed"),
    )
    .into())
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod validation_tests;
