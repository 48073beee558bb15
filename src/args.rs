// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Typed configuration built from the engine's untyped property maps.
//!
//! The orchestration engine hands the provider a JSON object per call. This
//! module turns it into a [`ClusterConfig`] with defaults applied field by field:
//!
//! - key absent or `null` - the default is used
//! - key present with the expected JSON type - the value is used
//! - key present with any other type - a [`FieldError`](crate::errors::FieldError)
//!   is recorded; the value is never silently replaced by the default
//!
//! All field errors are collected before returning. Paths are made absolute
//! here, before the configuration reaches a lifecycle driver.
//!
//! Two property layouts exist: the resource inputs (`clusterName`, `configFile`,
//! `workingDir`, `purge`) and the stack configuration values of the `kind`
//! namespace (`kindClusterName`, `kindConfigFile`, `workingDir`, `purge`), which
//! have their own defaults.

use crate::constants::{
    DEFAULT_CLUSTER_NAME, DEFAULT_CONFIG_FILE, DEFAULT_STACK_CLUSTER_NAME,
    DEFAULT_STACK_CONFIG_FILE, DEFAULT_STACK_WORKING_DIR, PROP_CLUSTER_NAME, PROP_CONFIG_FILE,
    PROP_KIND_CONFIG_DIR, PROP_PURGE, PROP_WORKING_DIR, STACK_KEY_CLUSTER_NAME,
    STACK_KEY_CONFIG_FILE, STACK_KEY_PURGE, STACK_KEY_WORKING_DIR,
};
use crate::errors::ValidationErrors;
use crate::volume::default_volume_names;
use serde_json::Value;
use std::path::{Component, Path, PathBuf};

/// Untyped property mapping exchanged with the orchestration engine.
pub type PropertyMap = serde_json::Map<String, Value>;

/// Desired state of one kind cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterConfig {
    /// Cluster name; also the resource identity
    pub cluster_name: String,
    /// Absolute path of the kind configuration file
    pub config_file_path: PathBuf,
    /// Absolute directory the configuration file was resolved against
    pub working_directory: PathBuf,
    /// Purge cluster data on delete
    pub purge_on_delete: bool,
}

impl ClusterConfig {
    /// The default volume set belonging to this cluster.
    #[must_use]
    pub fn volume_set(&self) -> VolumeSetConfig {
        VolumeSetConfig::for_cluster(&self.cluster_name)
    }
}

/// The Docker volumes associated with a cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeSetConfig {
    pub cluster_name: String,
    pub volume_names: Vec<String>,
}

impl VolumeSetConfig {
    /// The default volume set for `cluster_name`.
    #[must_use]
    pub fn for_cluster(cluster_name: &str) -> Self {
        Self {
            cluster_name: cluster_name.to_string(),
            volume_names: default_volume_names(cluster_name),
        }
    }
}

/// Property names and defaults for one call path.
#[derive(Debug, Clone, Copy)]
struct ArgumentLayout {
    cluster_name_key: &'static str,
    config_file_key: &'static str,
    /// Accepted spellings of the working directory key, in priority order
    working_dir_keys: &'static [&'static str],
    purge_key: &'static str,
    default_cluster_name: &'static str,
    default_config_file: &'static str,
    /// `None` means the process current directory
    default_working_dir: Option<&'static str>,
}

const RESOURCE_LAYOUT: ArgumentLayout = ArgumentLayout {
    cluster_name_key: PROP_CLUSTER_NAME,
    config_file_key: PROP_CONFIG_FILE,
    working_dir_keys: &[PROP_WORKING_DIR, PROP_KIND_CONFIG_DIR],
    purge_key: PROP_PURGE,
    default_cluster_name: DEFAULT_CLUSTER_NAME,
    default_config_file: DEFAULT_CONFIG_FILE,
    default_working_dir: None,
};

const STACK_LAYOUT: ArgumentLayout = ArgumentLayout {
    cluster_name_key: STACK_KEY_CLUSTER_NAME,
    config_file_key: STACK_KEY_CONFIG_FILE,
    working_dir_keys: &[STACK_KEY_WORKING_DIR],
    purge_key: STACK_KEY_PURGE,
    default_cluster_name: DEFAULT_STACK_CLUSTER_NAME,
    default_config_file: DEFAULT_STACK_CONFIG_FILE,
    default_working_dir: Some(DEFAULT_STACK_WORKING_DIR),
};

/// Build a [`ClusterConfig`] from resource properties.
///
/// # Errors
///
/// Returns every property whose value has the wrong JSON type, and a
/// `workingDir` error if the current directory is needed but unreadable.
pub fn build_cluster_config(props: &PropertyMap) -> Result<ClusterConfig, ValidationErrors> {
    build_with(props, &RESOURCE_LAYOUT, std::env::current_dir)
}

/// Build a [`ClusterConfig`] from the `kind` stack configuration values.
///
/// # Errors
///
/// Same as [`build_cluster_config`].
pub fn build_cluster_config_from_stack(
    values: &PropertyMap,
) -> Result<ClusterConfig, ValidationErrors> {
    build_with(values, &STACK_LAYOUT, std::env::current_dir)
}

/// The default volume set for `cluster_name`.
#[must_use]
pub fn build_volume_set_config(cluster_name: &str) -> VolumeSetConfig {
    VolumeSetConfig::for_cluster(cluster_name)
}

/// Read `clusterName` from a property map.
///
/// Returns `Ok(None)` when the key is absent or `null`.
///
/// # Errors
///
/// Returns a field error when the value is not a string.
pub fn extract_cluster_name(props: &PropertyMap) -> Result<Option<String>, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let name = string_field(props, PROP_CLUSTER_NAME, &mut errors);
    errors.into_result().map(|()| name)
}

fn build_with<F>(
    props: &PropertyMap,
    layout: &ArgumentLayout,
    current_dir: F,
) -> Result<ClusterConfig, ValidationErrors>
where
    F: Fn() -> std::io::Result<PathBuf>,
{
    let mut errors = ValidationErrors::new();

    let cluster_name = string_field(props, layout.cluster_name_key, &mut errors)
        .unwrap_or_else(|| layout.default_cluster_name.to_string());
    let config_file = string_field(props, layout.config_file_key, &mut errors)
        .unwrap_or_else(|| layout.default_config_file.to_string());
    let purge_on_delete = bool_field(props, layout.purge_key, &mut errors).unwrap_or(false);

    let (working_dir_key, working_dir) = layout
        .working_dir_keys
        .iter()
        .find(|key| matches!(props.get(**key), Some(v) if !v.is_null()))
        .map_or((layout.working_dir_keys[0], None), |key| {
            (*key, string_field(props, key, &mut errors))
        });

    let working_directory = match working_dir.or(layout.default_working_dir.map(String::from)) {
        // An explicit empty value is kept so validation can reject it.
        Some(dir) if dir.is_empty() => PathBuf::new(),
        Some(dir) => match absolutize(Path::new(&dir), &current_dir) {
            Ok(path) => path,
            Err(e) => {
                errors.push(working_dir_key, format!("cannot resolve '{dir}': {e}"));
                PathBuf::new()
            }
        },
        None => match current_dir() {
            Ok(dir) => normalize(&dir),
            Err(e) => {
                let reason = format!("cannot determine the current directory: {e}");
                errors.push(working_dir_key, reason);
                PathBuf::new()
            }
        },
    };

    let config_file_path = if config_file.is_empty() {
        PathBuf::new()
    } else {
        normalize(&working_directory.join(&config_file))
    };

    errors.into_result()?;

    Ok(ClusterConfig {
        cluster_name,
        config_file_path,
        working_directory,
        purge_on_delete,
    })
}

fn string_field(props: &PropertyMap, key: &str, errors: &mut ValidationErrors) -> Option<String> {
    match props.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(value)) => Some(value.clone()),
        Some(other) => {
            errors.push(key, format!("expected a string, got {}", json_type(other)));
            None
        }
    }
}

fn bool_field(props: &PropertyMap, key: &str, errors: &mut ValidationErrors) -> Option<bool> {
    match props.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::Bool(value)) => Some(*value),
        Some(other) => {
            errors.push(key, format!("expected a boolean, got {}", json_type(other)));
            None
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn absolutize<F>(path: &Path, current_dir: &F) -> std::io::Result<PathBuf>
where
    F: Fn() -> std::io::Result<PathBuf>,
{
    if path.is_absolute() {
        Ok(normalize(path))
    } else {
        Ok(normalize(&current_dir()?.join(path)))
    }
}

/// Lexically remove `.` components and resolve `..` against preceding names.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component.as_os_str());
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
#[path = "args_tests.rs"]
mod args_tests;
