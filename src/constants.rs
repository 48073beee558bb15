// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the kind-native provider.
//!
//! This module contains all string and numeric constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Resource Constants
// ============================================================================

/// Resource type label for the kind cluster resource
pub const RESOURCE_KIND_CLUSTER: &str = "KindCluster";

/// Resource type label for the per-cluster Docker volumes
pub const RESOURCE_DOCKER_VOLUME: &str = "DockerVolume";

// ============================================================================
// Property Keys
// ============================================================================

/// Name of the kind cluster; also the resource identity
pub const PROP_CLUSTER_NAME: &str = "clusterName";

/// Path to the kind configuration file, relative to the working directory
pub const PROP_CONFIG_FILE: &str = "configFile";

/// Directory the configuration file is resolved against
pub const PROP_WORKING_DIR: &str = "workingDir";

/// Older spelling of [`PROP_WORKING_DIR`], still accepted on input
pub const PROP_KIND_CONFIG_DIR: &str = "kindConfigDir";

/// Whether to purge the cluster's data on delete
pub const PROP_PURGE: &str = "purge";

/// Properties whose change forces replacement of the cluster
pub const SIGNIFICANT_PROPERTIES: [&str; 2] = [PROP_CLUSTER_NAME, PROP_CONFIG_FILE];

// ============================================================================
// Stack Configuration Keys (the `kind` config namespace)
// ============================================================================

/// Stack config key for the cluster name
pub const STACK_KEY_CLUSTER_NAME: &str = "kindClusterName";

/// Stack config key for the kind configuration file
pub const STACK_KEY_CONFIG_FILE: &str = "kindConfigFile";

/// Stack config key for the working directory
pub const STACK_KEY_WORKING_DIR: &str = "workingDir";

/// Stack config key for the purge flag
pub const STACK_KEY_PURGE: &str = "purge";

// ============================================================================
// Defaults
// ============================================================================

/// Cluster name used when a resource omits `clusterName`
pub const DEFAULT_CLUSTER_NAME: &str = "pulumi";

/// Config file used when a resource omits `configFile`
pub const DEFAULT_CONFIG_FILE: &str = "kind/config.yaml";

/// Cluster name used when stack configuration omits `kindClusterName`
pub const DEFAULT_STACK_CLUSTER_NAME: &str = "cluster";

/// Config file used when stack configuration omits `kindConfigFile`
pub const DEFAULT_STACK_CONFIG_FILE: &str = "kind.yaml";

/// Working directory used when stack configuration omits `workingDir`
pub const DEFAULT_STACK_WORKING_DIR: &str = "./";

/// Required suffix of every kind configuration file
pub const CONFIG_FILE_EXTENSION: &str = ".yaml";

/// Suffixes appended to the cluster name to form the default volume set
pub const VOLUME_NAME_SUFFIXES: [&str; 2] = ["worker1-containerd", "control1-containerd"];

// ============================================================================
// External Tools
// ============================================================================

/// Default kind executable
pub const KIND_BINARY: &str = "kind";

/// Default docker executable
pub const DOCKER_BINARY: &str = "docker";

/// Executables that must be present before any lifecycle operation
pub const DEFAULT_DEPENDENCIES: [&str; 2] = [KIND_BINARY, DOCKER_BINARY];

/// Upper bound on a single external invocation (10 minutes; `kind create` pulls node images)
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 600;

/// Fragments of docker's stderr meaning the volume is already gone
pub const DOCKER_NO_SUCH_VOLUME: [&str; 2] = ["no such volume", "No such volume"];

// ============================================================================
// Environment Variables
// ============================================================================

/// Overrides the kind executable
pub const ENV_KIND_BINARY: &str = "KIND_NATIVE_KIND_BINARY";

/// Overrides the docker executable
pub const ENV_DOCKER_BINARY: &str = "KIND_NATIVE_DOCKER_BINARY";

/// Overrides the per-command timeout, in seconds
pub const ENV_COMMAND_TIMEOUT_SECS: &str = "KIND_NATIVE_COMMAND_TIMEOUT_SECS";

/// Overrides the dependency list (comma-separated)
pub const ENV_DEPENDENCIES: &str = "KIND_NATIVE_DEPENDENCIES";

/// Selects the log output format (`json` or `text`)
pub const ENV_LOG_FORMAT: &str = "RUST_LOG_FORMAT";

// ============================================================================
// Operation Labels
// ============================================================================

/// Input validation without side effects
pub const OP_CHECK: &str = "check";

/// Comparison of old and new inputs
pub const OP_DIFF: &str = "diff";

/// Cluster and volume creation
pub const OP_CREATE: &str = "create";

/// Existence check of a managed cluster
pub const OP_READ: &str = "read";

/// Delete-then-create replacement
pub const OP_UPDATE: &str = "update";

/// Idempotent cluster and volume removal
pub const OP_DELETE: &str = "delete";

/// Create-or-replace convergence
pub const OP_RECONCILE: &str = "reconcile";

/// Startup dependency verification
pub const OP_INITIALIZE: &str = "initialize";

// ============================================================================
// Error Types
// ============================================================================

/// Inputs rejected before any external command ran
pub const ERROR_TYPE_VALIDATION: &str = "validation_error";

/// A required executable was not found
pub const ERROR_TYPE_DEPENDENCY_MISSING: &str = "dependency_missing";

/// An external command exceeded its timeout
pub const ERROR_TYPE_TIMEOUT: &str = "timeout";

/// An external command failed or could not be started
pub const ERROR_TYPE_INFRASTRUCTURE: &str = "infrastructure_error";

/// The managed cluster does not exist
pub const ERROR_TYPE_NOT_FOUND: &str = "not_found";

// ============================================================================
// Schema
// ============================================================================

/// JSON Schema dialect of the exported resource schema
pub const SCHEMA_DIALECT: &str = "http://json-schema.org/draft-07/schema#";
