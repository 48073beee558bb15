// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the kind-native provider.
//!
//! All metrics share the namespace prefix `kind_native`.
//!
//! # Metrics Categories
//!
//! - **Operation Metrics** - Check/Diff/Create/Read/Update/Delete outcomes and durations
//! - **Command Metrics** - every `kind`/`docker` invocation and how long it took
//! - **Resource Lifecycle Metrics** - clusters and volumes created, replaced, deleted
//! - **Error Metrics** - failures by operation and error category
//!
//! # Example
//!
//! ```rust,no_run
//! use kind_native::metrics::record_operation_success;
//!
//! record_operation_success("create", std::time::Duration::from_secs(42));
//! ```

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all provider metrics (prometheus-safe)
const METRICS_NAMESPACE: &str = "kind_native";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Operation Metrics
// ============================================================================

/// Total number of provider operations by operation and status
///
/// Labels:
/// - `operation`: `check`, `diff`, `create`, `read`, `update`, `delete`, `reconcile`, `initialize`
/// - `status`: `success` or `error`
pub static OPERATIONS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_operations_total"),
        "Total number of provider operations by operation and status",
    );
    let counter = CounterVec::new(opts, &["operation", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of provider operations in seconds
///
/// Labels:
/// - `operation`: provider operation name
pub static OPERATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_operation_duration_seconds"),
        "Duration of provider operations in seconds by operation",
    )
    .buckets(vec![
        0.01, 0.1, 0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0,
    ]);
    let histogram = HistogramVec::new(opts, &["operation"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

// ============================================================================
// Command Metrics
// ============================================================================

/// Total number of external command invocations
///
/// Labels:
/// - `program`: executable file name (`kind`, `docker`)
/// - `status`: `success`, `failure`, `timeout`, `spawn_error`
pub static COMMANDS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_commands_total"),
        "Total number of external command invocations by program and status",
    );
    let counter = CounterVec::new(opts, &["program", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of external command invocations in seconds
///
/// Labels:
/// - `program`: executable file name
pub static COMMAND_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_command_duration_seconds"),
        "Duration of external command invocations in seconds by program",
    )
    .buckets(vec![
        0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0,
    ]);
    let histogram = HistogramVec::new(opts, &["program"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

// ============================================================================
// Resource Lifecycle Metrics
// ============================================================================

/// Total number of resources created
///
/// Labels:
/// - `resource_type`: `KindCluster` or `DockerVolume`
pub static RESOURCES_CREATED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_resources_created_total"),
        "Total number of resources created by type",
    );
    let counter = CounterVec::new(opts, &["resource_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of resources replaced (deleted and recreated)
///
/// Labels:
/// - `resource_type`: `KindCluster` or `DockerVolume`
pub static RESOURCES_REPLACED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_resources_replaced_total"),
        "Total number of resources replaced by type",
    );
    let counter = CounterVec::new(opts, &["resource_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of resources deleted
///
/// Labels:
/// - `resource_type`: `KindCluster` or `DockerVolume`
pub static RESOURCES_DELETED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_resources_deleted_total"),
        "Total number of resources deleted by type",
    );
    let counter = CounterVec::new(opts, &["resource_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Error Metrics
// ============================================================================

/// Total number of errors by operation and error category
///
/// Labels:
/// - `operation`: provider operation name
/// - `error_type`: `validation_error`, `dependency_missing`, `infrastructure_error`, `timeout`, `not_found`
pub static ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_errors_total"),
        "Total number of errors by operation and error category",
    );
    let counter = CounterVec::new(opts, &["operation", "error_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a successful provider operation
///
/// # Arguments
/// * `operation` - The provider operation (e.g., `create`)
/// * `duration` - Duration of the operation
pub fn record_operation_success(operation: &str, duration: Duration) {
    OPERATIONS_TOTAL
        .with_label_values(&[operation, "success"])
        .inc();
    OPERATION_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(duration.as_secs_f64());
}

/// Record a failed provider operation
///
/// # Arguments
/// * `operation` - The provider operation
/// * `error_type` - Category from [`ProviderError::error_type`](crate::errors::ProviderError::error_type)
/// * `duration` - Duration of the operation before failure
pub fn record_operation_error(operation: &str, error_type: &str, duration: Duration) {
    OPERATIONS_TOTAL
        .with_label_values(&[operation, "error"])
        .inc();
    OPERATION_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(duration.as_secs_f64());
    ERRORS_TOTAL
        .with_label_values(&[operation, error_type])
        .inc();
}

/// Record an external command invocation
///
/// # Arguments
/// * `program` - Executable file name
/// * `status` - `success`, `failure`, `timeout` or `spawn_error`
/// * `duration` - Wall-clock time of the invocation
pub fn record_command(program: &str, status: &str, duration: Duration) {
    COMMANDS_TOTAL.with_label_values(&[program, status]).inc();
    COMMAND_DURATION_SECONDS
        .with_label_values(&[program])
        .observe(duration.as_secs_f64());
}

/// Record resource creation
pub fn record_resource_created(resource_type: &str) {
    RESOURCES_CREATED_TOTAL
        .with_label_values(&[resource_type])
        .inc();
}

/// Record resource replacement
pub fn record_resource_replaced(resource_type: &str) {
    RESOURCES_REPLACED_TOTAL
        .with_label_values(&[resource_type])
        .inc();
}

/// Record resource deletion
pub fn record_resource_deleted(resource_type: &str) {
    RESOURCES_DELETED_TOTAL
        .with_label_values(&[resource_type])
        .inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
