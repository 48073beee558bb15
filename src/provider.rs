// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The engine-facing `KindCluster` resource provider.
//!
//! [`KindClusterProvider`] answers the orchestration engine's lifecycle calls:
//!
//! | Call | Behavior |
//! |------|----------|
//! | `check` | build and validate the inputs, report per-property failures |
//! | `diff` | compare old and new inputs; `clusterName`/`configFile` force a replacement |
//! | `create` | create the cluster, then its volumes |
//! | `read` | confirm the cluster still exists and echo its properties |
//! | `update` | replace the cluster, then its volumes |
//! | `delete` | delete the cluster, then its volumes; safe to repeat |
//! | `reconcile` | create the cluster if absent, replace it if present, ensure volumes |
//! | `initialize` | verify `kind` and `docker` are installed |
//!
//! Every call is wrapped in a tracing span and counted in
//! [`metrics`](crate::metrics). Nothing is retried and nothing is rolled back:
//! if the volume step fails after the cluster step succeeded, the error is
//! returned and the cluster stays as it is.
//!
//! # Example
//!
//! ```rust,no_run
//! use kind_native::provider::KindClusterProvider;
//! use kind_native::settings::ProviderSettings;
//! use serde_json::json;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let provider = KindClusterProvider::with_process_runner(ProviderSettings::from_env(
//!     env!("CARGO_PKG_VERSION"),
//! )?);
//! provider.initialize().await?;
//!
//! let news = json!({ "clusterName": "dev" }).as_object().cloned().unwrap_or_default();
//! let created = provider.create(&news).await?;
//! assert_eq!(created.id, "dev");
//! # Ok(())
//! # }
//! ```

use crate::args::{build_cluster_config, extract_cluster_name, PropertyMap};
use crate::cluster::{ClusterAction, ClusterDriver, DeleteOutcome};
use crate::command::{CommandRunner, ProcessRunner, Toolchain};
use crate::constants::{
    ERROR_TYPE_VALIDATION, OP_CHECK, OP_CREATE, OP_DELETE, OP_DIFF, OP_INITIALIZE, OP_READ,
    OP_RECONCILE, OP_UPDATE, PROP_CLUSTER_NAME, SIGNIFICANT_PROPERTIES,
};
use crate::dependencies::DependencyChecker;
use crate::errors::{FieldError, ProviderError, Result};
use crate::metrics;
use crate::prober::ExistenceProber;
use crate::schema::kind_cluster_schema;
use crate::settings::ProviderSettings;
use crate::validation::{validate_cluster_config, validate_cluster_name};
use crate::volume::{default_volume_names, VolumeDriver};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, field, info, info_span, Instrument, Span};

// ============================================================================
// Engine Result Types
// ============================================================================

/// One input property rejected by `check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckFailure {
    pub property: String,
    pub reason: String,
}

impl From<FieldError> for CheckFailure {
    fn from(error: FieldError) -> Self {
        Self {
            property: error.property,
            reason: error.reason,
        }
    }
}

/// Result of `check`: the inputs as accepted, plus any failures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub inputs: PropertyMap,
    pub failures: Vec<CheckFailure>,
}

impl CheckResult {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Result of `diff`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
    /// Whether any property differs
    pub changed: bool,
    /// Changed properties that force a replacement, in declaration order
    pub replace_keys: Vec<String>,
    /// Every property whose value differs, sorted
    pub changed_keys: Vec<String>,
    /// The old resource must be deleted before the new one is created
    pub delete_before_replace: bool,
}

/// Result of `create`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateResult {
    /// Resource id; the cluster name
    pub id: String,
    pub outputs: PropertyMap,
}

/// Result of `read`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadResult {
    pub id: String,
    pub properties: PropertyMap,
}

/// Result of `update`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateResult {
    pub outputs: PropertyMap,
}

/// Result of `reconcile`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileResult {
    pub id: String,
    pub action: ClusterAction,
    pub outputs: PropertyMap,
}

/// Result of `plugin_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginInfo {
    pub version: String,
}

// ============================================================================
// Provider
// ============================================================================

/// Lifecycle provider for `KindCluster` resources and their Docker volumes.
pub struct KindClusterProvider {
    settings: ProviderSettings,
    clusters: ClusterDriver,
    volumes: VolumeDriver,
    prober: ExistenceProber,
    dependencies: DependencyChecker,
}

impl KindClusterProvider {
    /// Provider that runs every external command through `runner`.
    pub fn new(settings: ProviderSettings, runner: Arc<dyn CommandRunner>) -> Self {
        let tools = Toolchain::new(&settings.kind_binary, &settings.docker_binary);
        Self {
            clusters: ClusterDriver::new(runner.clone(), tools.clone()),
            volumes: VolumeDriver::new(runner.clone(), tools.clone()),
            prober: ExistenceProber::new(runner, tools),
            dependencies: DependencyChecker::new(),
            settings,
        }
    }

    /// Provider backed by real child processes, bounded by the configured timeout.
    #[must_use]
    pub fn with_process_runner(settings: ProviderSettings) -> Self {
        let runner = Arc::new(ProcessRunner::new(settings.command_timeout));
        Self::new(settings, runner)
    }

    /// Replace the dependency checker used by [`initialize`](Self::initialize).
    #[must_use]
    pub fn with_dependency_checker(mut self, checker: DependencyChecker) -> Self {
        self.dependencies = checker;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    /// Verify that every configured dependency is installed.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::DependencyMissing`] naming every missing tool.
    pub async fn initialize(&self) -> Result<()> {
        observe(OP_INITIALIZE, self.initialize_inner())
            .instrument(info_span!("provider", operation = OP_INITIALIZE))
            .await
    }

    async fn initialize_inner(&self) -> Result<()> {
        let resolved = self.dependencies.check(&self.settings.dependencies).await?;
        info!(
            dependencies = resolved.len(),
            version = %self.settings.version,
            "Provider initialized"
        );
        Ok(())
    }

    /// Validate new inputs.
    ///
    /// Input problems are reported as [`CheckFailure`]s, never as an error.
    #[must_use]
    pub fn check(&self, _olds: &PropertyMap, news: &PropertyMap) -> CheckResult {
        let span = operation_span(OP_CHECK, news);
        let _entered = span.enter();
        let start = Instant::now();

        let mut failures: Vec<CheckFailure> = Vec::new();
        match build_cluster_config(news) {
            Ok(config) => {
                if let Err(errors) = validate_cluster_config(&config) {
                    failures.extend(errors.errors.into_iter().map(CheckFailure::from));
                }
                if !config.cluster_name.is_empty() {
                    if let Err(errors) = validate_cluster_name(&config.cluster_name) {
                        failures.extend(errors.errors.into_iter().map(CheckFailure::from));
                    }
                }
            }
            Err(errors) => failures.extend(errors.errors.into_iter().map(CheckFailure::from)),
        }

        if failures.is_empty() {
            metrics::record_operation_success(OP_CHECK, start.elapsed());
        } else {
            info!(failures = failures.len(), "Inputs failed validation");
            metrics::record_operation_error(OP_CHECK, ERROR_TYPE_VALIDATION, start.elapsed());
        }

        CheckResult {
            inputs: news.clone(),
            failures,
        }
    }

    /// Compare old and new inputs.
    ///
    /// Values are compared as raw JSON, so a key that is present on one side
    /// only counts as changed.
    #[must_use]
    pub fn diff(&self, olds: &PropertyMap, news: &PropertyMap) -> DiffResult {
        let span = operation_span(OP_DIFF, news);
        let _entered = span.enter();
        let start = Instant::now();

        let keys: BTreeSet<&String> = olds.keys().chain(news.keys()).collect();
        let changed_keys: Vec<String> = keys
            .into_iter()
            .filter(|key| olds.get(*key) != news.get(*key))
            .cloned()
            .collect();

        let replace_keys: Vec<String> = SIGNIFICANT_PROPERTIES
            .iter()
            .filter(|key| olds.get(**key) != news.get(**key))
            .map(ToString::to_string)
            .collect();

        let result = DiffResult {
            changed: !changed_keys.is_empty(),
            delete_before_replace: !replace_keys.is_empty(),
            replace_keys,
            changed_keys,
        };

        info!(
            changed = result.changed,
            replace = ?result.replace_keys,
            "Computed diff"
        );
        metrics::record_operation_success(OP_DIFF, start.elapsed());
        result
    }

    /// Create the cluster and its volumes.
    ///
    /// # Errors
    ///
    /// Returns validation errors before any command runs, or the infrastructure
    /// error of the first failing step.
    pub async fn create(&self, news: &PropertyMap) -> Result<CreateResult> {
        observe(OP_CREATE, self.create_inner(news))
            .instrument(operation_span(OP_CREATE, news))
            .await
    }

    async fn create_inner(&self, news: &PropertyMap) -> Result<CreateResult> {
        let config = build_cluster_config(news)?;
        validate_cluster_config(&config)?;

        self.clusters.create(&config).await?;
        self.volumes.create(&config.volume_set()).await?;

        info!(cluster = %config.cluster_name, "Created kind cluster resource");
        Ok(CreateResult {
            id: config.cluster_name,
            outputs: news.clone(),
        })
    }

    /// Confirm that the cluster named in `props` exists.
    ///
    /// # Errors
    ///
    /// Returns a validation error when `clusterName` is missing or not a
    /// string, and [`ProviderError::NotFound`] when the cluster is absent.
    pub async fn read(&self, id: &str, props: &PropertyMap) -> Result<ReadResult> {
        observe(OP_READ, self.read_inner(id, props))
            .instrument(operation_span(OP_READ, props))
            .await
    }

    async fn read_inner(&self, id: &str, props: &PropertyMap) -> Result<ReadResult> {
        let cluster_name = extract_cluster_name(props)?
            .ok_or_else(|| ProviderError::invalid(PROP_CLUSTER_NAME, "cluster name is required"))?;

        if !self.prober.cluster_exists(&cluster_name).await? {
            return Err(ProviderError::NotFound { cluster_name });
        }

        Ok(ReadResult {
            id: id.to_string(),
            properties: props.clone(),
        })
    }

    /// Replace the cluster and its volumes with the new inputs.
    ///
    /// # Errors
    ///
    /// A failed cluster delete is returned before anything is created.
    pub async fn update(
        &self,
        id: &str,
        _olds: &PropertyMap,
        news: &PropertyMap,
    ) -> Result<UpdateResult> {
        observe(OP_UPDATE, self.update_inner(id, news))
            .instrument(operation_span(OP_UPDATE, news))
            .await
    }

    async fn update_inner(&self, id: &str, news: &PropertyMap) -> Result<UpdateResult> {
        let config = build_cluster_config(news)?;
        validate_cluster_config(&config)?;

        self.clusters.update(&config).await?;
        self.volumes.update(&config.volume_set()).await?;

        info!(id = %id, cluster = %config.cluster_name, "Updated kind cluster resource");
        Ok(UpdateResult {
            outputs: news.clone(),
        })
    }

    /// Delete the cluster named in `props` and its default volumes.
    ///
    /// Properties without a `clusterName` describe nothing to delete and
    /// succeed immediately. Repeating a delete succeeds.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a non-string `clusterName`, or the
    /// infrastructure error of the first failing step.
    pub async fn delete(&self, id: &str, props: &PropertyMap) -> Result<()> {
        observe(OP_DELETE, self.delete_inner(id, props))
            .instrument(operation_span(OP_DELETE, props))
            .await
    }

    async fn delete_inner(&self, id: &str, props: &PropertyMap) -> Result<()> {
        let Some(cluster_name) = extract_cluster_name(props)? else {
            info!(id = %id, "No cluster name in properties, nothing to delete");
            return Ok(());
        };

        let outcome = self.clusters.delete(&cluster_name).await?;
        self.volumes
            .delete(&default_volume_names(&cluster_name))
            .await?;

        if outcome == DeleteOutcome::AlreadyAbsent {
            info!(cluster = %cluster_name, "kind cluster resource was already deleted");
        } else {
            info!(cluster = %cluster_name, "Deleted kind cluster resource");
        }
        Ok(())
    }

    /// Create the cluster if it is absent, replace it if present, then make
    /// sure its volumes exist.
    ///
    /// # Errors
    ///
    /// Returns validation, probe or lifecycle failures.
    pub async fn reconcile(&self, news: &PropertyMap) -> Result<ReconcileResult> {
        observe(OP_RECONCILE, self.reconcile_inner(news))
            .instrument(operation_span(OP_RECONCILE, news))
            .await
    }

    async fn reconcile_inner(&self, news: &PropertyMap) -> Result<ReconcileResult> {
        let config = build_cluster_config(news)?;
        validate_cluster_config(&config)?;

        let action = self.clusters.reconcile(&config).await?;
        self.volumes.ensure(&config.volume_set()).await?;

        info!(cluster = %config.cluster_name, ?action, "Reconciled kind cluster resource");
        Ok(ReconcileResult {
            id: config.cluster_name,
            action,
            outputs: news.clone(),
        })
    }

    /// JSON Schema (draft-07) of the resource inputs.
    #[must_use]
    pub fn schema(&self) -> Value {
        kind_cluster_schema()
    }

    #[must_use]
    pub fn plugin_info(&self) -> PluginInfo {
        PluginInfo {
            version: self.settings.version.clone(),
        }
    }
}

/// Span for one provider call, tagged with the cluster name when the inputs carry one.
fn operation_span(operation: &'static str, props: &PropertyMap) -> Span {
    let span = info_span!("provider", operation, cluster = field::Empty);
    if let Some(Value::String(name)) = props.get(PROP_CLUSTER_NAME) {
        span.record("cluster", name.as_str());
    }
    span
}

/// Await `operation` and record its outcome and duration.
async fn observe<T, F>(operation: &'static str, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let start = Instant::now();
    let result = future.await;
    let duration = start.elapsed();

    match &result {
        Ok(_) => metrics::record_operation_success(operation, duration),
        Err(e) => {
            error!(operation, error = %e, "Provider operation failed");
            metrics::record_operation_error(operation, e.error_type(), duration);
        }
    }
    result
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod provider_tests;
