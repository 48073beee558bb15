// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! kind cluster lifecycle.
//!
//! A cluster is either absent or present. There is no in-place update: a changed
//! cluster is deleted and created again, and because the two steps are not
//! atomic a failed update can leave the cluster absent.

use crate::args::ClusterConfig;
use crate::command::{run_checked, CommandRunner, Toolchain};
use crate::constants::RESOURCE_KIND_CLUSTER;
use crate::errors::{ProviderError, Result};
use crate::metrics;
use crate::prober::ExistenceProber;
use crate::validation::validate_cluster_config;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// What [`ClusterDriver::delete`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The cluster existed and `kind delete cluster` succeeded
    Deleted,
    /// No cluster by that name was listed; nothing was run
    AlreadyAbsent,
}

/// What [`ClusterDriver::reconcile`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterAction {
    Created,
    Replaced,
}

/// Drives `kind create/delete cluster`.
#[derive(Clone)]
pub struct ClusterDriver {
    runner: Arc<dyn CommandRunner>,
    tools: Toolchain,
    prober: ExistenceProber,
}

impl ClusterDriver {
    pub fn new(runner: Arc<dyn CommandRunner>, tools: Toolchain) -> Self {
        let prober = ExistenceProber::new(runner.clone(), tools.clone());
        Self {
            runner,
            tools,
            prober,
        }
    }

    /// Validate `config` and create the cluster.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any command runs, or an infrastructure
    /// error carrying kind's stderr.
    pub async fn create(&self, config: &ClusterConfig) -> Result<()> {
        validate_cluster_config(config)?;

        let name = &config.cluster_name;
        info!(
            cluster = %name,
            config_file = %config.config_file_path.display(),
            "Creating kind cluster"
        );

        let invocation = self.tools.create_cluster(name, &config.config_file_path);
        run_checked(self.runner.as_ref(), &invocation)
            .await
            .map_err(|e| {
                ProviderError::infrastructure(format!("failed to create kind cluster '{name}'"), e)
            })?;

        metrics::record_resource_created(RESOURCE_KIND_CLUSTER);
        info!(cluster = %name, "Created kind cluster");
        Ok(())
    }

    /// Delete the cluster if it exists.
    ///
    /// # Errors
    ///
    /// Returns an infrastructure error if probing or deletion fails.
    pub async fn delete(&self, name: &str) -> Result<DeleteOutcome> {
        if !self.prober.cluster_exists(name).await? {
            warn!(cluster = %name, "kind cluster does not exist, nothing to delete");
            return Ok(DeleteOutcome::AlreadyAbsent);
        }

        info!(cluster = %name, "Deleting kind cluster");
        let invocation = self.tools.delete_cluster(name);
        run_checked(self.runner.as_ref(), &invocation)
            .await
            .map_err(|e| {
                ProviderError::infrastructure(format!("failed to delete kind cluster '{name}'"), e)
            })?;

        metrics::record_resource_deleted(RESOURCE_KIND_CLUSTER);
        info!(cluster = %name, "Deleted kind cluster");
        Ok(DeleteOutcome::Deleted)
    }

    /// Replace the cluster: delete it, then create it from `config`.
    ///
    /// # Errors
    ///
    /// A failed delete is returned and create is never attempted.
    pub async fn update(&self, config: &ClusterConfig) -> Result<()> {
        validate_cluster_config(config)?;

        self.delete(&config.cluster_name).await?;
        self.create(config).await?;

        metrics::record_resource_replaced(RESOURCE_KIND_CLUSTER);
        Ok(())
    }

    /// Bring the cluster to the state described by `config`: create it when
    /// absent, replace it when present.
    ///
    /// # Errors
    ///
    /// Returns validation, probe, delete or create failures.
    pub async fn reconcile(&self, config: &ClusterConfig) -> Result<ClusterAction> {
        validate_cluster_config(config)?;

        if self.prober.cluster_exists(&config.cluster_name).await? {
            self.update(config).await?;
            Ok(ClusterAction::Replaced)
        } else {
            self.create(config).await?;
            Ok(ClusterAction::Created)
        }
    }
}

#[cfg(test)]
#[path = "cluster_tests.rs"]
mod cluster_tests;
