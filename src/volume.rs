// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Docker volume lifecycle.
//!
//! Every cluster owns a fixed set of volumes derived from its name (see
//! [`default_volume_names`]). Create, update and ensure always act on that
//! default set; delete acts on the names it is given. Commands run one at a
//! time and the first failure aborts the rest of the sequence.

use crate::args::VolumeSetConfig;
use crate::command::{CommandRunner, Toolchain};
use crate::constants::{DOCKER_NO_SUCH_VOLUME, RESOURCE_DOCKER_VOLUME, VOLUME_NAME_SUFFIXES};
use crate::errors::{ProviderError, Result};
use crate::metrics;
use crate::prober::ExistenceProber;
use crate::validation::validate_volume_set_config;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The volume names belonging to `cluster_name`, in creation order.
#[must_use]
pub fn default_volume_names(cluster_name: &str) -> Vec<String> {
    VOLUME_NAME_SUFFIXES
        .iter()
        .map(|suffix| format!("{cluster_name}-{suffix}"))
        .collect()
}

/// Drives `docker volume` create/rm for a cluster's volume set.
#[derive(Clone)]
pub struct VolumeDriver {
    runner: Arc<dyn CommandRunner>,
    tools: Toolchain,
    prober: ExistenceProber,
}

impl VolumeDriver {
    pub fn new(runner: Arc<dyn CommandRunner>, tools: Toolchain) -> Self {
        let prober = ExistenceProber::new(runner.clone(), tools.clone());
        Self {
            runner,
            tools,
            prober,
        }
    }

    /// Validate `config`, then create the default volumes for its cluster.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any command runs, or the
    /// infrastructure error of the first `docker volume create` that fails.
    pub async fn create(&self, config: &VolumeSetConfig) -> Result<()> {
        validate_volume_set_config(config)?;

        for name in default_volume_names(&config.cluster_name) {
            let invocation = self.tools.create_volume(&name);
            self.runner
                .run(&invocation)
                .await
                .and_then(|output| output.into_stdout(&invocation))
                .map_err(|e| {
                    ProviderError::infrastructure(
                        format!("failed to create docker volume '{name}'"),
                        e,
                    )
                })?;

            metrics::record_resource_created(RESOURCE_DOCKER_VOLUME);
            info!(volume = %name, cluster = %config.cluster_name, "Created docker volume");
        }
        Ok(())
    }

    /// Remove each named volume in order. A volume docker reports as missing
    /// counts as removed.
    ///
    /// # Errors
    ///
    /// Returns the infrastructure error of the first removal that fails for
    /// any other reason.
    pub async fn delete<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        for name in names {
            let name = name.as_ref();
            let invocation = self.tools.remove_volume(name);
            let output = self.runner.run(&invocation).await.map_err(|e| {
                ProviderError::infrastructure(format!("failed to delete docker volume '{name}'"), e)
            })?;

            if !output.is_success() && is_no_such_volume(&output.stderr) {
                warn!(volume = %name, "Docker volume already absent, nothing to delete");
                continue;
            }

            output.into_stdout(&invocation).map_err(|e| {
                ProviderError::infrastructure(format!("failed to delete docker volume '{name}'"), e)
            })?;

            metrics::record_resource_deleted(RESOURCE_DOCKER_VOLUME);
            info!(volume = %name, "Deleted docker volume");
        }
        Ok(())
    }

    /// Delete and recreate the default volume set.
    ///
    /// # Errors
    ///
    /// A failed delete aborts before anything is created.
    pub async fn update(&self, config: &VolumeSetConfig) -> Result<()> {
        validate_volume_set_config(config)?;
        let names = default_volume_names(&config.cluster_name);

        self.delete(&names).await?;
        self.create(config).await?;

        metrics::record_resource_replaced(RESOURCE_DOCKER_VOLUME);
        Ok(())
    }

    /// Create the default volume set unless every volume in it already exists.
    ///
    /// # Errors
    ///
    /// Returns probe or create failures.
    pub async fn ensure(&self, config: &VolumeSetConfig) -> Result<()> {
        validate_volume_set_config(config)?;
        let names = default_volume_names(&config.cluster_name);

        if self.prober.volumes_exist(&names).await? {
            debug!(cluster = %config.cluster_name, "Docker volumes already present");
            return Ok(());
        }
        self.create(config).await
    }
}

fn is_no_such_volume(stderr: &str) -> bool {
    DOCKER_NO_SUCH_VOLUME
        .iter()
        .any(|marker| stderr.contains(marker))
}

#[cfg(test)]
#[path = "volume_tests.rs"]
mod volume_tests;
