// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # kind-native - Declarative lifecycle for kind clusters
//!
//! kind-native reconciles the desired state of an ephemeral Kubernetes-in-Docker
//! ("kind") cluster, and the Docker volumes that belong to it, against what the
//! container runtime actually reports. It drives the `kind` and `docker`
//! command-line tools and answers an orchestration engine's
//! Check / Diff / Create / Read / Update / Delete calls.
//!
//! ## Modules
//!
//! - [`provider`] - the engine-facing [`KindClusterProvider`](provider::KindClusterProvider)
//! - [`args`] - untyped property maps to typed configuration
//! - [`validation`] - structural checks run before any external command
//! - [`prober`] - existence checks for clusters and volumes
//! - [`cluster`] / [`volume`] - lifecycle drivers
//! - [`command`] - the [`CommandRunner`](command::CommandRunner) seam and `kind`/`docker` argv
//! - [`dependencies`] - concurrent verification of installed tools
//! - [`settings`], [`telemetry`], [`metrics`] - runtime configuration, logging, Prometheus
//! - [`schema`] - JSON Schema of the resource inputs
//!
//! ## Example
//!
//! ```rust,no_run
//! use kind_native::provider::KindClusterProvider;
//! use kind_native::settings::ProviderSettings;
//! use serde_json::json;
//!
//! # async fn example() -> anyhow::Result<()> {
//! kind_native::telemetry::init_logging()?;
//!
//! let provider = KindClusterProvider::with_process_runner(ProviderSettings::new(
//!     env!("CARGO_PKG_VERSION"),
//! ));
//! provider.initialize().await?;
//!
//! let olds = serde_json::Map::new();
//! let news = json!({ "clusterName": "dev", "configFile": "kind/config.yaml" })
//!     .as_object()
//!     .cloned()
//!     .unwrap_or_default();
//!
//! let check = provider.check(&olds, &news);
//! if check.is_valid() {
//!     let created = provider.create(&news).await?;
//!     provider.delete(&created.id, &created.outputs).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod args;
pub mod cluster;
pub mod command;
pub mod constants;
pub mod dependencies;
pub mod errors;
pub mod metrics;
pub mod prober;
pub mod provider;
pub mod schema;
pub mod settings;
pub mod telemetry;
pub mod validation;
pub mod volume;

#[cfg(test)]
mod testing;
