// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! JSON Schema of the `KindCluster` resource inputs.
//!
//! The schema is derived with `schemars` from [`KindClusterInputs`] and emitted
//! as JSON Schema draft-07, the dialect the orchestration engine expects.

use crate::constants::DEFAULT_CONFIG_FILE;
use schemars::generate::SchemaSettings;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inputs of a kind cluster resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(title = "KindCluster")]
pub struct KindClusterInputs {
    /// The name of the kind cluster.
    pub cluster_name: String,

    /// Path to the kind configuration file, relative to the working directory.
    #[serde(default = "default_config_file")]
    pub config_file: String,
}

fn default_config_file() -> String {
    DEFAULT_CONFIG_FILE.to_string()
}

/// The draft-07 schema for [`KindClusterInputs`].
#[must_use]
pub fn kind_cluster_schema() -> Value {
    let generator = SchemaSettings::draft07().into_generator();
    generator
        .into_root_schema_for::<KindClusterInputs>()
        .to_value()
}
