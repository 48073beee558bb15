// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory stand-in for `kind` and `docker`, shared by the unit tests.

use crate::command::{CommandOutput, CommandRunner, Invocation};
use crate::errors::CommandError;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// What an injected fault does to a matching invocation.
#[derive(Debug, Clone)]
enum Fault {
    Exit(CommandOutput),
    TimedOut,
}

#[derive(Debug, Default)]
struct FakeState {
    clusters: BTreeSet<String>,
    volumes: BTreeSet<String>,
    calls: Vec<Invocation>,
    faults: Vec<(Vec<String>, Fault)>,
}

/// Simulates the cluster and volume namespaces and records every invocation.
#[derive(Debug, Default)]
pub(crate) struct FakeRuntime {
    state: Mutex<FakeState>,
}

impl FakeRuntime {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_cluster(self, name: &str) -> Self {
        self.state().clusters.insert(name.to_string());
        self
    }

    pub(crate) fn with_volume(self, name: &str) -> Self {
        self.state().volumes.insert(name.to_string());
        self
    }

    /// Answer every invocation whose args start with `prefix` with `output`.
    pub(crate) fn respond_with(self, prefix: &[&str], output: CommandOutput) -> Self {
        self.add_fault(prefix, Fault::Exit(output));
        self
    }

    /// Make every invocation whose args start with `prefix` time out.
    pub(crate) fn time_out_on(self, prefix: &[&str]) -> Self {
        self.add_fault(prefix, Fault::TimedOut);
        self
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    fn add_fault(&self, prefix: &[&str], fault: Fault) {
        let prefix = prefix.iter().map(ToString::to_string).collect();
        self.state().faults.push((prefix, fault));
    }

    pub(crate) fn clusters(&self) -> Vec<String> {
        self.state().clusters.iter().cloned().collect()
    }

    pub(crate) fn volumes(&self) -> Vec<String> {
        self.state().volumes.iter().cloned().collect()
    }

    pub(crate) fn calls(&self) -> Vec<Invocation> {
        self.state().calls.clone()
    }

    /// Number of recorded invocations whose args start with `prefix`.
    pub(crate) fn count(&self, prefix: &[&str]) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }
}

fn flag_value(invocation: &Invocation, flag: &str) -> Option<String> {
    invocation
        .args
        .iter()
        .position(|a| a == flag)
        .and_then(|i| invocation.args.get(i + 1))
        .cloned()
}

#[async_trait]
impl CommandRunner for FakeRuntime {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, CommandError> {
        let mut state = self.state();
        state.calls.push(invocation.clone());

        let fault = state
            .faults
            .iter()
            .find(|(prefix, _)| {
                let prefix: Vec<&str> = prefix.iter().map(String::as_str).collect();
                invocation.starts_with(&prefix)
            })
            .map(|(_, fault)| fault.clone());
        match fault {
            Some(Fault::Exit(output)) => return Ok(output),
            Some(Fault::TimedOut) => {
                return Err(CommandError::TimedOut {
                    command: invocation.to_string(),
                    timeout: Duration::from_secs(1),
                })
            }
            None => {}
        }

        let output = if invocation.starts_with(&["get", "clusters"]) {
            if state.clusters.is_empty() {
                CommandOutput {
                    exit_code: Some(0),
                    stdout: String::new(),
                    stderr: "No kind clusters found.\n".to_string(),
                }
            } else {
                let listing: String = state.clusters.iter().map(|c| format!("{c}\n")).collect();
                CommandOutput::success(listing)
            }
        } else if invocation.starts_with(&["create", "cluster"]) {
            let name = flag_value(invocation, "--name").unwrap_or_else(|| "kind".to_string());
            if state.clusters.insert(name.clone()) {
                CommandOutput::success("")
            } else {
                let reason = format!(
                    "ERROR: node(s) already exist for a cluster with the name \"{name}\""
                );
                CommandOutput::failure(1, reason)
            }
        } else if invocation.starts_with(&["delete", "cluster"]) {
            let name = flag_value(invocation, "--name").unwrap_or_else(|| "kind".to_string());
            state.clusters.remove(&name);
            CommandOutput::success("")
        } else if invocation.starts_with(&["volume", "create"]) {
            let name = invocation.args[2].trim_start_matches("--name=").to_string();
            state.volumes.insert(name.clone());
            CommandOutput::success(format!("{name}\n"))
        } else if invocation.starts_with(&["volume", "rm"]) {
            let name = invocation.args[2].clone();
            if state.volumes.remove(&name) {
                CommandOutput::success(format!("{name}\n"))
            } else {
                CommandOutput::failure(
                    1,
                    format!("Error response from daemon: get {name}: no such volume"),
                )
            }
        } else if invocation.starts_with(&["volume", "ls"]) {
            let filter = flag_value(invocation, "--filter").unwrap_or_default();
            let needle = filter.trim_start_matches("name=");
            let listing: String = state
                .volumes
                .iter()
                .filter(|v| v.contains(needle))
                .map(|v| format!("{v}\n"))
                .collect();
            CommandOutput::success(listing)
        } else {
            CommandOutput::failure(127, format!("unknown command: {invocation}"))
        };

        Ok(output)
    }
}
