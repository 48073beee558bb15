// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use kind_native::args::PropertyMap;
use kind_native::command::{CommandOutput, CommandRunner, Invocation};
use kind_native::dependencies::DependencyChecker;
use kind_native::errors::CommandError;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Turn a `json!` object into a property map
pub fn props(value: Value) -> PropertyMap {
    value
        .as_object()
        .cloned()
        .expect("test properties must be a JSON object")
}

#[derive(Debug, Clone)]
enum Fault {
    Exit(CommandOutput),
    TimedOut,
}

#[derive(Debug, Default)]
struct RuntimeState {
    clusters: BTreeSet<String>,
    volumes: BTreeSet<String>,
    calls: Vec<Invocation>,
    faults: Vec<(Vec<String>, Fault)>,
}

/// In-memory container runtime answering the `kind` and `docker` subcommands
/// the provider issues.
#[derive(Debug, Default)]
pub struct SimulatedRuntime {
    state: Mutex<RuntimeState>,
}

impl SimulatedRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cluster(self, name: &str) -> Self {
        self.state().clusters.insert(name.to_string());
        self
    }

    pub fn with_volume(self, name: &str) -> Self {
        self.state().volumes.insert(name.to_string());
        self
    }

    /// Every invocation starting with `prefix` exits with `output`
    pub fn respond_with(self, prefix: &[&str], output: CommandOutput) -> Self {
        self.add_fault(prefix, Fault::Exit(output));
        self
    }

    /// Every invocation starting with `prefix` times out
    pub fn time_out_on(self, prefix: &[&str]) -> Self {
        self.add_fault(prefix, Fault::TimedOut);
        self
    }

    fn state(&self) -> MutexGuard<'_, RuntimeState> {
        self.state.lock().unwrap()
    }

    fn add_fault(&self, prefix: &[&str], fault: Fault) {
        let prefix = prefix.iter().map(ToString::to_string).collect();
        self.state().faults.push((prefix, fault));
    }

    pub fn clusters(&self) -> Vec<String> {
        self.state().clusters.iter().cloned().collect()
    }

    pub fn volumes(&self) -> Vec<String> {
        self.state().volumes.iter().cloned().collect()
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.state().calls.clone()
    }

    /// Recorded invocations whose args start with `prefix`
    pub fn calls_of(&self, prefix: &[&str]) -> Vec<Invocation> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    pub fn count(&self, prefix: &[&str]) -> usize {
        self.calls_of(prefix).len()
    }
}

fn listing<'a>(names: impl Iterator<Item = &'a String>) -> String {
    names.map(|n| format!("{n}\n")).collect()
}

fn respond(state: &mut RuntimeState, invocation: &Invocation) -> CommandOutput {
    let args: Vec<&str> = invocation.args.iter().map(String::as_str).collect();
    match args.as_slice() {
        ["get", "clusters"] => CommandOutput::success(listing(state.clusters.iter())),
        ["create", "cluster", "--name", name, ..] => {
            if state.clusters.insert((*name).to_string()) {
                CommandOutput::success("")
            } else {
                let reason = format!(
                    "node(s) already exist for a cluster with the name \"{name}\""
                );
                CommandOutput::failure(1, reason)
            }
        }
        ["delete", "cluster", "--name", name] => {
            state.clusters.remove(*name);
            CommandOutput::success("")
        }
        ["volume", "create", flag] => {
            let name = flag.trim_start_matches("--name=");
            state.volumes.insert(name.to_string());
            CommandOutput::success(format!("{name}\n"))
        }
        ["volume", "rm", name] => {
            if state.volumes.remove(*name) {
                CommandOutput::success(format!("{name}\n"))
            } else {
                let reason = format!("Error response from daemon: get {name}: no such volume");
                CommandOutput::failure(1, reason)
            }
        }
        ["volume", "ls", "--filter", filter, ..] => {
            let needle = filter.trim_start_matches("name=");
            let matching = state.volumes.iter().filter(|v| v.contains(needle));
            CommandOutput::success(listing(matching))
        }
        _ => CommandOutput::failure(127, format!("unexpected command: {invocation}")),
    }
}

#[async_trait]
impl CommandRunner for SimulatedRuntime {
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
            Some(Fault::Exit(output)) => Ok(output),
            Some(Fault::TimedOut) => Err(CommandError::TimedOut {
                command: invocation.to_string(),
                timeout: Duration::from_secs(1),
            }),
            None => Ok(respond(&mut state, invocation)),
        }
    }
}

/// Whether the real `kind` and `docker` binaries are installed; prints a skip
/// notice when they are not.
pub async fn real_tools_available() -> bool {
    match DependencyChecker::new().check(&["kind", "docker"]).await {
        Ok(_) => true,
        Err(e) => {
            eprintln!("Skipping test: {e}");
            false
        }
    }
}
