// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Logging initialization.
//!
//! The host process calls [`init_logging`] once at startup. The format is:
//! timestamp file:line LEVEL message, for example
//! `2025-11-29T23:45:00.123456Z provider.rs:120 INFO Creating kind cluster`.
//!
//! Respects `RUST_LOG` if set, otherwise defaults to INFO level
//! (e.g. `RUST_LOG=kind_native=debug`). `RUST_LOG_FORMAT=json` switches to
//! JSON output.

use crate::constants::ENV_LOG_FORMAT;
use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// Parse a `RUST_LOG_FORMAT` value; anything other than `json` is text.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    /// Format selected by `RUST_LOG_FORMAT`.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var(ENV_LOG_FORMAT)
            .map(|v| Self::parse(&v))
            .unwrap_or(Self::Text)
    }
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = match LogFormat::from_env() {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_file(true)
            .with_line_number(true)
            .with_thread_names(true)
            .with_target(false)
            .json()
            .try_init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_file(true)
            .with_line_number(true)
            .with_thread_names(true)
            .with_target(false)
            .with_ansi(true)
            .compact()
            .try_init(),
    };

    result.map_err(|e| anyhow!("failed to initialize logging: {e}"))
}
