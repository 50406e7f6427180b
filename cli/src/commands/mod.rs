// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for Quill CLI

pub mod config;
pub mod content;
pub mod providers;

pub use self::config::ConfigCommand;
pub use self::content::{BlogPostArgs, EnhanceArgs, GenerateArgs, ImageArgs, ResearchArgs, SeoArgs};

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

use quill_core::application::ContentOrchestrator;
use quill_core::domain::config::OrchestratorConfig;

/// Load configuration and construct the orchestrator
pub fn build_orchestrator(config_override: Option<PathBuf>) -> Result<ContentOrchestrator> {
    let config =
        OrchestratorConfig::load_or_default(config_override).context("Failed to load configuration")?;
    config
        .validate()
        .context("Configuration validation failed")?;

    ContentOrchestrator::from_config(&config).context("Failed to initialize providers")
}

/// Print a result as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize result")?;
    println!("{}", json);
    Ok(())
}
