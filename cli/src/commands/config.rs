// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use quill_core::domain::config::{credential_env_var, OrchestratorConfig};
use quill_core::domain::llm::ProviderId;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,

        /// Print the effective manifest as YAML (keys redacted)
        #[arg(long)]
        yaml: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./quill-config.yaml)
        #[arg(short, long, default_value = "./quill-config.yaml")]
        output: PathBuf,

        /// Include examples and comments
        #[arg(long)]
        examples: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths, yaml } => show(config_override, paths, yaml).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output, examples } => generate(output, examples).await,
    }
}

/// Replace literal keys with a marker; `env:` references are kept
fn redacted(mut config: OrchestratorConfig) -> OrchestratorConfig {
    for id in ProviderId::ALL {
        let settings = config.spec.providers.get_mut(id);
        if let Some(key) = &settings.api_key {
            if !key.starts_with("env:") {
                settings.api_key = Some("***".to_string());
            }
        }
    }
    config
}

async fn show(config_override: Option<PathBuf>, show_paths: bool, as_yaml: bool) -> Result<()> {
    let config = OrchestratorConfig::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. QUILL_CONFIG_PATH: {}",
            std::env::var("QUILL_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./quill-config.yaml");
        println!("  4. ~/.quill/config.yaml");
        println!("  5. /etc/quill/config.yaml");
        println!();
    }

    if as_yaml {
        let yaml = serde_yaml::to_string(&redacted(config))
            .context("Failed to serialize configuration")?;
        print!("{}", yaml);
        return Ok(());
    }

    println!("{}", "Current configuration:".bold());
    println!("  Name: {}", config.metadata.name);
    println!();

    let credentials = config.credentials();
    println!("{}", "AI Providers:".bold());
    for id in ProviderId::ALL {
        let settings = config.spec.providers.get(id);
        let state = if credentials.get(id).is_some() {
            "configured".green()
        } else {
            format!("not configured ({})", credential_env_var(id)).dimmed()
        };
        println!("  {} - {}", id.as_str().bold(), state);
        if let Some(model) = &settings.model {
            println!("    Model: {}", model);
        }
        if let Some(base_url) = &settings.base_url {
            println!("    Endpoint: {}", base_url);
        }
    }
    println!();

    println!("{}", "Orchestration:".bold());
    let order = config
        .spec
        .preference_order
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(" → ");
    println!("  Preference order: {}", order);
    println!("  Request timeout: {:?}", config.spec.request_timeout);
    println!("  Temperature: {}", config.spec.temperature);
    println!("  Max tokens: {}", config.spec.max_tokens);
    println!();

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = OrchestratorConfig::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    if config.credentials().configured().is_empty() {
        println!(
            "{}",
            "⚠ No provider credential is set; every generation call will fail".yellow()
        );
    }

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: PathBuf, with_examples: bool) -> Result<()> {
    let sample = if with_examples {
        include_str!("../../templates/config-with-examples.yaml")
    } else {
        include_str!("../../templates/config-minimal.yaml")
    };

    std::fs::write(&output, sample)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_parse_and_validate() {
        for template in [
            include_str!("../../templates/config-minimal.yaml"),
            include_str!("../../templates/config-with-examples.yaml"),
        ] {
            let config = OrchestratorConfig::from_yaml_str(template).unwrap();
            config.validate().unwrap();
        }
    }

    #[test]
    fn test_redaction_keeps_env_references() {
        let mut config = OrchestratorConfig::default();
        config.spec.providers.openai.api_key = Some("sk-secret".to_string());
        config.spec.providers.gemini.api_key = Some("env:GEMINI_API_KEY".to_string());

        let config = redacted(config);
        assert_eq!(config.spec.providers.openai.api_key.as_deref(), Some("***"));
        assert_eq!(
            config.spec.providers.gemini.api_key.as_deref(),
            Some("env:GEMINI_API_KEY")
        );
    }
}
