// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Provider status command

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

use quill_core::domain::llm::Capability;

use super::build_orchestrator;

pub async fn handle(config_override: Option<PathBuf>, check: bool) -> Result<()> {
    let orchestrator = build_orchestrator(config_override)?;

    println!("{}", "AI Providers:".bold());
    for status in orchestrator.provider_statuses() {
        let marker = if status.available {
            "●".green()
        } else {
            "○".dimmed()
        };
        let default = if orchestrator.default_provider() == Some(status.provider) {
            " (default)".cyan().to_string()
        } else {
            String::new()
        };
        println!("  {} {}{}", marker, status.provider.as_str().bold(), default);

        let capabilities = Capability::ALL
            .iter()
            .filter(|c| status.capabilities.contains(**c))
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        println!("    Capabilities: {}", capabilities);
    }
    println!();

    if orchestrator.available_providers().is_empty() {
        println!(
            "{}",
            "No provider configured. Set GEMINI_API_KEY, OPENAI_API_KEY or PERPLEXITY_API_KEY."
                .yellow()
        );
        return Ok(());
    }

    if check {
        println!("{}", "Health checks:".bold());
        let mut results: Vec<_> = orchestrator.health_check_all().await.into_iter().collect();
        results.sort_by_key(|(id, _)| *id);
        for (id, result) in results {
            match result {
                Ok(()) => println!("  {} {}", "✓".green(), id),
                Err(e) => println!("  {} {}: {}", "✗".red(), id, e),
            }
        }
    }

    Ok(())
}
