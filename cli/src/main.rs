// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Quill CLI
//!
//! The `quill` binary drives the content orchestrator from the command line.
//!
//! ## Commands
//!
//! - `quill providers [--check]` - Provider availability and health
//! - `quill generate|seo|enhance|image|research` - Single provider operations
//! - `quill blog-post` - Research, content, SEO and image in one run
//! - `quill config show|validate|generate` - Configuration management
//!
//! Results print as JSON on stdout. Ctrl-C cancels the running operation.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use quill_cli::commands::{
    self, BlogPostArgs, ConfigCommand, EnhanceArgs, GenerateArgs, ImageArgs, ResearchArgs,
    SeoArgs,
};

/// Quill - AI content generation across Gemini, OpenAI and Perplexity
#[derive(Parser)]
#[command(name = "quill")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "QUILL_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "QUILL_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List providers, their availability and capabilities
    #[command(name = "providers")]
    Providers {
        /// Also verify each configured provider's credentials
        #[arg(long)]
        check: bool,
    },

    /// Generate an article
    #[command(name = "generate")]
    Generate(GenerateArgs),

    /// Analyze content for SEO
    #[command(name = "seo")]
    Seo(SeoArgs),

    /// Rewrite, expand, summarize or improve content
    #[command(name = "enhance")]
    Enhance(EnhanceArgs),

    /// Generate an image
    #[command(name = "image")]
    Image(ImageArgs),

    /// Research a topic
    #[command(name = "research")]
    Research(ResearchArgs),

    /// Generate a complete blog post
    #[command(name = "blog-post")]
    BlogPost(BlogPostArgs),

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up provider keys from a local .env before anything reads the environment
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling");
            signal_token.cancel();
        }
    });

    match cli.command {
        Some(Commands::Providers { check }) => commands::providers::handle(cli.config, check).await,
        Some(Commands::Generate(args)) => commands::content::generate(args, cli.config, &cancel).await,
        Some(Commands::Seo(args)) => commands::content::seo(args, cli.config, &cancel).await,
        Some(Commands::Enhance(args)) => commands::content::enhance(args, cli.config, &cancel).await,
        Some(Commands::Image(args)) => commands::content::image(args, cli.config, &cancel).await,
        Some(Commands::Research(args)) => {
            commands::content::research(args, cli.config, &cancel).await
        }
        Some(Commands::BlogPost(args)) => {
            commands::content::blog_post(args, cli.config, &cancel).await
        }
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config).await
        }
        None => {
            // No command provided - show help
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
