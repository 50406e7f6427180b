// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Content operations
//!
//! Commands: generate, seo, enhance, image, research, blog-post

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use quill_core::application::pipeline::BlogPostOptions;
use quill_core::domain::content::{
    ContentEnhancementRequest, ContentGenerationRequest, ContentType, EnhancementAction,
    ImageGenerationRequest, ImageSize, ImageStyle, ResearchDepth, ResearchRequest,
    SeoOptimizationRequest, Tone, DEFAULT_TARGET_WORD_COUNT,
};
use quill_core::domain::llm::ProviderId;

use super::{build_orchestrator, print_json};

/// Parse a lowercase enum value through its serde representation
fn parse_variant<T: DeserializeOwned>(value: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(value.to_lowercase()))
        .map_err(|_| format!("unsupported value '{}'", value))
}

/// Read `@path` arguments from a file, pass anything else through
fn read_text(value: &str) -> Result<String> {
    match value.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(PathBuf::from(path))
            .with_context(|| format!("Failed to read content from {}", path)),
        None => Ok(value.to_string()),
    }
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Article topic
    #[arg(short, long)]
    pub topic: String,

    /// blog, guide, news or review
    #[arg(long, default_value = "blog", value_parser = parse_variant::<ContentType>)]
    pub content_type: ContentType,

    /// informative, professional, casual or persuasive
    #[arg(long, default_value = "informative", value_parser = parse_variant::<Tone>)]
    pub tone: Tone,

    /// Target length in words
    #[arg(long, default_value_t = DEFAULT_TARGET_WORD_COUNT)]
    pub words: u32,

    /// Keyword to weave in (repeatable)
    #[arg(short, long = "keyword")]
    pub keywords: Vec<String>,

    #[arg(long)]
    pub category: Option<String>,

    /// Preferred provider (gemini, openai, perplexity)
    #[arg(short, long)]
    pub provider: Option<ProviderId>,
}

#[derive(Args, Debug)]
pub struct SeoArgs {
    #[arg(long)]
    pub title: String,

    /// Content to analyze, or @FILE
    #[arg(long)]
    pub content: String,

    /// Target keyword (repeatable)
    #[arg(short, long = "keyword")]
    pub keywords: Vec<String>,

    #[arg(short, long)]
    pub provider: Option<ProviderId>,
}

#[derive(Args, Debug)]
pub struct EnhanceArgs {
    /// Content to enhance, or @FILE
    #[arg(long)]
    pub content: String,

    /// rewrite, expand, summarize or improve
    #[arg(long, default_value = "improve", value_parser = parse_variant::<EnhancementAction>)]
    pub action: EnhancementAction,

    /// Target length in words (expand only)
    #[arg(long)]
    pub target_length: Option<u32>,

    #[arg(short, long)]
    pub provider: Option<ProviderId>,
}

#[derive(Args, Debug)]
pub struct ImageArgs {
    /// Image description
    #[arg(long)]
    pub prompt: String,

    /// realistic, artistic, minimalist or vibrant
    #[arg(long, default_value = "realistic", value_parser = parse_variant::<ImageStyle>)]
    pub style: ImageStyle,

    /// small, medium or large
    #[arg(long, default_value = "medium", value_parser = parse_variant::<ImageSize>)]
    pub size: ImageSize,
}

#[derive(Args, Debug)]
pub struct ResearchArgs {
    #[arg(short, long)]
    pub topic: String,

    /// quick, standard or comprehensive
    #[arg(long, default_value = "standard", value_parser = parse_variant::<ResearchDepth>)]
    pub depth: ResearchDepth,

    #[arg(short, long)]
    pub provider: Option<ProviderId>,
}

#[derive(Args, Debug)]
pub struct BlogPostArgs {
    #[command(flatten)]
    pub content: GenerateArgs,

    /// Skip the research stage
    #[arg(long)]
    pub no_research: bool,

    /// Also generate a featured image
    #[arg(long)]
    pub image: bool,

    #[arg(long, default_value = "realistic", value_parser = parse_variant::<ImageStyle>)]
    pub image_style: ImageStyle,

    #[arg(long, default_value = "large", value_parser = parse_variant::<ImageSize>)]
    pub image_size: ImageSize,
}

impl From<BlogPostArgs> for BlogPostOptions {
    fn from(args: BlogPostArgs) -> Self {
        BlogPostOptions {
            content_type: args.content.content_type,
            tone: args.content.tone,
            target_word_count: args.content.words,
            keywords: args.content.keywords,
            category: args.content.category,
            include_research: !args.no_research,
            generate_image: args.image,
            image_style: args.image_style,
            image_size: args.image_size,
            preferred_provider: args.content.provider,
        }
    }
}

pub async fn generate(
    args: GenerateArgs,
    config_override: Option<PathBuf>,
    cancel: &CancellationToken,
) -> Result<()> {
    let orchestrator = build_orchestrator(config_override)?;
    let request = ContentGenerationRequest {
        topic: args.topic,
        content_type: args.content_type,
        tone: args.tone,
        target_word_count: args.words,
        keywords: args.keywords,
        category: args.category,
    };

    eprintln!("Generating content: {}", request.topic.bold());
    let response = orchestrator
        .generate_content(&request, args.provider, cancel)
        .await
        .context("Content generation failed")?;

    eprintln!(
        "{}",
        format!("✓ Generated by {} ({} min read)", response.provider, response.reading_time)
            .green()
    );
    print_json(&response)
}

pub async fn seo(
    args: SeoArgs,
    config_override: Option<PathBuf>,
    cancel: &CancellationToken,
) -> Result<()> {
    let orchestrator = build_orchestrator(config_override)?;
    let request = SeoOptimizationRequest {
        title: args.title,
        content: read_text(&args.content)?,
        target_keywords: args.keywords,
    };

    let response = orchestrator
        .optimize_seo(&request, args.provider, cancel)
        .await
        .context("SEO analysis failed")?;

    eprintln!("{}", format!("✓ SEO score: {}", response.seo_score).green());
    print_json(&response)
}

pub async fn enhance(
    args: EnhanceArgs,
    config_override: Option<PathBuf>,
    cancel: &CancellationToken,
) -> Result<()> {
    let orchestrator = build_orchestrator(config_override)?;
    let request = ContentEnhancementRequest {
        content: read_text(&args.content)?,
        action: args.action,
        target_length: args.target_length,
    };

    let response = orchestrator
        .enhance_content(&request, args.provider, cancel)
        .await
        .context("Content enhancement failed")?;

    eprintln!(
        "{}",
        format!("✓ Content enhanced ({} changes)", response.changes.len()).green()
    );
    print_json(&response)
}

pub async fn image(
    args: ImageArgs,
    config_override: Option<PathBuf>,
    cancel: &CancellationToken,
) -> Result<()> {
    let orchestrator = build_orchestrator(config_override)?;
    let request = ImageGenerationRequest {
        prompt: args.prompt,
        style: args.style,
        size: args.size,
    };

    let response = orchestrator
        .generate_image(&request, cancel)
        .await
        .context("Image generation failed")?;

    eprintln!("{}", "✓ Image generated".green());
    print_json(&response)
}

pub async fn research(
    args: ResearchArgs,
    config_override: Option<PathBuf>,
    cancel: &CancellationToken,
) -> Result<()> {
    let orchestrator = build_orchestrator(config_override)?;
    let request = ResearchRequest {
        topic: args.topic,
        depth: args.depth,
    };

    let response = orchestrator
        .research(&request, args.provider, cancel)
        .await
        .context("Research failed")?;

    eprintln!(
        "{}",
        format!(
            "✓ {} key facts, {} sources",
            response.key_facts.len(),
            response.sources.len()
        )
        .green()
    );
    print_json(&response)
}

pub async fn blog_post(
    args: BlogPostArgs,
    config_override: Option<PathBuf>,
    cancel: &CancellationToken,
) -> Result<()> {
    let orchestrator = build_orchestrator(config_override)?;
    let topic = args.content.topic.clone();
    let options = BlogPostOptions::from(args);

    eprintln!("Generating blog post: {}", topic.bold());
    let result = orchestrator
        .generate_complete_blog_post(&topic, options, cancel)
        .await
        .context("Blog post generation failed")?;

    eprintln!(
        "{}",
        format!("✓ Blog post generated by {}", result.content.provider).green()
    );
    eprintln!("  Research: {:?}", result.stages.research);
    eprintln!("  Image: {:?}", result.stages.image);
    print_json(&result)
}
