// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Blog Post Pipeline
//!
//! Composes research, content generation, SEO analysis and image generation
//! into one "complete blog post" call.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Multi-stage composition with partial-failure tolerance
//!
//! Research and image are soft stages: their failure is recorded in the
//! [`StageReport`] and the field is left empty. Content and SEO are mandatory
//! and fail the whole run with a [`PipelineError`] naming the stage. SEO and
//! image both depend only on the generated content and run concurrently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use super::orchestrator::{ContentOrchestrator, OrchestratorError};
use crate::domain::content::{
    ContentGenerationRequest, ContentGenerationResponse, ContentType, ImageGenerationRequest,
    ImageGenerationResponse, ImageSize, ImageStyle, ResearchDepth, ResearchRequest,
    ResearchResponse, SeoOptimizationRequest, SeoOptimizationResponse, Tone,
    DEFAULT_TARGET_WORD_COUNT,
};
use crate::domain::llm::{Capability, ProviderId};

const MAX_KEY_PHRASES: usize = 3;
const MAX_PHRASE_WORDS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostOptions {
    #[serde(default)]
    pub content_type: ContentType,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default = "default_target_word_count")]
    pub target_word_count: u32,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_true")]
    pub include_research: bool,
    #[serde(default)]
    pub generate_image: bool,
    #[serde(default)]
    pub image_style: ImageStyle,
    #[serde(default)]
    pub image_size: ImageSize,
    #[serde(default)]
    pub preferred_provider: Option<ProviderId>,
}

fn default_target_word_count() -> u32 {
    DEFAULT_TARGET_WORD_COUNT
}

fn default_true() -> bool {
    true
}

impl Default for BlogPostOptions {
    fn default() -> Self {
        Self {
            content_type: ContentType::default(),
            tone: Tone::default(),
            target_word_count: DEFAULT_TARGET_WORD_COUNT,
            keywords: Vec::new(),
            category: None,
            include_research: true,
            generate_image: false,
            image_style: ImageStyle::default(),
            image_size: ImageSize::default(),
            preferred_provider: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    Research,
    Content,
    Seo,
    Image,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Research => "research",
            PipelineStage::Content => "content",
            PipelineStage::Seo => "seo",
            PipelineStage::Image => "image",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of an optional stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageOutcome {
    Succeeded { provider: ProviderId },
    Skipped { reason: String },
    Failed { reason: String },
}

impl StageOutcome {
    fn label(&self) -> &'static str {
        match self {
            StageOutcome::Succeeded { .. } => "succeeded",
            StageOutcome::Skipped { .. } => "skipped",
            StageOutcome::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub research: StageOutcome,
    pub image: StageOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    pub run_id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub content: ContentGenerationResponse,
    pub seo: SeoOptimizationResponse,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageGenerationResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research: Option<ResearchResponse>,
    pub stages: StageReport,
}

#[derive(Debug, thiserror::Error)]
#[error("Blog post pipeline failed at {stage} stage: {source}")]
pub struct PipelineError {
    pub stage: PipelineStage,
    #[source]
    pub source: OrchestratorError,
}

fn record_stage(stage: PipelineStage, outcome: &'static str) {
    metrics::counter!(
        "quill_pipeline_stage_total",
        "stage" => stage.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}

impl ContentOrchestrator {
    /// Research → content → (SEO ∥ image).
    pub async fn generate_complete_blog_post(
        &self,
        topic: &str,
        options: BlogPostOptions,
        cancel: &CancellationToken,
    ) -> Result<PipelineResult, PipelineError> {
        let run_id = Uuid::new_v4();
        info!(%run_id, topic, "Starting blog post pipeline");

        let mut keywords = options.keywords.clone();

        // 1. Research (soft)
        let (research, research_outcome) = if !options.include_research {
            (None, StageOutcome::Skipped {
                reason: "research not requested".to_string(),
            })
        } else {
            match self
                .resolver()
                .resolve_capable(Capability::Research, options.preferred_provider)
            {
                Err(_) => (None, StageOutcome::Skipped {
                    reason: "no research-capable provider configured".to_string(),
                }),
                Ok(provider) => {
                    let request = ResearchRequest {
                        topic: topic.to_string(),
                        depth: ResearchDepth::Standard,
                    };
                    match self.research(&request, Some(provider), cancel).await {
                        Ok(response) => {
                            let phrases = key_phrases_from_facts(&response.key_facts, &keywords);
                            info!(%run_id, added = phrases.len(), "Research enriched keywords");
                            keywords.extend(phrases);
                            (Some(response), StageOutcome::Succeeded { provider })
                        }
                        Err(OrchestratorError::Cancelled) => {
                            record_stage(PipelineStage::Research, "cancelled");
                            return Err(PipelineError {
                                stage: PipelineStage::Research,
                                source: OrchestratorError::Cancelled,
                            });
                        }
                        Err(err) => {
                            warn!(%run_id, error = %err, "Research stage failed, continuing without it");
                            (None, StageOutcome::Failed {
                                reason: err.to_string(),
                            })
                        }
                    }
                }
            }
        };
        record_stage(PipelineStage::Research, research_outcome.label());

        // 2. Content (mandatory)
        let content_request = ContentGenerationRequest {
            topic: topic.to_string(),
            content_type: options.content_type,
            tone: options.tone,
            target_word_count: options.target_word_count,
            keywords,
            category: options.category.clone(),
        };
        let content = self
            .generate_content(&content_request, options.preferred_provider, cancel)
            .await
            .map_err(|err| {
                record_stage(PipelineStage::Content, "failed");
                PipelineError {
                    stage: PipelineStage::Content,
                    source: err,
                }
            })?;
        record_stage(PipelineStage::Content, "succeeded");

        // 3. SEO (mandatory) alongside 4. Image (soft, opt-in)
        let seo_request = SeoOptimizationRequest {
            title: content.title.clone(),
            content: content.content.clone(),
            target_keywords: content_request.keywords.clone(),
        };
        let seo_stage = self.optimize_seo(&seo_request, options.preferred_provider, cancel);
        let image_stage = self.image_stage(&content, &options, cancel);

        let (seo, (image, image_outcome)) = tokio::join!(seo_stage, image_stage);
        record_stage(PipelineStage::Image, image_outcome.label());

        let seo = seo.map_err(|err| {
            record_stage(PipelineStage::Seo, "failed");
            PipelineError {
                stage: PipelineStage::Seo,
                source: err,
            }
        })?;
        record_stage(PipelineStage::Seo, "succeeded");

        info!(
            %run_id,
            provider = %content.provider,
            research = research_outcome.label(),
            image = image_outcome.label(),
            "Blog post pipeline completed"
        );

        Ok(PipelineResult {
            run_id,
            completed_at: Utc::now(),
            content,
            seo,
            image,
            research,
            stages: StageReport {
                research: research_outcome,
                image: image_outcome,
            },
        })
    }

    async fn image_stage(
        &self,
        content: &ContentGenerationResponse,
        options: &BlogPostOptions,
        cancel: &CancellationToken,
    ) -> (Option<ImageGenerationResponse>, StageOutcome) {
        if !options.generate_image {
            return (None, StageOutcome::Skipped {
                reason: "image not requested".to_string(),
            });
        }
        let provider = match self
            .resolver()
            .resolve_capable(Capability::ImageGeneration, None)
        {
            Ok(provider) => provider,
            Err(_) => {
                return (None, StageOutcome::Skipped {
                    reason: "no image-capable provider configured".to_string(),
                })
            }
        };

        let request = ImageGenerationRequest {
            prompt: format!("Featured image for an article titled \"{}\"", content.title),
            style: options.image_style,
            size: options.image_size,
        };
        match self.generate_image(&request, cancel).await {
            Ok(image) => (Some(image), StageOutcome::Succeeded { provider }),
            Err(err) => {
                warn!(error = %err, "Image stage failed, continuing without it");
                (None, StageOutcome::Failed {
                    reason: err.to_string(),
                })
            }
        }
    }
}

/// Short keyword phrases from research facts.
///
/// Takes the first three non-empty facts and cuts each at its first clause
/// boundary and to at most five words. Phrases with no alphabetic word,
/// shorter than two characters or already in `existing` (case-insensitive)
/// are dropped.
pub fn key_phrases_from_facts(facts: &[String], existing: &[String]) -> Vec<String> {
    let mut seen: Vec<String> = existing.iter().map(|k| k.trim().to_lowercase()).collect();
    let mut phrases = Vec::new();

    for fact in facts.iter().filter(|f| !f.trim().is_empty()).take(MAX_KEY_PHRASES) {
        let phrase = first_clause(fact)
            .split_whitespace()
            .take(MAX_PHRASE_WORDS)
            .collect::<Vec<_>>()
            .join(" ");
        let phrase = phrase.trim_matches(|c: char| !c.is_alphanumeric()).to_string();

        let has_word = phrase
            .split_whitespace()
            .any(|word| word.chars().any(char::is_alphabetic));
        if phrase.chars().count() < 2 || !has_word || seen.contains(&phrase.to_lowercase()) {
            continue;
        }
        seen.push(phrase.to_lowercase());
        phrases.push(phrase);
    }

    phrases
}

/// Text before the first clause boundary. A `.` only ends a clause when
/// whitespace or the end of the text follows it, and a single-letter token
/// before it (`U.S.`) is an abbreviation.
fn first_clause(fact: &str) -> &str {
    let mut chars = fact.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            ',' | ';' | ':' | '(' | '!' | '?' => return &fact[..i],
            '.' => {
                let at_break = chars.peek().is_none_or(|&(_, next)| next.is_whitespace());
                let token = fact[..i]
                    .rsplit(|c: char| c.is_whitespace() || c == '.')
                    .next()
                    .unwrap_or_default();
                let abbreviation = token.chars().count() == 1;
                if at_break && !abbreviation {
                    return &fact[..i];
                }
            }
            _ => {}
        }
    }
    fact
}
