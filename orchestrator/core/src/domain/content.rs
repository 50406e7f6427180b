// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Content
//!
//! Request/response value objects exchanged with the orchestrator.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Per-call value types; nothing here is persisted by the core

use serde::{Deserialize, Serialize};

use crate::domain::llm::ProviderId;

pub const DEFAULT_TARGET_WORD_COUNT: u32 = 1500;
pub const META_TITLE_MAX_CHARS: usize = 60;
pub const META_DESCRIPTION_MAX_CHARS: usize = 160;
pub const WORDS_PER_MINUTE: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Blog,
    Guide,
    News,
    Review,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Blog => "blog",
            ContentType::Guide => "guide",
            ContentType::News => "news",
            ContentType::Review => "review",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Informative,
    Professional,
    Casual,
    Persuasive,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Informative => "informative",
            Tone::Professional => "professional",
            Tone::Casual => "casual",
            Tone::Persuasive => "persuasive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentGenerationRequest {
    pub topic: String,
    #[serde(default)]
    pub content_type: ContentType,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default = "default_target_word_count")]
    pub target_word_count: u32,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ContentGenerationRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            content_type: ContentType::default(),
            tone: Tone::default(),
            target_word_count: DEFAULT_TARGET_WORD_COUNT,
            keywords: Vec::new(),
            category: None,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.topic.trim().is_empty() {
            return Err("topic cannot be empty".to_string());
        }
        Ok(())
    }
}

fn default_target_word_count() -> u32 {
    DEFAULT_TARGET_WORD_COUNT
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentGenerationResponse {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub meta_title: String,
    pub meta_description: String,
    pub keywords: Vec<String>,
    pub outline: Vec<String>,
    pub reading_time: u32,
    /// Adapter that produced this payload, including degraded parses and fallbacks
    pub provider: ProviderId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoOptimizationRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub target_keywords: Vec<String>,
}

impl SeoOptimizationRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.content.trim().is_empty() {
            return Err("content cannot be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoOptimizationResponse {
    pub meta_title: String,
    pub meta_description: String,
    pub suggested_keywords: Vec<String>,
    pub heading_structure: Vec<String>,
    /// 0..=100
    pub seo_score: u8,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnhancementAction {
    Rewrite,
    Expand,
    Summarize,
    Improve,
}

impl EnhancementAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnhancementAction::Rewrite => "rewrite",
            EnhancementAction::Expand => "expand",
            EnhancementAction::Summarize => "summarize",
            EnhancementAction::Improve => "improve",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentEnhancementRequest {
    pub content: String,
    pub action: EnhancementAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_length: Option<u32>,
}

impl ContentEnhancementRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.content.trim().is_empty() {
            return Err("content cannot be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentEnhancementResponse {
    pub enhanced_content: String,
    pub changes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStyle {
    #[default]
    Realistic,
    Artistic,
    Minimalist,
    Vibrant,
}

impl ImageStyle {
    /// Phrase appended to the image prompt
    pub fn prompt_phrase(&self) -> &'static str {
        match self {
            ImageStyle::Realistic => "photorealistic, high quality, detailed photography",
            ImageStyle::Artistic => "artistic, creative, stylized illustration, digital art",
            ImageStyle::Minimalist => "minimalist, clean, simple design, modern",
            ImageStyle::Vibrant => "vibrant colors, dynamic, eye-catching, colorful",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl ImageSize {
    /// (width, height) in pixels
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            ImageSize::Small => (512, 512),
            ImageSize::Medium => (1024, 1024),
            ImageSize::Large => (1536, 1024),
        }
    }

    pub fn aspect_ratio(&self) -> &'static str {
        let (w, h) = self.dimensions();
        if w > h {
            "16:9"
        } else if w == h {
            "1:1"
        } else {
            "9:16"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageGenerationRequest {
    pub prompt: String,
    #[serde(default)]
    pub style: ImageStyle,
    #[serde(default)]
    pub size: ImageSize,
}

impl ImageGenerationRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.prompt.trim().is_empty() {
            return Err("image prompt cannot be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageGenerationResponse {
    pub image_url: String,
    pub alt_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResearchDepth {
    Quick,
    #[default]
    Standard,
    Comprehensive,
}

impl ResearchDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResearchDepth::Quick => "quick",
            ResearchDepth::Standard => "standard",
            ResearchDepth::Comprehensive => "comprehensive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchRequest {
    pub topic: String,
    #[serde(default)]
    pub depth: ResearchDepth,
}

impl ResearchRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.topic.trim().is_empty() {
            return Err("topic cannot be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchSource {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub snippet: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchResponse {
    pub summary: String,
    pub key_facts: Vec<String>,
    pub sources: Vec<ResearchSource>,
    pub related_topics: Vec<String>,
}

/// Whitespace-delimited word count
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Minutes to read `text` at 200 words per minute, rounded up
pub fn reading_time(text: &str) -> u32 {
    word_count(text).div_ceil(WORDS_PER_MINUTE) as u32
}

/// Truncate to at most `max` characters, never splitting a code point
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
