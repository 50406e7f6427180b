// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Prompt Template Engine
//!
//! Renders the prompts sent to every provider, using Handlebars for
//! placeholder substitution.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Transform typed requests into model prompts
//! - **Integration:** Request value object → template → adapter message
//!
//! Every adapter renders the same templates so that provider choice changes
//! the model, not the instructions.

use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde::Serialize;
use serde_json::json;

use crate::domain::content::{
    ContentEnhancementRequest, ContentGenerationRequest, EnhancementAction, ImageGenerationRequest,
    ResearchDepth, ResearchRequest, SeoOptimizationRequest,
};

/// Characters of article body included in an SEO analysis prompt
pub const SEO_CONTENT_PROMPT_CHARS: usize = 3000;
const DEFAULT_EXPAND_WORDS: u32 = 2000;
const DEFAULT_CATEGORY: &str = "Travel";

pub const SYSTEM_PROMPT: &str = "You are an expert SEO content writer for a Sri Lanka travel company. \
Always answer with a single valid JSON object and nothing else.";

const CONTENT_TEMPLATE: &str = r#"Write a fully SEO-optimized {{content_type}} article about: "{{topic}}"

Requirements:
- Tone: {{tone}}
- Target word count: {{target_word_count}} words
- Category: {{category}}
{{#if keywords}}- Primary keywords to include: {{keywords}}
{{/if}}
SEO rules:
1. Title includes the primary keyword (50-60 characters)
2. Meta description is action-oriented and at most 160 characters
3. Content uses Markdown ## H2 and ### H3 headings
4. Natural keyword density of 1-2%
5. Ends with an FAQ section (3-5 questions) and a call to action

Respond with JSON in exactly this shape:
{
  "title": "...",
  "content": "Full article in Markdown",
  "excerpt": "2-3 sentence summary for social sharing",
  "metaTitle": "max 60 characters",
  "metaDescription": "max 160 characters",
  "keywords": ["..."],
  "outline": ["Introduction", "..."]
}"#;

const SEO_TEMPLATE: &str = r#"Analyze this content for SEO and provide optimization suggestions.

Title: {{title}}
Target Keywords: {{target_keywords}}

Content:
{{content}}

Respond with JSON in exactly this shape:
{
  "metaTitle": "Optimized meta title (max 60 chars)",
  "metaDescription": "Optimized meta description (max 160 chars)",
  "suggestedKeywords": ["..."],
  "headingStructure": ["Suggested H2", "Suggested H3"],
  "seoScore": 0,
  "suggestions": ["..."]
}"#;

const ENHANCEMENT_TEMPLATE: &str = r#"{{instruction}}:

{{content}}

Respond with JSON in exactly this shape:
{
  "enhancedContent": "The improved content",
  "changes": ["Human-readable description of each change"]
}"#;

const RESEARCH_TEMPLATE: &str = r#"Research the following travel topic using current, reliable sources: "{{topic}}"

Depth: {{depth}} ({{depth_hint}})

Respond with JSON in exactly this shape:
{
  "summary": "...",
  "keyFacts": ["Short factual statement", "..."],
  "sources": [{"title": "...", "url": "...", "snippet": "..."}],
  "relatedTopics": ["..."]
}"#;

const IMAGE_TEMPLATE: &str = "{{prompt}}, {{style}}, professional travel photography, Sri Lanka, \
high resolution, stunning composition";

pub struct PromptTemplateEngine {
    handlebars: Handlebars<'static>,
}

impl PromptTemplateEngine {
    /// Create a new template engine
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();

        // Don't fail on missing variables
        handlebars.set_strict_mode(false);
        // Prompts are plain text; HTML escaping would mangle quotes
        handlebars.register_escape_fn(handlebars::no_escape);

        Self { handlebars }
    }

    /// Render a template with any serializable context
    pub fn render<C: Serialize>(&self, template: &str, context: &C) -> Result<String> {
        self.handlebars
            .render_template(template, context)
            .context("Failed to render prompt template")
    }

    /// Validate template syntax without rendering
    pub fn validate_template(&self, template: &str) -> Result<()> {
        handlebars::template::Template::compile(template)
            .map(|_| ())
            .context("Invalid Handlebars template syntax")
    }

    pub fn content_prompt(&self, request: &ContentGenerationRequest) -> Result<String> {
        self.render(
            CONTENT_TEMPLATE,
            &json!({
                "topic": request.topic,
                "content_type": request.content_type.as_str(),
                "tone": request.tone.as_str(),
                "target_word_count": request.target_word_count,
                "category": request.category.as_deref().unwrap_or(DEFAULT_CATEGORY),
                "keywords": request.keywords.join(", "),
            }),
        )
    }

    pub fn seo_prompt(&self, request: &SeoOptimizationRequest) -> Result<String> {
        let target_keywords = if request.target_keywords.is_empty() {
            "None specified".to_string()
        } else {
            request.target_keywords.join(", ")
        };
        let content: String = request.content.chars().take(SEO_CONTENT_PROMPT_CHARS).collect();

        self.render(
            SEO_TEMPLATE,
            &json!({
                "title": request.title,
                "target_keywords": target_keywords,
                "content": content,
            }),
        )
    }

    pub fn enhancement_prompt(&self, request: &ContentEnhancementRequest) -> Result<String> {
        let instruction = match request.action {
            EnhancementAction::Rewrite => {
                "Rewrite this content to be more engaging while keeping the same information"
                    .to_string()
            }
            EnhancementAction::Expand => format!(
                "Expand this content to approximately {} words with more detail",
                request.target_length.unwrap_or(DEFAULT_EXPAND_WORDS)
            ),
            EnhancementAction::Summarize => match request.target_length {
                Some(words) => format!(
                    "Summarize this content in about {} words while keeping the key points",
                    words
                ),
                None => "Summarize this content concisely while keeping the key points".to_string(),
            },
            EnhancementAction::Improve => {
                "Improve the clarity, flow, and readability of this content".to_string()
            }
        };

        self.render(
            ENHANCEMENT_TEMPLATE,
            &json!({ "instruction": instruction, "content": request.content }),
        )
    }

    pub fn research_prompt(&self, request: &ResearchRequest) -> Result<String> {
        let depth_hint = match request.depth {
            ResearchDepth::Quick => "3 key facts, 2 sources",
            ResearchDepth::Standard => "5-7 key facts, 3-5 sources",
            ResearchDepth::Comprehensive => "10+ key facts, 6+ sources, include recent changes",
        };

        self.render(
            RESEARCH_TEMPLATE,
            &json!({
                "topic": request.topic,
                "depth": request.depth.as_str(),
                "depth_hint": depth_hint,
            }),
        )
    }

    pub fn image_prompt(&self, request: &ImageGenerationRequest) -> Result<String> {
        self.render(
            IMAGE_TEMPLATE,
            &json!({ "prompt": request.prompt.trim(), "style": request.style.prompt_phrase() }),
        )
    }
}

impl Default for PromptTemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::content::{ImageStyle, ImageSize};

    #[test]
    fn test_builtin_templates_compile() {
        let engine = PromptTemplateEngine::new();
        for template in [
            CONTENT_TEMPLATE,
            SEO_TEMPLATE,
            ENHANCEMENT_TEMPLATE,
            RESEARCH_TEMPLATE,
            IMAGE_TEMPLATE,
        ] {
            assert!(engine.validate_template(template).is_ok());
        }
        assert!(engine.validate_template("{{topic").is_err());
    }

    #[test]
    fn test_content_prompt() {
        let engine = PromptTemplateEngine::new();
        let mut request = ContentGenerationRequest::new("Nine Arches Bridge at \"sunrise\"");
        request.keywords = vec!["ella".to_string(), "train".to_string()];

        let prompt = engine.content_prompt(&request).unwrap();
        assert!(prompt.contains("\"Nine Arches Bridge at \"sunrise\"\""));
        assert!(prompt.contains("Target word count: 1500 words"));
        assert!(prompt.contains("Category: Travel"));
        assert!(prompt.contains("Primary keywords to include: ella, train"));
    }

    #[test]
    fn test_content_prompt_without_keywords() {
        let engine = PromptTemplateEngine::new();
        let prompt = engine
            .content_prompt(&ContentGenerationRequest::new("Adam's Peak"))
            .unwrap();
        assert!(!prompt.contains("Primary keywords"));
    }

    #[test]
    fn test_seo_prompt_truncates_content() {
        let engine = PromptTemplateEngine::new();
        let request = SeoOptimizationRequest {
            title: "Tea country".to_string(),
            content: "x".repeat(5000),
            target_keywords: vec![],
        };
        let prompt = engine.seo_prompt(&request).unwrap();
        assert!(prompt.contains("Target Keywords: None specified"));
        assert!(prompt.contains(&"x".repeat(SEO_CONTENT_PROMPT_CHARS)));
        assert!(!prompt.contains(&"x".repeat(SEO_CONTENT_PROMPT_CHARS + 1)));
    }

    #[test]
    fn test_enhancement_expand_default_length() {
        let engine = PromptTemplateEngine::new();
        let request = ContentEnhancementRequest {
            content: "Short draft".to_string(),
            action: EnhancementAction::Expand,
            target_length: None,
        };
        let prompt = engine.enhancement_prompt(&request).unwrap();
        assert!(prompt.starts_with("Expand this content to approximately 2000 words"));
    }

    #[test]
    fn test_image_prompt_style() {
        let engine = PromptTemplateEngine::new();
        let request = ImageGenerationRequest {
            prompt: " Sigiriya rock at dawn ".to_string(),
            style: ImageStyle::Vibrant,
            size: ImageSize::Large,
        };
        let prompt = engine.image_prompt(&request).unwrap();
        assert!(prompt.starts_with("Sigiriya rock at dawn, vibrant colors"));
    }
}
