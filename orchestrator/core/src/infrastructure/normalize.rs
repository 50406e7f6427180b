// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Response Normalization
//!
//! Turns free-form model output into typed responses.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Lenient JSON extraction shared by every provider adapter
//!
//! # Tiers
//!
//! 1. [`parse_strict`] - the whole text is a JSON object
//! 2. [`parse_fenced`] - the object is wrapped in ```json fences
//! 3. [`parse_brace_span`] - the object is embedded in surrounding prose
//! 4. heuristic degraded response built from the raw text
//!
//! A parse failure never becomes an error: the last tier always produces a
//! well-typed value.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::warn;

use crate::domain::content::{
    reading_time, truncate_chars, ContentEnhancementRequest, ContentEnhancementResponse,
    ContentGenerationRequest, ContentGenerationResponse, ResearchResponse, ResearchSource,
    SeoOptimizationRequest, SeoOptimizationResponse, META_DESCRIPTION_MAX_CHARS,
    META_TITLE_MAX_CHARS,
};
use crate::domain::llm::{Capability, ProviderId};

const EXCERPT_CHARS: usize = 200;
const DEGRADED_TITLE_SUFFIX: &str = " - Travel Guide";

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[A-Za-z]*[ \t]*\r?\n?(.*?)```").expect("static regex")
});

static FENCE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json|JSON)?\r?\n?").expect("static regex"));

/// Which tier recovered the JSON object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseTier {
    Strict,
    Fenced,
    BraceSpan,
}

/// A typed value plus the tier that produced it. `tier == None` means the
/// value was built heuristically from raw text.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T> {
    pub value: T,
    pub tier: Option<ParseTier>,
}

impl<T> Normalized<T> {
    pub fn is_degraded(&self) -> bool {
        self.tier.is_none()
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Tier 1: the trimmed text is exactly one JSON object
pub fn parse_strict(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Tier 2: strip Markdown code fences and retry
pub fn parse_fenced(text: &str) -> Option<Map<String, Value>> {
    if let Some(inner) = FENCED_BLOCK.captures(text).and_then(|c| c.get(1)) {
        if let Some(map) = parse_strict(inner.as_str()) {
            return Some(map);
        }
    }

    // Unterminated or stray fences
    let stripped = FENCE_MARKER.replace_all(text, "");
    parse_strict(&stripped)
}

/// Tier 3: first balanced `{...}` span that parses as an object
///
/// Spans are collected in one pass and tried in order of their opening
/// brace. Braces that never close produce no span.
pub fn parse_brace_span(text: &str) -> Option<Map<String, Value>> {
    let mut spans = balanced_spans(text.as_bytes());
    spans.sort_unstable_by_key(|&(start, _)| start);

    spans
        .into_iter()
        .find_map(|(start, end)| parse_strict(&text[start..=end]))
}

/// `(open, close)` byte offsets of every balanced brace pair. String
/// literals are only tracked inside a span, so quotes in prose are ignored.
fn balanced_spans(bytes: &[u8]) -> Vec<(usize, usize)> {
    let mut open: Vec<usize> = Vec::new();
    let mut spans = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match b {
            b'"' if !open.is_empty() => in_string = true,
            b'{' => open.push(i),
            b'}' => {
                if let Some(start) = open.pop() {
                    spans.push((start, i));
                }
            }
            _ => {}
        }
    }

    spans
}

/// Run tiers 1-3 in order
pub fn extract_json_object(text: &str) -> Option<(Map<String, Value>, ParseTier)> {
    if let Some(map) = parse_strict(text) {
        return Some((map, ParseTier::Strict));
    }
    if let Some(map) = parse_fenced(text) {
        return Some((map, ParseTier::Fenced));
    }
    parse_brace_span(text).map(|map| (map, ParseTier::BraceSpan))
}

fn record_degraded(capability: Capability, provider: ProviderId, raw_len: usize) {
    warn!(
        provider = %provider,
        capability = %capability,
        raw_len,
        "Provider response is not JSON, building degraded response"
    );
    metrics::counter!(
        "quill_degraded_responses_total",
        "capability" => capability.as_str(),
        "provider" => provider.as_str()
    )
    .increment(1);
}

fn text_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| map.get(*k))
        .find_map(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            _ => None,
        })
}

/// Accepts either a JSON array of strings or a comma-separated string
fn list_field(map: &Map<String, Value>, keys: &[&str]) -> Option<Vec<String>> {
    keys.iter().filter_map(|k| map.get(*k)).find_map(|v| match v {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.trim().to_string()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .filter(|s| !s.is_empty())
                .collect(),
        ),
        Value::String(s) => Some(
            s.split(',')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect(),
        ),
        _ => None,
    })
}

fn score_field(map: &Map<String, Value>, keys: &[&str]) -> Option<u8> {
    keys.iter().filter_map(|k| map.get(*k)).find_map(|v| {
        let score = match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok(),
            _ => None,
        }?;
        Some(score.round().clamp(0.0, 100.0) as u8)
    })
}

fn excerpt_of(text: &str) -> String {
    format!("{}...", truncate_chars(text.trim(), EXCERPT_CHARS))
}

/// Normalize a content-generation reply.
pub fn parse_content_response(
    text: &str,
    request: &ContentGenerationRequest,
    provider: ProviderId,
) -> Normalized<ContentGenerationResponse> {
    let Some((map, tier)) = extract_json_object(text) else {
        record_degraded(Capability::ContentGeneration, provider, text.len());
        return Normalized {
            value: degraded_content(text, request, provider),
            tier: None,
        };
    };

    let title = text_field(&map, &["title"])
        .unwrap_or_else(|| format!("{}{}", request.topic, DEGRADED_TITLE_SUFFIX));
    let content = text_field(&map, &["content", "body"]).unwrap_or_default();
    let excerpt = text_field(&map, &["excerpt", "summary"]).unwrap_or_default();
    let meta_title = text_field(&map, &["metaTitle", "meta_title"]).unwrap_or_else(|| title.clone());
    let meta_description = text_field(&map, &["metaDescription", "meta_description"])
        .unwrap_or_else(|| excerpt.clone());

    Normalized {
        value: ContentGenerationResponse {
            meta_title: truncate_chars(&meta_title, META_TITLE_MAX_CHARS),
            meta_description: truncate_chars(&meta_description, META_DESCRIPTION_MAX_CHARS),
            keywords: list_field(&map, &["keywords"]).unwrap_or_default(),
            outline: list_field(&map, &["outline"]).unwrap_or_default(),
            reading_time: reading_time(&content),
            title,
            content,
            excerpt,
            provider,
        },
        tier: Some(tier),
    }
}

/// Heuristic content response built from raw, non-JSON output
pub fn degraded_content(
    text: &str,
    request: &ContentGenerationRequest,
    provider: ProviderId,
) -> ContentGenerationResponse {
    ContentGenerationResponse {
        title: format!("{}{}", request.topic, DEGRADED_TITLE_SUFFIX),
        content: text.to_string(),
        excerpt: excerpt_of(text),
        meta_title: truncate_chars(&request.topic, META_TITLE_MAX_CHARS),
        meta_description: truncate_chars(text.trim(), META_DESCRIPTION_MAX_CHARS),
        keywords: request.keywords.clone(),
        outline: Vec::new(),
        reading_time: reading_time(text),
        provider,
    }
}

/// Normalize an SEO analysis reply.
pub fn parse_seo_response(
    text: &str,
    request: &SeoOptimizationRequest,
    provider: ProviderId,
) -> Normalized<SeoOptimizationResponse> {
    let fallback_title = || truncate_chars(&request.title, META_TITLE_MAX_CHARS);
    let fallback_description = || truncate_chars(request.content.trim(), META_DESCRIPTION_MAX_CHARS);

    let Some((map, tier)) = extract_json_object(text) else {
        record_degraded(Capability::SeoOptimization, provider, text.len());
        return Normalized {
            value: SeoOptimizationResponse {
                meta_title: fallback_title(),
                meta_description: fallback_description(),
                suggested_keywords: request.target_keywords.clone(),
                heading_structure: Vec::new(),
                seo_score: 0,
                suggestions: vec![
                    "SEO analysis could not be parsed from the provider response".to_string(),
                ],
            },
            tier: None,
        };
    };

    let value = SeoOptimizationResponse {
        meta_title: text_field(&map, &["metaTitle", "meta_title"])
            .map(|t| truncate_chars(&t, META_TITLE_MAX_CHARS))
            .unwrap_or_else(fallback_title),
        meta_description: text_field(&map, &["metaDescription", "meta_description"])
            .map(|d| truncate_chars(&d, META_DESCRIPTION_MAX_CHARS))
            .unwrap_or_else(fallback_description),
        suggested_keywords: list_field(&map, &["suggestedKeywords", "suggested_keywords", "keywords"])
            .unwrap_or_else(|| request.target_keywords.clone()),
        heading_structure: list_field(&map, &["headingStructure", "heading_structure"])
            .unwrap_or_default(),
        seo_score: score_field(&map, &["seoScore", "seo_score", "score"]).unwrap_or(0),
        suggestions: list_field(&map, &["suggestions"]).unwrap_or_default(),
    };

    Normalized { value, tier: Some(tier) }
}

/// Normalize a content-enhancement reply.
pub fn parse_enhancement_response(
    text: &str,
    _request: &ContentEnhancementRequest,
    provider: ProviderId,
) -> Normalized<ContentEnhancementResponse> {
    match extract_json_object(text) {
        Some((map, tier)) => Normalized {
            value: ContentEnhancementResponse {
                enhanced_content: text_field(&map, &["enhancedContent", "enhanced_content", "content"])
                    .unwrap_or_else(|| text.to_string()),
                changes: list_field(&map, &["changes"]).unwrap_or_default(),
            },
            tier: Some(tier),
        },
        None => {
            record_degraded(Capability::ContentEnhancement, provider, text.len());
            Normalized {
                value: ContentEnhancementResponse {
                    enhanced_content: text.trim().to_string(),
                    changes: Vec::new(),
                },
                tier: None,
            }
        }
    }
}

/// Normalize a research reply. `citations` are URLs some providers return
/// alongside the message; they back-fill `sources`.
pub fn parse_research_response(
    text: &str,
    citations: &[String],
    provider: ProviderId,
) -> Normalized<ResearchResponse> {
    let citation_sources = || -> Vec<ResearchSource> {
        citations
            .iter()
            .map(|url| ResearchSource {
                title: url.clone(),
                url: url.clone(),
                snippet: String::new(),
            })
            .collect()
    };

    let Some((map, tier)) = extract_json_object(text) else {
        record_degraded(Capability::Research, provider, text.len());
        return Normalized {
            value: ResearchResponse {
                summary: text.trim().to_string(),
                key_facts: Vec::new(),
                sources: citation_sources(),
                related_topics: Vec::new(),
            },
            tier: None,
        };
    };

    let mut sources: Vec<ResearchSource> = map
        .get("sources")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(source_from_value).collect())
        .unwrap_or_default();
    if sources.is_empty() {
        sources = citation_sources();
    }

    Normalized {
        value: ResearchResponse {
            summary: text_field(&map, &["summary"]).unwrap_or_default(),
            key_facts: list_field(&map, &["keyFacts", "key_facts", "facts"]).unwrap_or_default(),
            sources,
            related_topics: list_field(&map, &["relatedTopics", "related_topics"])
                .unwrap_or_default(),
        },
        tier: Some(tier),
    }
}

fn source_from_value(value: &Value) -> Option<ResearchSource> {
    match value {
        Value::String(url) => Some(ResearchSource {
            title: url.clone(),
            url: url.clone(),
            snippet: String::new(),
        }),
        Value::Object(map) => {
            let url = text_field(map, &["url", "link"])?;
            Some(ResearchSource {
                title: text_field(map, &["title", "name"]).unwrap_or_else(|| url.clone()),
                snippet: text_field(map, &["snippet", "description"]).unwrap_or_default(),
                url,
            })
        }
        _ => None,
    }
}
