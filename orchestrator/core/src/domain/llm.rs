// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Llm
//!
//! Capability contract for content-generation providers.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Anti-corruption boundary between the orchestrator and vendor APIs

// Each capability is its own trait. A provider opts into a capability by
// returning `Some(self)` from the matching accessor on `AIProvider`; the
// declared capability set is derived from those accessors, so a provider
// cannot advertise an operation it does not implement.
//
// Implementations live in infrastructure/llm/.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::content::{
    ContentEnhancementRequest, ContentEnhancementResponse, ContentGenerationRequest,
    ContentGenerationResponse, ImageGenerationRequest, ImageGenerationResponse, ResearchRequest,
    ResearchResponse, SeoOptimizationRequest, SeoOptimizationResponse,
};

/// Closed set of providers the orchestrator knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Gemini,
    OpenAI,
    Perplexity,
}

impl ProviderId {
    pub const ALL: [ProviderId; 3] = [ProviderId::Gemini, ProviderId::OpenAI, ProviderId::Perplexity];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Gemini => "gemini",
            ProviderId::OpenAI => "openai",
            ProviderId::Perplexity => "perplexity",
        }
    }

    /// Static capability table. Adapters must match it exactly.
    pub fn capabilities(&self) -> CapabilitySet {
        use Capability::*;
        match self {
            ProviderId::Gemini => CapabilitySet::from_iter([
                ContentGeneration,
                SeoOptimization,
                ContentEnhancement,
                ImageGeneration,
            ]),
            ProviderId::OpenAI => CapabilitySet::from_iter([
                ContentGeneration,
                SeoOptimization,
                ContentEnhancement,
                ImageGeneration,
            ]),
            ProviderId::Perplexity => {
                CapabilitySet::from_iter([ContentGeneration, SeoOptimization, Research])
            }
        }
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities().contains(capability)
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(ProviderId::Gemini),
            "openai" => Ok(ProviderId::OpenAI),
            "perplexity" => Ok(ProviderId::Perplexity),
            other => Err(format!("unknown provider '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ContentGeneration,
    SeoOptimization,
    ContentEnhancement,
    ImageGeneration,
    Research,
}

impl Capability {
    pub const ALL: [Capability; 5] = [
        Capability::ContentGeneration,
        Capability::SeoOptimization,
        Capability::ContentEnhancement,
        Capability::ImageGeneration,
        Capability::Research,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ContentGeneration => "content_generation",
            Capability::SeoOptimization => "seo_optimization",
            Capability::ContentEnhancement => "content_enhancement",
            Capability::ImageGeneration => "image_generation",
            Capability::Research => "research",
        }
    }

    fn bit(&self) -> u8 {
        match self {
            Capability::ContentGeneration => 1,
            Capability::SeoOptimization => 1 << 1,
            Capability::ContentEnhancement => 1 << 2,
            Capability::ImageGeneration => 1 << 3,
            Capability::Research => 1 << 4,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Small copyable set of capabilities.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CapabilitySet(u8);

impl CapabilitySet {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, capability: Capability) {
        self.0 |= capability.bit();
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL.into_iter().filter(|c| self.contains(*c))
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let mut set = CapabilitySet::empty();
        for capability in iter {
            set.insert(capability);
        }
        set
    }
}

impl fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Serialize for CapabilitySet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate_content(
        &self,
        request: &ContentGenerationRequest,
    ) -> Result<ContentGenerationResponse, ProviderError>;
}

#[async_trait]
pub trait SeoOptimizer: Send + Sync {
    async fn optimize_seo(
        &self,
        request: &SeoOptimizationRequest,
    ) -> Result<SeoOptimizationResponse, ProviderError>;
}

#[async_trait]
pub trait ContentEnhancer: Send + Sync {
    async fn enhance_content(
        &self,
        request: &ContentEnhancementRequest,
    ) -> Result<ContentEnhancementResponse, ProviderError>;
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_image(
        &self,
        request: &ImageGenerationRequest,
    ) -> Result<ImageGenerationResponse, ProviderError>;
}

#[async_trait]
pub trait Researcher: Send + Sync {
    async fn research(&self, request: &ResearchRequest) -> Result<ResearchResponse, ProviderError>;
}

/// Domain interface for a provider adapter.
///
/// Capability accessors default to `None`; adapters override exactly the
/// ones they implement.
#[async_trait]
pub trait AIProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    fn content_generator(&self) -> Option<&dyn ContentGenerator> {
        None
    }

    fn seo_optimizer(&self) -> Option<&dyn SeoOptimizer> {
        None
    }

    fn content_enhancer(&self) -> Option<&dyn ContentEnhancer> {
        None
    }

    fn image_generator(&self) -> Option<&dyn ImageGenerator> {
        None
    }

    fn researcher(&self) -> Option<&dyn Researcher> {
        None
    }

    /// Capabilities this adapter actually implements.
    fn capabilities(&self) -> CapabilitySet {
        let mut set = CapabilitySet::empty();
        if self.content_generator().is_some() {
            set.insert(Capability::ContentGeneration);
        }
        if self.seo_optimizer().is_some() {
            set.insert(Capability::SeoOptimization);
        }
        if self.content_enhancer().is_some() {
            set.insert(Capability::ContentEnhancement);
        }
        if self.image_generator().is_some() {
            set.insert(Capability::ImageGeneration);
        }
        if self.researcher().is_some() {
            set.insert(Capability::Research);
        }
        set
    }

    /// Check if provider is healthy and the credential is accepted
    async fn health_check(&self) -> Result<(), ProviderError>;
}

/// Errors raised by a provider adapter while talking to its API
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Content was blocked by safety filters: {0}")]
    ContentBlocked(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Malformed provider envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ProviderError {
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => ProviderError::Authentication(body),
            429 => ProviderError::RateLimit,
            _ => ProviderError::Http { status, body },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_id_parsing() {
        assert_eq!("Gemini".parse::<ProviderId>().unwrap(), ProviderId::Gemini);
        assert_eq!(" openai ".parse::<ProviderId>().unwrap(), ProviderId::OpenAI);
        assert!("claude".parse::<ProviderId>().is_err());
    }

    #[test]
    fn test_static_capability_table() {
        assert!(ProviderId::Perplexity.supports(Capability::Research));
        assert!(!ProviderId::Perplexity.supports(Capability::ImageGeneration));
        assert!(!ProviderId::Perplexity.supports(Capability::ContentEnhancement));
        assert!(ProviderId::OpenAI.supports(Capability::ImageGeneration));
        assert!(!ProviderId::Gemini.supports(Capability::Research));

        for id in ProviderId::ALL {
            assert!(id.supports(Capability::ContentGeneration));
        }
    }

    #[test]
    fn test_capability_set_iteration_order() {
        let set = CapabilitySet::from_iter([Capability::Research, Capability::ContentGeneration]);
        let listed: Vec<_> = set.iter().collect();
        assert_eq!(listed, vec![Capability::ContentGeneration, Capability::Research]);
        assert_eq!(
            serde_json::to_string(&set).unwrap(),
            r#"["content_generation","research"]"#
        );
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            ProviderError::from_status(401, "nope".into()),
            ProviderError::Authentication(_)
        ));
        assert!(matches!(ProviderError::from_status(429, String::new()), ProviderError::RateLimit));
        assert!(matches!(
            ProviderError::from_status(502, "bad gateway".into()),
            ProviderError::Http { status: 502, .. }
        ));
    }
}
