// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Scriptable in-memory providers shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use quill_core::application::ContentOrchestrator;
use quill_core::domain::content::{
    ContentEnhancementRequest, ContentEnhancementResponse, ContentGenerationRequest,
    ContentGenerationResponse, ImageGenerationRequest, ImageGenerationResponse, ResearchRequest,
    ResearchResponse, ResearchSource, SeoOptimizationRequest, SeoOptimizationResponse,
};
use quill_core::domain::llm::{
    AIProvider, Capability, ContentEnhancer, ContentGenerator, ImageGenerator, ProviderError,
    ProviderId, Researcher, SeoOptimizer,
};
use quill_core::infrastructure::llm::ProviderRegistry;

/// Provider whose behaviour per capability is scripted by the test
pub struct MockProvider {
    id: ProviderId,
    failing: HashSet<Capability>,
    hanging: HashSet<Capability>,
    calls: Arc<Mutex<Vec<Capability>>>,
    content_requests: Arc<Mutex<Vec<ContentGenerationRequest>>>,
    key_facts: Vec<String>,
}

/// Handle the test keeps after the provider moves into the registry
#[derive(Clone)]
pub struct MockHandle {
    calls: Arc<Mutex<Vec<Capability>>>,
    content_requests: Arc<Mutex<Vec<ContentGenerationRequest>>>,
}

impl MockHandle {
    pub fn calls(&self, capability: Capability) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c == capability)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_content_request(&self) -> Option<ContentGenerationRequest> {
        self.content_requests.lock().unwrap().last().cloned()
    }
}

impl MockProvider {
    pub fn new(id: ProviderId) -> Self {
        Self {
            id,
            failing: HashSet::new(),
            hanging: HashSet::new(),
            calls: Arc::default(),
            content_requests: Arc::default(),
            key_facts: vec![
                "Kyoto has 1600 temples, many UNESCO listed".to_string(),
                "Cherry blossoms peak in early April".to_string(),
            ],
        }
    }

    pub fn failing(mut self, capability: Capability) -> Self {
        self.failing.insert(capability);
        self
    }

    pub fn failing_everything(mut self) -> Self {
        self.failing.extend(Capability::ALL);
        self
    }

    pub fn hanging(mut self, capability: Capability) -> Self {
        self.hanging.insert(capability);
        self
    }

    pub fn handle(&self) -> MockHandle {
        MockHandle {
            calls: self.calls.clone(),
            content_requests: self.content_requests.clone(),
        }
    }

    async fn enter(&self, capability: Capability) -> Result<(), ProviderError> {
        self.calls.lock().unwrap().push(capability);
        if self.hanging.contains(&capability) {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        if self.failing.contains(&capability) {
            return Err(ProviderError::Http {
                status: 503,
                body: format!("{} unavailable", self.id),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ContentGenerator for MockProvider {
    async fn generate_content(
        &self,
        request: &ContentGenerationRequest,
    ) -> Result<ContentGenerationResponse, ProviderError> {
        self.content_requests.lock().unwrap().push(request.clone());
        self.enter(Capability::ContentGeneration).await?;
        Ok(ContentGenerationResponse {
            title: format!("{} by {}", request.topic, self.id),
            content: "Body text for the article.".to_string(),
            excerpt: "Body text".to_string(),
            meta_title: request.topic.clone(),
            meta_description: "Body text".to_string(),
            keywords: request.keywords.clone(),
            outline: vec!["Intro".to_string()],
            reading_time: 1,
            provider: self.id,
        })
    }
}

#[async_trait]
impl SeoOptimizer for MockProvider {
    async fn optimize_seo(
        &self,
        request: &SeoOptimizationRequest,
    ) -> Result<SeoOptimizationResponse, ProviderError> {
        self.enter(Capability::SeoOptimization).await?;
        Ok(SeoOptimizationResponse {
            meta_title: request.title.clone(),
            meta_description: "Optimized".to_string(),
            suggested_keywords: request.target_keywords.clone(),
            heading_structure: vec![],
            seo_score: 80,
            suggestions: vec![],
        })
    }
}

#[async_trait]
impl ContentEnhancer for MockProvider {
    async fn enhance_content(
        &self,
        request: &ContentEnhancementRequest,
    ) -> Result<ContentEnhancementResponse, ProviderError> {
        self.enter(Capability::ContentEnhancement).await?;
        Ok(ContentEnhancementResponse {
            enhanced_content: format!("{} (enhanced)", request.content),
            changes: vec!["Tightened wording".to_string()],
        })
    }
}

#[async_trait]
impl ImageGenerator for MockProvider {
    async fn generate_image(
        &self,
        request: &ImageGenerationRequest,
    ) -> Result<ImageGenerationResponse, ProviderError> {
        self.enter(Capability::ImageGeneration).await?;
        Ok(ImageGenerationResponse {
            image_url: format!("https://images.test/{}.png", self.id),
            alt_text: request.prompt.clone(),
        })
    }
}

#[async_trait]
impl Researcher for MockProvider {
    async fn research(&self, request: &ResearchRequest) -> Result<ResearchResponse, ProviderError> {
        self.enter(Capability::Research).await?;
        Ok(ResearchResponse {
            summary: format!("About {}", request.topic),
            key_facts: self.key_facts.clone(),
            sources: vec![ResearchSource {
                title: "Guide".to_string(),
                url: "https://example.org/guide".to_string(),
                snippet: String::new(),
            }],
            related_topics: vec![],
        })
    }
}

#[async_trait]
impl AIProvider for MockProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn content_generator(&self) -> Option<&dyn ContentGenerator> {
        self.id
            .supports(Capability::ContentGeneration)
            .then_some(self as &dyn ContentGenerator)
    }

    fn seo_optimizer(&self) -> Option<&dyn SeoOptimizer> {
        self.id
            .supports(Capability::SeoOptimization)
            .then_some(self as &dyn SeoOptimizer)
    }

    fn content_enhancer(&self) -> Option<&dyn ContentEnhancer> {
        self.id
            .supports(Capability::ContentEnhancement)
            .then_some(self as &dyn ContentEnhancer)
    }

    fn image_generator(&self) -> Option<&dyn ImageGenerator> {
        self.id
            .supports(Capability::ImageGeneration)
            .then_some(self as &dyn ImageGenerator)
    }

    fn researcher(&self) -> Option<&dyn Researcher> {
        self.id
            .supports(Capability::Research)
            .then_some(self as &dyn Researcher)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

pub const ORDER: [ProviderId; 3] = [ProviderId::Gemini, ProviderId::OpenAI, ProviderId::Perplexity];

/// Orchestrator over the given mocks with the default preference order
pub fn orchestrator(providers: Vec<MockProvider>, timeout: Duration) -> ContentOrchestrator {
    let mut registry = ProviderRegistry::new();
    for provider in providers {
        registry.register(Arc::new(provider));
    }
    ContentOrchestrator::new(registry, &ORDER, timeout)
}

pub const TIMEOUT: Duration = Duration::from_secs(5);
