// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Perplexity Provider Adapter
//
// Anti-Corruption Layer for Perplexity's search-grounded models. The API
// has no JSON response mode, so replies lean on the lenient normalizer.
// The only provider offering research; its citations become sources.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::chat::{ChatCompletionsClient, ChatOptions};
use super::prompt_or_invalid;
use crate::domain::content::{
    ContentGenerationRequest, ContentGenerationResponse, ResearchRequest, ResearchResponse,
    SeoOptimizationRequest, SeoOptimizationResponse,
};
use crate::domain::llm::{
    AIProvider, ContentGenerator, ProviderError, ProviderId, Researcher, SeoOptimizer,
};
use crate::infrastructure::normalize;
use crate::infrastructure::prompt_template_engine::{PromptTemplateEngine, SYSTEM_PROMPT};

pub const DEFAULT_ENDPOINT: &str = "https://api.perplexity.ai";
pub const DEFAULT_MODEL: &str = "sonar-pro";

pub struct PerplexityAdapter {
    chat: ChatCompletionsClient,
    prompts: Arc<PromptTemplateEngine>,
}

impl PerplexityAdapter {
    pub fn new(
        client: reqwest::Client,
        endpoint: String,
        api_key: String,
        model: String,
        options: ChatOptions,
        prompts: Arc<PromptTemplateEngine>,
    ) -> Self {
        let chat = ChatCompletionsClient::new(
            client,
            ProviderId::Perplexity,
            endpoint,
            api_key,
            model,
            ChatOptions {
                json_mode: false,
                ..options
            },
        );

        Self { chat, prompts }
    }
}

#[async_trait]
impl ContentGenerator for PerplexityAdapter {
    async fn generate_content(
        &self,
        request: &ContentGenerationRequest,
    ) -> Result<ContentGenerationResponse, ProviderError> {
        let prompt = prompt_or_invalid(self.prompts.content_prompt(request))?;
        let reply = self.chat.complete(SYSTEM_PROMPT, &prompt).await?;
        info!(provider = "perplexity", length = reply.text.len(), "Content response received");

        Ok(
            normalize::parse_content_response(&reply.text, request, ProviderId::Perplexity)
                .into_inner(),
        )
    }
}

#[async_trait]
impl SeoOptimizer for PerplexityAdapter {
    async fn optimize_seo(
        &self,
        request: &SeoOptimizationRequest,
    ) -> Result<SeoOptimizationResponse, ProviderError> {
        let prompt = prompt_or_invalid(self.prompts.seo_prompt(request))?;
        let reply = self.chat.complete(SYSTEM_PROMPT, &prompt).await?;

        Ok(normalize::parse_seo_response(&reply.text, request, ProviderId::Perplexity).into_inner())
    }
}

#[async_trait]
impl Researcher for PerplexityAdapter {
    async fn research(&self, request: &ResearchRequest) -> Result<ResearchResponse, ProviderError> {
        let prompt = prompt_or_invalid(self.prompts.research_prompt(request))?;
        let reply = self.chat.complete(SYSTEM_PROMPT, &prompt).await?;
        info!(
            provider = "perplexity",
            citations = reply.citations.len(),
            "Research response received"
        );

        Ok(
            normalize::parse_research_response(&reply.text, &reply.citations, ProviderId::Perplexity)
                .into_inner(),
        )
    }
}

#[async_trait]
impl AIProvider for PerplexityAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Perplexity
    }

    fn content_generator(&self) -> Option<&dyn ContentGenerator> {
        Some(self)
    }

    fn seo_optimizer(&self) -> Option<&dyn SeoOptimizer> {
        Some(self)
    }

    fn researcher(&self) -> Option<&dyn Researcher> {
        Some(self)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        self.chat.health_check().await
    }
}
