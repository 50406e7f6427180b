// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// LLM Provider Registry - Adapter Construction
//
// Builds one adapter per provider that has a credential. The registry is
// immutable once handed to the orchestrator.

use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::chat::ChatOptions;
use super::gemini::{self, GeminiAdapter};
use super::openai::{self, OpenAIAdapter};
use super::perplexity::{self, PerplexityAdapter};
use crate::domain::config::{OrchestratorConfig, ProviderCredentials, ProviderSettings};
use crate::domain::llm::{AIProvider, ProviderError, ProviderId};
use crate::infrastructure::prompt_template_engine::PromptTemplateEngine;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Registry of constructed provider adapters
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderId, Arc<dyn AIProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create adapters for every provider with a credential
    pub fn from_config(
        config: &OrchestratorConfig,
        credentials: &ProviderCredentials,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        let prompts = Arc::new(PromptTemplateEngine::new());
        let options = ChatOptions {
            temperature: config.spec.temperature,
            max_tokens: config.spec.max_tokens,
            json_mode: false,
        };

        info!("Initializing AI provider registry");

        let mut registry = Self::new();
        for id in ProviderId::ALL {
            let Some(api_key) = credentials.get(id).filter(|k| !k.trim().is_empty()) else {
                info!("Provider '{}' has no credential, skipping", id);
                continue;
            };

            info!("Initializing provider: {}", id);
            let provider = Self::create_provider(
                id,
                config.spec.providers.get(id),
                api_key.to_string(),
                client.clone(),
                options,
                prompts.clone(),
            );
            registry.register(provider);
        }

        if registry.providers.is_empty() {
            warn!("No AI providers configured - every generation call will fail");
        }

        Ok(registry)
    }

    /// Create a provider instance from its settings
    fn create_provider(
        id: ProviderId,
        settings: &ProviderSettings,
        api_key: String,
        client: reqwest::Client,
        options: ChatOptions,
        prompts: Arc<PromptTemplateEngine>,
    ) -> Arc<dyn AIProvider> {
        let endpoint = |default: &str| settings.base_url.clone().unwrap_or_else(|| default.to_string());
        let model = |default: &str| settings.model.clone().unwrap_or_else(|| default.to_string());
        let image_model =
            |default: &str| settings.image_model.clone().unwrap_or_else(|| default.to_string());

        match id {
            ProviderId::Gemini => Arc::new(GeminiAdapter::new(
                client,
                endpoint(gemini::DEFAULT_ENDPOINT),
                api_key,
                model(gemini::DEFAULT_MODEL),
                image_model(gemini::DEFAULT_IMAGE_MODEL),
                options,
                prompts,
            )),
            ProviderId::OpenAI => Arc::new(OpenAIAdapter::new(
                client,
                endpoint(openai::DEFAULT_ENDPOINT),
                api_key,
                model(openai::DEFAULT_MODEL),
                image_model(openai::DEFAULT_IMAGE_MODEL),
                options,
                prompts,
            )),
            ProviderId::Perplexity => Arc::new(PerplexityAdapter::new(
                client,
                endpoint(perplexity::DEFAULT_ENDPOINT),
                api_key,
                model(perplexity::DEFAULT_MODEL),
                options,
                prompts,
            )),
        }
    }

    /// Add or replace the adapter for `provider.id()`
    pub fn register(&mut self, provider: Arc<dyn AIProvider>) {
        let id = provider.id();
        if provider.capabilities() != id.capabilities() {
            warn!(
                "Adapter for '{}' implements {:?}, capability table declares {:?}",
                id,
                provider.capabilities(),
                id.capabilities()
            );
        }
        self.providers.insert(id, provider);
    }

    pub fn get(&self, id: ProviderId) -> Option<&Arc<dyn AIProvider>> {
        self.providers.get(&id)
    }

    /// Providers with a constructed adapter
    pub fn configured(&self) -> HashSet<ProviderId> {
        self.providers.keys().copied().collect()
    }

    /// Check health of all providers concurrently
    pub async fn health_check_all(&self) -> HashMap<ProviderId, Result<(), ProviderError>> {
        let checks = self.providers.iter().map(|(id, provider)| async move {
            info!("Health checking provider: {}", id);
            (*id, provider.health_check().await)
        });

        join_all(checks).await.into_iter().collect()
    }
}
