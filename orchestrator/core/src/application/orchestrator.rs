// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Content Orchestrator
//!
//! Single entry point used by the CMS to reach any provider.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Resolve a provider per call, dispatch by capability, apply
//!   one-level fallback for content generation
//!
//! # Call lifecycle
//!
//! `Idle → Requesting(P) → Success(P) | Failed(P)`. Only content generation
//! continues from `Failed(P)` to `Requesting(F)` for one fallback provider
//! `F`; `Failed(F)` is terminal. Every provider call is bounded by the
//! configured timeout and aborted when the caller's cancellation token fires.
//! No call is retried.

use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::availability::{AvailabilityResolver, ResolutionError};
use crate::domain::config::OrchestratorConfig;
use crate::domain::content::{
    ContentEnhancementRequest, ContentEnhancementResponse, ContentGenerationRequest,
    ContentGenerationResponse, ImageGenerationRequest, ImageGenerationResponse, ResearchRequest,
    ResearchResponse, SeoOptimizationRequest, SeoOptimizationResponse,
};
use crate::domain::llm::{AIProvider, Capability, CapabilitySet, ProviderError, ProviderId};
use crate::infrastructure::llm::ProviderRegistry;

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("No AI provider is configured; set at least one provider API key")]
    NoProviderConfigured,

    #[error("Provider '{provider}' does not support {capability}")]
    CapabilityUnsupported {
        provider: ProviderId,
        capability: Capability,
    },

    #[error("{provider} request failed: {source}")]
    ProviderRequest {
        provider: ProviderId,
        #[source]
        source: ProviderError,
    },

    #[error("{provider} did not complete {capability} within {after:?}")]
    Timeout {
        provider: ProviderId,
        capability: Capability,
        after: Duration,
    },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl OrchestratorError {
    /// Upstream failures that justify trying the fallback provider
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            OrchestratorError::ProviderRequest { .. } | OrchestratorError::Timeout { .. }
        )
    }

    /// Provider the error is attributed to, if any
    pub fn provider(&self) -> Option<ProviderId> {
        match self {
            OrchestratorError::CapabilityUnsupported { provider, .. }
            | OrchestratorError::ProviderRequest { provider, .. }
            | OrchestratorError::Timeout { provider, .. } => Some(*provider),
            _ => None,
        }
    }
}

impl From<ResolutionError> for OrchestratorError {
    fn from(err: ResolutionError) -> Self {
        match err {
            ResolutionError::NoProviderConfigured => OrchestratorError::NoProviderConfigured,
            ResolutionError::CapabilityUnsupported {
                provider,
                capability,
            } => OrchestratorError::CapabilityUnsupported {
                provider,
                capability,
            },
        }
    }
}

/// Availability and capabilities of one known provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderStatus {
    pub provider: ProviderId,
    pub available: bool,
    pub capabilities: CapabilitySet,
}

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Explicitly constructed orchestrator. Holds no mutable state; the default
/// provider is fixed at construction.
pub struct ContentOrchestrator {
    registry: ProviderRegistry,
    resolver: AvailabilityResolver,
    default_provider: Option<ProviderId>,
    request_timeout: Duration,
}

impl ContentOrchestrator {
    pub fn new(
        registry: ProviderRegistry,
        preference_order: &[ProviderId],
        request_timeout: Duration,
    ) -> Self {
        let resolver = AvailabilityResolver::new(preference_order, &registry.configured());
        let default_provider = resolver.default_provider();

        match default_provider {
            Some(provider) => info!(
                "Content orchestrator ready: default provider {}, available {:?}",
                provider,
                resolver.available()
            ),
            None => warn!("Content orchestrator has no configured providers"),
        }

        Self {
            registry,
            resolver,
            default_provider,
            request_timeout,
        }
    }

    /// Resolve credentials once and build every configured adapter
    pub fn from_config(config: &OrchestratorConfig) -> anyhow::Result<Self> {
        let credentials = config.credentials();
        let registry = ProviderRegistry::from_config(config, &credentials)?;
        Ok(Self::new(
            registry,
            &config.spec.preference_order,
            config.spec.request_timeout,
        ))
    }

    /// Available providers in preference order
    pub fn available_providers(&self) -> Vec<ProviderId> {
        self.resolver.available().to_vec()
    }

    pub fn default_provider(&self) -> Option<ProviderId> {
        self.default_provider
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub(crate) fn resolver(&self) -> &AvailabilityResolver {
        &self.resolver
    }

    /// Every known provider with its availability and static capabilities
    pub fn provider_statuses(&self) -> Vec<ProviderStatus> {
        ProviderId::ALL
            .into_iter()
            .map(|provider| ProviderStatus {
                provider,
                available: self.resolver.is_available(provider),
                capabilities: provider.capabilities(),
            })
            .collect()
    }

    pub async fn health_check_all(&self) -> HashMap<ProviderId, Result<(), ProviderError>> {
        self.registry.health_check_all().await
    }

    /// Generate an article, falling back once to the next available
    /// provider when the first one fails upstream.
    pub async fn generate_content(
        &self,
        request: &ContentGenerationRequest,
        preferred: Option<ProviderId>,
        cancel: &CancellationToken,
    ) -> Result<ContentGenerationResponse, OrchestratorError> {
        request.validate().map_err(OrchestratorError::InvalidRequest)?;

        let primary = self.resolver.resolve(preferred)?;
        info!(provider = %primary, topic = %request.topic, "Generating content");

        let err = match self.content_from(primary, request, cancel).await {
            Ok(response) => return Ok(response),
            Err(err) if err.is_transient() => err,
            Err(err) => return Err(err),
        };

        let Some(fallback) = self
            .resolver
            .fallback_for(primary, Capability::ContentGeneration)
        else {
            warn!(provider = %primary, error = %err, "Content generation failed, no fallback available");
            return Err(err);
        };

        warn!(
            provider = %primary,
            fallback = %fallback,
            error = %err,
            "Content generation failed, trying fallback provider"
        );
        metrics::counter!(
            "quill_provider_fallbacks_total",
            "from" => primary.as_str(),
            "to" => fallback.as_str()
        )
        .increment(1);

        self.content_from(fallback, request, cancel).await
    }

    async fn content_from(
        &self,
        provider: ProviderId,
        request: &ContentGenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<ContentGenerationResponse, OrchestratorError> {
        let capability = Capability::ContentGeneration;
        let generator = self
            .adapter(provider, capability)?
            .content_generator()
            .ok_or(OrchestratorError::CapabilityUnsupported {
                provider,
                capability,
            })?;

        let mut response = self
            .bounded(provider, capability, cancel, generator.generate_content(request))
            .await?;
        // The payload is attributed to whoever actually produced it
        response.provider = provider;
        Ok(response)
    }

    /// Analyze content for SEO. No fallback.
    pub async fn optimize_seo(
        &self,
        request: &SeoOptimizationRequest,
        preferred: Option<ProviderId>,
        cancel: &CancellationToken,
    ) -> Result<SeoOptimizationResponse, OrchestratorError> {
        request.validate().map_err(OrchestratorError::InvalidRequest)?;

        let capability = Capability::SeoOptimization;
        let provider = self.resolver.resolve(preferred)?;
        let optimizer = self
            .adapter(provider, capability)?
            .seo_optimizer()
            .ok_or(OrchestratorError::CapabilityUnsupported {
                provider,
                capability,
            })?;

        info!(provider = %provider, "Optimizing SEO");
        self.bounded(provider, capability, cancel, optimizer.optimize_seo(request))
            .await
    }

    /// Rewrite, expand, summarize or improve existing content. No fallback.
    pub async fn enhance_content(
        &self,
        request: &ContentEnhancementRequest,
        preferred: Option<ProviderId>,
        cancel: &CancellationToken,
    ) -> Result<ContentEnhancementResponse, OrchestratorError> {
        request.validate().map_err(OrchestratorError::InvalidRequest)?;

        let capability = Capability::ContentEnhancement;
        let provider = self.resolver.resolve(preferred)?;
        let enhancer = self
            .adapter(provider, capability)?
            .content_enhancer()
            .ok_or(OrchestratorError::CapabilityUnsupported {
                provider,
                capability,
            })?;

        info!(provider = %provider, action = request.action.as_str(), "Enhancing content");
        self.bounded(provider, capability, cancel, enhancer.enhance_content(request))
            .await
    }

    /// Generate an image with the first image-capable provider
    pub async fn generate_image(
        &self,
        request: &ImageGenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<ImageGenerationResponse, OrchestratorError> {
        request.validate().map_err(OrchestratorError::InvalidRequest)?;

        let capability = Capability::ImageGeneration;
        let provider = self.resolver.resolve_capable(capability, None)?;
        let generator = self
            .adapter(provider, capability)?
            .image_generator()
            .ok_or(OrchestratorError::CapabilityUnsupported {
                provider,
                capability,
            })?;

        info!(provider = %provider, "Generating image");
        self.bounded(provider, capability, cancel, generator.generate_image(request))
            .await
    }

    /// Research a topic with a research-capable provider
    pub async fn research(
        &self,
        request: &ResearchRequest,
        preferred: Option<ProviderId>,
        cancel: &CancellationToken,
    ) -> Result<ResearchResponse, OrchestratorError> {
        request.validate().map_err(OrchestratorError::InvalidRequest)?;

        let capability = Capability::Research;
        let provider = self.resolver.resolve_capable(capability, preferred)?;
        let researcher = self
            .adapter(provider, capability)?
            .researcher()
            .ok_or(OrchestratorError::CapabilityUnsupported {
                provider,
                capability,
            })?;

        info!(provider = %provider, depth = request.depth.as_str(), "Researching topic");
        self.bounded(provider, capability, cancel, researcher.research(request))
            .await
    }

    /// Adapter for `provider`, refusing capabilities its static table lacks
    fn adapter(
        &self,
        provider: ProviderId,
        capability: Capability,
    ) -> Result<&dyn AIProvider, OrchestratorError> {
        if !provider.supports(capability) {
            return Err(OrchestratorError::CapabilityUnsupported {
                provider,
                capability,
            });
        }
        self.registry
            .get(provider)
            .map(|adapter| adapter.as_ref())
            .ok_or(OrchestratorError::NoProviderConfigured)
    }

    /// Run one provider call under the timeout and cancellation token
    async fn bounded<T, F>(
        &self,
        provider: ProviderId,
        capability: Capability,
        cancel: &CancellationToken,
        call: F,
    ) -> Result<T, OrchestratorError>
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        if cancel.is_cancelled() {
            return Err(OrchestratorError::Cancelled);
        }

        debug!(provider = %provider, capability = %capability, "Requesting");
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(OrchestratorError::Cancelled),
            outcome = tokio::time::timeout(self.request_timeout, call) => match outcome {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(source)) => Err(OrchestratorError::ProviderRequest { provider, source }),
                Err(_) => Err(OrchestratorError::Timeout {
                    provider,
                    capability,
                    after: self.request_timeout,
                }),
            },
        };

        let outcome = match &result {
            Ok(_) => "success",
            Err(OrchestratorError::Timeout { .. }) => "timeout",
            Err(OrchestratorError::Cancelled) => "cancelled",
            Err(_) => "error",
        };
        metrics::counter!(
            "quill_provider_requests_total",
            "provider" => provider.as_str(),
            "capability" => capability.as_str(),
            "outcome" => outcome
        )
        .increment(1);

        if let Err(err) = &result {
            warn!(provider = %provider, capability = %capability, error = %err, "Provider call failed");
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_error_conversion() {
        let err: OrchestratorError = ResolutionError::NoProviderConfigured.into();
        assert!(matches!(err, OrchestratorError::NoProviderConfigured));

        let err: OrchestratorError = ResolutionError::CapabilityUnsupported {
            provider: ProviderId::Perplexity,
            capability: Capability::ImageGeneration,
        }
        .into();
        assert_eq!(err.provider(), Some(ProviderId::Perplexity));
        assert_eq!(
            err.to_string(),
            "Provider 'perplexity' does not support image_generation"
        );
    }

    #[test]
    fn test_transient_classification() {
        let upstream = OrchestratorError::ProviderRequest {
            provider: ProviderId::OpenAI,
            source: ProviderError::RateLimit,
        };
        assert!(upstream.is_transient());
        assert!(!OrchestratorError::Cancelled.is_transient());
        assert!(!OrchestratorError::NoProviderConfigured.is_transient());
    }

    #[test]
    fn test_statuses_for_empty_registry() {
        let orchestrator = ContentOrchestrator::new(
            ProviderRegistry::new(),
            &ProviderId::ALL,
            DEFAULT_REQUEST_TIMEOUT,
        );
        assert!(orchestrator.available_providers().is_empty());
        assert_eq!(orchestrator.default_provider(), None);

        let statuses = orchestrator.provider_statuses();
        assert_eq!(statuses.len(), 3);
        assert!(statuses.iter().all(|s| !s.available));
    }
}
