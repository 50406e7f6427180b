// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Availability
//!
//! Decides which providers are usable and in what order they are tried.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Pure, deterministic provider resolution

use std::collections::HashSet;

use crate::domain::llm::{Capability, ProviderId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    #[error("No AI provider is configured; set at least one provider API key")]
    NoProviderConfigured,

    #[error("Provider '{provider}' does not support {capability}")]
    CapabilityUnsupported {
        provider: ProviderId,
        capability: Capability,
    },
}

/// Snapshot of which providers have a credential, ordered by preference.
///
/// Built once from configuration; every method is a pure function of that
/// snapshot and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityResolver {
    available: Vec<ProviderId>,
}

impl AvailabilityResolver {
    /// `configured` holds the providers whose credential is present.
    /// Configured providers missing from `preference_order` are tried last,
    /// in their canonical order.
    pub fn new(preference_order: &[ProviderId], configured: &HashSet<ProviderId>) -> Self {
        let mut available = Vec::with_capacity(configured.len());

        for id in preference_order.iter().chain(ProviderId::ALL.iter()) {
            if configured.contains(id) && !available.contains(id) {
                available.push(*id);
            }
        }

        Self { available }
    }

    /// Available providers in preference order
    pub fn available(&self) -> &[ProviderId] {
        &self.available
    }

    pub fn is_available(&self, id: ProviderId) -> bool {
        self.available.contains(&id)
    }

    /// First available provider in preference order
    pub fn default_provider(&self) -> Option<ProviderId> {
        self.available.first().copied()
    }

    /// Preferred provider when available, else the first available one.
    pub fn resolve(&self, preferred: Option<ProviderId>) -> Result<ProviderId, ResolutionError> {
        if let Some(preferred) = preferred.filter(|p| self.is_available(*p)) {
            return Ok(preferred);
        }
        self.default_provider()
            .ok_or(ResolutionError::NoProviderConfigured)
    }

    /// Like [`resolve`](Self::resolve) but restricted to providers that
    /// support `capability`. Used for capabilities only some providers offer.
    pub fn resolve_capable(
        &self,
        capability: Capability,
        preferred: Option<ProviderId>,
    ) -> Result<ProviderId, ResolutionError> {
        let default = self
            .default_provider()
            .ok_or(ResolutionError::NoProviderConfigured)?;

        if let Some(preferred) =
            preferred.filter(|p| self.is_available(*p) && p.supports(capability))
        {
            return Ok(preferred);
        }

        self.available
            .iter()
            .copied()
            .find(|p| p.supports(capability))
            .ok_or(ResolutionError::CapabilityUnsupported {
                provider: default,
                capability,
            })
    }

    /// First available provider other than `primary` that supports `capability`
    pub fn fallback_for(&self, primary: ProviderId, capability: Capability) -> Option<ProviderId> {
        self.available
            .iter()
            .copied()
            .find(|p| *p != primary && p.supports(capability))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDER: [ProviderId; 3] = [ProviderId::Gemini, ProviderId::OpenAI, ProviderId::Perplexity];

    fn resolver(configured: &[ProviderId]) -> AvailabilityResolver {
        AvailabilityResolver::new(&ORDER, &configured.iter().copied().collect())
    }

    #[test]
    fn test_empty_configuration() {
        let r = resolver(&[]);
        assert!(r.available().is_empty());
        assert_eq!(r.resolve(None), Err(ResolutionError::NoProviderConfigured));
        assert_eq!(
            r.resolve(Some(ProviderId::OpenAI)),
            Err(ResolutionError::NoProviderConfigured)
        );
        assert_eq!(
            r.resolve_capable(Capability::Research, None),
            Err(ResolutionError::NoProviderConfigured)
        );
    }

    #[test]
    fn test_preferred_used_when_available() {
        let r = resolver(&[ProviderId::Gemini, ProviderId::Perplexity]);
        assert_eq!(r.resolve(Some(ProviderId::Perplexity)), Ok(ProviderId::Perplexity));
        assert_eq!(r.resolve(None), Ok(ProviderId::Gemini));
    }

    #[test]
    fn test_unavailable_preference_ignored() {
        let r = resolver(&[ProviderId::Gemini]);
        assert_eq!(r.resolve(Some(ProviderId::OpenAI)), Ok(ProviderId::Gemini));
    }

    #[test]
    fn test_preference_order_respected() {
        let order = [ProviderId::Perplexity, ProviderId::Gemini];
        let configured = ProviderId::ALL.into_iter().collect();
        let r = AvailabilityResolver::new(&order, &configured);
        // OpenAI is configured but not listed, so it goes last
        assert_eq!(
            r.available(),
            &[ProviderId::Perplexity, ProviderId::Gemini, ProviderId::OpenAI]
        );
        assert_eq!(r.resolve(None), Ok(ProviderId::Perplexity));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let r = resolver(&[ProviderId::OpenAI, ProviderId::Perplexity]);
        let first = r.resolve(Some(ProviderId::Gemini));
        for _ in 0..10 {
            assert_eq!(r.resolve(Some(ProviderId::Gemini)), first);
        }
    }

    #[test]
    fn test_capable_resolution() {
        let r = resolver(&[ProviderId::Gemini, ProviderId::Perplexity]);
        assert_eq!(
            r.resolve_capable(Capability::Research, Some(ProviderId::Gemini)),
            Ok(ProviderId::Perplexity)
        );
        assert_eq!(
            r.resolve_capable(Capability::ImageGeneration, None),
            Ok(ProviderId::Gemini)
        );

        let only_perplexity = resolver(&[ProviderId::Perplexity]);
        assert_eq!(
            only_perplexity.resolve_capable(Capability::ImageGeneration, None),
            Err(ResolutionError::CapabilityUnsupported {
                provider: ProviderId::Perplexity,
                capability: Capability::ImageGeneration,
            })
        );
    }

    #[test]
    fn test_fallback_selection() {
        let r = resolver(&[ProviderId::Gemini, ProviderId::Perplexity]);
        assert_eq!(
            r.fallback_for(ProviderId::Gemini, Capability::ContentGeneration),
            Some(ProviderId::Perplexity)
        );
        assert_eq!(
            r.fallback_for(ProviderId::Perplexity, Capability::ContentGeneration),
            Some(ProviderId::Gemini)
        );
        assert_eq!(
            resolver(&[ProviderId::OpenAI]).fallback_for(ProviderId::OpenAI, Capability::ContentGeneration),
            None
        );
    }
}
