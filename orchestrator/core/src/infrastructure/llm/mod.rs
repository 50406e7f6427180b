// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// LLM Provider Infrastructure - Anti-Corruption Layer Implementations
//
// Each adapter translates between the capability traits in domain::llm and
// one vendor API. Prompt text comes from the shared template engine and
// replies go through infrastructure::normalize.

pub mod chat;
pub mod gemini;
pub mod openai;
pub mod perplexity;
pub mod registry;

pub use registry::ProviderRegistry;

use crate::domain::llm::ProviderError;

/// Map a template rendering failure onto the adapter error type
pub(crate) fn prompt_or_invalid(rendered: anyhow::Result<String>) -> Result<String, ProviderError> {
    rendered.map_err(|e| ProviderError::InvalidInput(format!("{:#}", e)))
}
