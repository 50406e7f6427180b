// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Gemini Provider Adapter
//
// Anti-Corruption Layer for Google Gemini. Text capabilities use Gemini's
// OpenAI-compatible chat endpoint; images use the native generateContent
// API with image response modality and come back as inline base64 data.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

use super::chat::{ChatCompletionsClient, ChatOptions};
use super::prompt_or_invalid;
use crate::domain::content::{
    truncate_chars, ContentEnhancementRequest, ContentEnhancementResponse,
    ContentGenerationRequest, ContentGenerationResponse, ImageGenerationRequest,
    ImageGenerationResponse, SeoOptimizationRequest, SeoOptimizationResponse,
};
use crate::domain::llm::{
    AIProvider, ContentEnhancer, ContentGenerator, ImageGenerator, ProviderError, ProviderId,
    SeoOptimizer,
};
use crate::infrastructure::normalize;
use crate::infrastructure::prompt_template_engine::{PromptTemplateEngine, SYSTEM_PROMPT};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.0-flash-exp";

const ALT_TEXT_CHARS: usize = 100;

pub struct GeminiAdapter {
    chat: ChatCompletionsClient,
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    image_model: String,
    prompts: Arc<PromptTemplateEngine>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<serde_json::Value>,
    generation_config: serde_json::Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

impl GeminiAdapter {
    pub fn new(
        client: reqwest::Client,
        endpoint: String,
        api_key: String,
        model: String,
        image_model: String,
        options: ChatOptions,
        prompts: Arc<PromptTemplateEngine>,
    ) -> Self {
        let chat_endpoint = format!("{}/openai", endpoint.trim_end_matches('/'));
        let chat = ChatCompletionsClient::new(
            client.clone(),
            ProviderId::Gemini,
            chat_endpoint,
            api_key.clone(),
            model,
            ChatOptions {
                json_mode: true,
                ..options
            },
        );

        Self {
            chat,
            client,
            endpoint,
            api_key,
            image_model,
            prompts,
        }
    }
}

#[async_trait]
impl ContentGenerator for GeminiAdapter {
    async fn generate_content(
        &self,
        request: &ContentGenerationRequest,
    ) -> Result<ContentGenerationResponse, ProviderError> {
        let prompt = prompt_or_invalid(self.prompts.content_prompt(request))?;
        let reply = self.chat.complete(SYSTEM_PROMPT, &prompt).await?;
        info!(provider = "gemini", length = reply.text.len(), "Content response received");

        Ok(normalize::parse_content_response(&reply.text, request, ProviderId::Gemini).into_inner())
    }
}

#[async_trait]
impl SeoOptimizer for GeminiAdapter {
    async fn optimize_seo(
        &self,
        request: &SeoOptimizationRequest,
    ) -> Result<SeoOptimizationResponse, ProviderError> {
        let prompt = prompt_or_invalid(self.prompts.seo_prompt(request))?;
        let reply = self.chat.complete(SYSTEM_PROMPT, &prompt).await?;

        Ok(normalize::parse_seo_response(&reply.text, request, ProviderId::Gemini).into_inner())
    }
}

#[async_trait]
impl ContentEnhancer for GeminiAdapter {
    async fn enhance_content(
        &self,
        request: &ContentEnhancementRequest,
    ) -> Result<ContentEnhancementResponse, ProviderError> {
        let prompt = prompt_or_invalid(self.prompts.enhancement_prompt(request))?;
        let reply = self.chat.complete(SYSTEM_PROMPT, &prompt).await?;

        Ok(
            normalize::parse_enhancement_response(&reply.text, request, ProviderId::Gemini)
                .into_inner(),
        )
    }
}

#[async_trait]
impl ImageGenerator for GeminiAdapter {
    async fn generate_image(
        &self,
        request: &ImageGenerationRequest,
    ) -> Result<ImageGenerationResponse, ProviderError> {
        let styled = prompt_or_invalid(self.prompts.image_prompt(request))?;
        let prompt = format!(
            "Generate a high-quality {} image: {}",
            request.size.aspect_ratio(),
            styled
        );

        let body = GenerateContentRequest {
            contents: vec![json!({ "parts": [{ "text": prompt }] })],
            generation_config: json!({
                "responseModalities": ["TEXT", "IMAGE"],
                "temperature": 1.0
            }),
        };

        let url = format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.image_model
        );
        debug!(provider = "gemini", model = %self.image_model, "Requesting image generation");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status, error_text));
        }

        let generated: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedEnvelope(format!("Failed to parse response: {}", e)))?;

        if let Some(reason) = generated.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(ProviderError::ContentBlocked(reason));
        }

        let inline = generated
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.inline_data)
            .find(|d| d.mime_type.starts_with("image/"))
            .ok_or_else(|| ProviderError::MalformedEnvelope("No image generated".into()))?;

        Ok(ImageGenerationResponse {
            image_url: format!("data:{};base64,{}", inline.mime_type, inline.data),
            alt_text: truncate_chars(request.prompt.trim(), ALT_TEXT_CHARS),
        })
    }
}

#[async_trait]
impl AIProvider for GeminiAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Gemini
    }

    fn content_generator(&self) -> Option<&dyn ContentGenerator> {
        Some(self)
    }

    fn seo_optimizer(&self) -> Option<&dyn SeoOptimizer> {
        Some(self)
    }

    fn content_enhancer(&self) -> Option<&dyn ContentEnhancer> {
        Some(self)
    }

    fn image_generator(&self) -> Option<&dyn ImageGenerator> {
        Some(self)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        self.chat.health_check().await
    }
}
