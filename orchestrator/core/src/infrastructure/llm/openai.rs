// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// OpenAI Provider Adapter
//
// Anti-Corruption Layer for the OpenAI API: chat completions in JSON mode
// for text capabilities, DALL-E for images.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::chat::{ChatCompletionsClient, ChatOptions};
use super::prompt_or_invalid;
use crate::domain::content::{
    truncate_chars, ContentEnhancementRequest, ContentEnhancementResponse,
    ContentGenerationRequest, ContentGenerationResponse, ImageGenerationRequest,
    ImageGenerationResponse, ImageSize, ImageStyle, SeoOptimizationRequest,
    SeoOptimizationResponse,
};
use crate::domain::llm::{
    AIProvider, ContentEnhancer, ContentGenerator, ImageGenerator, ProviderError, ProviderId,
    SeoOptimizer,
};
use crate::infrastructure::normalize;
use crate::infrastructure::prompt_template_engine::{PromptTemplateEngine, SYSTEM_PROMPT};

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

const ALT_TEXT_CHARS: usize = 100;

pub struct OpenAIAdapter {
    chat: ChatCompletionsClient,
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    image_model: String,
    prompts: Arc<PromptTemplateEngine>,
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'static str,
    style: &'static str,
}

#[derive(Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    b64_json: Option<String>,
}

impl OpenAIAdapter {
    pub fn new(
        client: reqwest::Client,
        endpoint: String,
        api_key: String,
        model: String,
        image_model: String,
        options: ChatOptions,
        prompts: Arc<PromptTemplateEngine>,
    ) -> Self {
        let chat = ChatCompletionsClient::new(
            client.clone(),
            ProviderId::OpenAI,
            endpoint.clone(),
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

    /// DALL-E 3 only renders square, wide and tall images
    fn dalle_size(size: ImageSize) -> &'static str {
        match size {
            ImageSize::Small | ImageSize::Medium => "1024x1024",
            ImageSize::Large => "1792x1024",
        }
    }

    fn dalle_style(style: ImageStyle) -> &'static str {
        match style {
            ImageStyle::Realistic | ImageStyle::Minimalist => "natural",
            ImageStyle::Artistic | ImageStyle::Vibrant => "vivid",
        }
    }
}

#[async_trait]
impl ContentGenerator for OpenAIAdapter {
    async fn generate_content(
        &self,
        request: &ContentGenerationRequest,
    ) -> Result<ContentGenerationResponse, ProviderError> {
        let prompt = prompt_or_invalid(self.prompts.content_prompt(request))?;
        let reply = self.chat.complete(SYSTEM_PROMPT, &prompt).await?;
        info!(provider = "openai", length = reply.text.len(), "Content response received");

        Ok(normalize::parse_content_response(&reply.text, request, ProviderId::OpenAI).into_inner())
    }
}

#[async_trait]
impl SeoOptimizer for OpenAIAdapter {
    async fn optimize_seo(
        &self,
        request: &SeoOptimizationRequest,
    ) -> Result<SeoOptimizationResponse, ProviderError> {
        let prompt = prompt_or_invalid(self.prompts.seo_prompt(request))?;
        let reply = self.chat.complete(SYSTEM_PROMPT, &prompt).await?;

        Ok(normalize::parse_seo_response(&reply.text, request, ProviderId::OpenAI).into_inner())
    }
}

#[async_trait]
impl ContentEnhancer for OpenAIAdapter {
    async fn enhance_content(
        &self,
        request: &ContentEnhancementRequest,
    ) -> Result<ContentEnhancementResponse, ProviderError> {
        let prompt = prompt_or_invalid(self.prompts.enhancement_prompt(request))?;
        let reply = self.chat.complete(SYSTEM_PROMPT, &prompt).await?;

        Ok(
            normalize::parse_enhancement_response(&reply.text, request, ProviderId::OpenAI)
                .into_inner(),
        )
    }
}

#[async_trait]
impl ImageGenerator for OpenAIAdapter {
    async fn generate_image(
        &self,
        request: &ImageGenerationRequest,
    ) -> Result<ImageGenerationResponse, ProviderError> {
        let prompt = prompt_or_invalid(self.prompts.image_prompt(request))?;
        let body = ImageRequest {
            model: &self.image_model,
            prompt: &prompt,
            n: 1,
            size: Self::dalle_size(request.size),
            style: Self::dalle_style(request.style),
        };

        let url = format!("{}/images/generations", self.endpoint.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            // DALL-E reports safety rejections as 400 content_policy_violation
            if status == 400 && error_text.contains("content_policy") {
                return Err(ProviderError::ContentBlocked(error_text));
            }
            return Err(ProviderError::from_status(status, error_text));
        }

        let image_response: ImageResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedEnvelope(format!("Failed to parse response: {}", e)))?;

        let image = image_response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::MalformedEnvelope("No image in response".into()))?;

        let image_url = match (image.url, image.b64_json) {
            (Some(url), _) => url,
            (None, Some(b64)) => format!("data:image/png;base64,{}", b64),
            (None, None) => {
                return Err(ProviderError::MalformedEnvelope(
                    "Image entry has neither url nor b64_json".into(),
                ))
            }
        };

        Ok(ImageGenerationResponse {
            image_url,
            alt_text: truncate_chars(request.prompt.trim(), ALT_TEXT_CHARS),
        })
    }
}

#[async_trait]
impl AIProvider for OpenAIAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::OpenAI
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
