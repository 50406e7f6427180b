// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Chat Completions Client
//
// Shared transport for the OpenAI-compatible `/chat/completions` dialect
// spoken by every configured provider. Adapters own prompt shaping and
// normalization; this type only moves text over HTTP.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::llm::{ProviderError, ProviderId};

/// Sampling options sent with every chat request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChatOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    /// Ask the provider for a strict JSON object reply
    pub json_mode: bool,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 4096,
            json_mode: false,
        }
    }
}

pub struct ChatCompletionsClient {
    client: reqwest::Client,
    provider: ProviderId,
    endpoint: String,
    api_key: String,
    model: String,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
    /// Perplexity returns the URLs it grounded the answer on
    #[serde(default)]
    citations: Vec<String>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChatReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// Text of the first choice plus transport metadata
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub text: String,
    pub citations: Vec<String>,
    pub finish_reason: FinishReason,
}

/// Reason why generation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
}

impl ChatCompletionsClient {
    pub fn new(
        client: reqwest::Client,
        provider: ProviderId,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        options: ChatOptions,
    ) -> Self {
        Self {
            client,
            provider,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
            options,
        }
    }

    /// Send one system + user exchange and return the reply text
    pub async fn complete(&self, system: &str, prompt: &str) -> Result<ChatReply, ProviderError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.options.temperature,
            max_tokens: self.options.max_tokens,
            response_format: self.options.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let url = format!("{}/chat/completions", self.endpoint.trim_end_matches('/'));
        debug!(provider = %self.provider, model = %self.model, %url, "Sending chat completion");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status, error_text));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedEnvelope(format!("Failed to parse response: {}", e)))?;

        if let Some(usage) = &chat_response.usage {
            debug!(
                provider = %self.provider,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Chat completion usage"
            );
        }

        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::MalformedEnvelope("No choices in response".into()))?;

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("length") => FinishReason::Length,
            Some("content_filter") | Some("safety") => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        };

        let text = choice.message.content.unwrap_or_default();
        if finish_reason == FinishReason::Length {
            warn!(
                provider = %self.provider,
                max_tokens = self.options.max_tokens,
                "Chat completion truncated at the token limit"
            );
        }
        if finish_reason == FinishReason::ContentFilter && text.trim().is_empty() {
            return Err(ProviderError::ContentBlocked(format!(
                "{} refused to answer this prompt",
                self.provider
            )));
        }

        Ok(ChatReply {
            text,
            citations: chat_response.citations,
            finish_reason,
        })
    }

    /// Probe the models endpoint. 404/405 still prove the credential works.
    pub async fn health_check(&self) -> Result<(), ProviderError> {
        let url = format!("{}/models", self.endpoint.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() || status == 404 || status == 405 {
            Ok(())
        } else if status == 401 || status == 403 {
            Err(ProviderError::Authentication("Invalid API key".into()))
        } else {
            Err(ProviderError::Http {
                status: status.as_u16(),
                body: String::new(),
            })
        }
    }
}
