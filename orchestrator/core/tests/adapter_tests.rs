// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;

use quill_core::domain::content::{
    ContentGenerationRequest, ImageGenerationRequest, ImageSize, ImageStyle, ResearchDepth,
    ResearchRequest, SeoOptimizationRequest,
};
use quill_core::domain::llm::{
    AIProvider, ContentGenerator, ImageGenerator, ProviderError, ProviderId, Researcher,
    SeoOptimizer,
};
use quill_core::infrastructure::llm::chat::ChatOptions;
use quill_core::infrastructure::llm::gemini::GeminiAdapter;
use quill_core::infrastructure::llm::openai::OpenAIAdapter;
use quill_core::infrastructure::llm::perplexity::PerplexityAdapter;
use quill_core::infrastructure::prompt_template_engine::PromptTemplateEngine;

fn chat_body(content: &str) -> String {
    json!({
        "choices": [{
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
    .to_string()
}

fn openai(url: String) -> OpenAIAdapter {
    OpenAIAdapter::new(
        reqwest::Client::new(),
        url,
        "sk-test".to_string(),
        "gpt-4o".to_string(),
        "dall-e-3".to_string(),
        ChatOptions::default(),
        Arc::new(PromptTemplateEngine::new()),
    )
}

fn gemini(url: String) -> GeminiAdapter {
    GeminiAdapter::new(
        reqwest::Client::new(),
        url,
        "gem-test".to_string(),
        "gemini-1.5-pro".to_string(),
        "gemini-2.0-flash-exp".to_string(),
        ChatOptions::default(),
        Arc::new(PromptTemplateEngine::new()),
    )
}

fn perplexity(url: String) -> PerplexityAdapter {
    PerplexityAdapter::new(
        reqwest::Client::new(),
        url,
        "pplx-test".to_string(),
        "sonar-pro".to_string(),
        ChatOptions::default(),
        Arc::new(PromptTemplateEngine::new()),
    )
}

fn image_request() -> ImageGenerationRequest {
    ImageGenerationRequest {
        prompt: "Tram climbing a hill in Lisbon".to_string(),
        style: ImageStyle::Vibrant,
        size: ImageSize::Large,
    }
}

#[tokio::test]
async fn test_openai_content_in_json_mode() {
    let mut server = mockito::Server::new_async().await;
    let article = json!({
        "title": "Lisbon in Three Days",
        "content": "Day one starts in Alfama.",
        "excerpt": "A short itinerary",
        "metaTitle": "Lisbon in Three Days: the complete itinerary for first-time visitors to Portugal",
        "keywords": ["lisbon", "itinerary"],
        "outline": ["Day one", "Day two", "Day three"]
    });
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4o",
            "response_format": { "type": "json_object" }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(chat_body(&article.to_string()))
        .create_async()
        .await;

    let adapter = openai(server.url());
    let response = adapter
        .generate_content(&ContentGenerationRequest::new("Lisbon"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response.provider, ProviderId::OpenAI);
    assert_eq!(response.title, "Lisbon in Three Days");
    assert_eq!(response.meta_title.chars().count(), 60);
    assert_eq!(response.outline.len(), 3);
    assert_eq!(response.reading_time, 1);
}

#[tokio::test]
async fn test_openai_prose_reply_degrades() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(chat_body("Lisbon is a city of seven hills and many viewpoints."))
        .create_async()
        .await;

    let mut request = ContentGenerationRequest::new("Lisbon");
    request.keywords = vec!["miradouro".to_string()];
    let response = openai(server.url()).generate_content(&request).await.unwrap();

    assert_eq!(response.title, "Lisbon - Travel Guide");
    assert_eq!(
        response.content,
        "Lisbon is a city of seven hills and many viewpoints."
    );
    assert_eq!(response.keywords, vec!["miradouro".to_string()]);
    assert!(response.outline.is_empty());
}

#[tokio::test]
async fn test_status_codes_map_to_provider_errors() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_body(r#"{"error":{"message":"Incorrect API key"}}"#)
        .create_async()
        .await;

    let err = openai(server.url())
        .generate_content(&ContentGenerationRequest::new("Lisbon"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Authentication(_)));

    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .create_async()
        .await;

    let err = perplexity(server.url())
        .generate_content(&ContentGenerationRequest::new("Lisbon"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::RateLimit));
}

#[tokio::test]
async fn test_openai_image_generation() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/images/generations")
        .match_body(Matcher::PartialJson(json!({
            "model": "dall-e-3",
            "size": "1792x1024",
            "style": "vivid"
        })))
        .with_status(200)
        .with_body(r#"{"data":[{"url":"https://images.openai.test/tram.png"}]}"#)
        .create_async()
        .await;

    let response = openai(server.url())
        .generate_image(&image_request())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response.image_url, "https://images.openai.test/tram.png");
    assert_eq!(response.alt_text, "Tram climbing a hill in Lisbon");
}

#[tokio::test]
async fn test_openai_content_policy_rejection() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/images/generations")
        .with_status(400)
        .with_body(r#"{"error":{"code":"content_policy_violation"}}"#)
        .create_async()
        .await;

    let err = openai(server.url())
        .generate_image(&image_request())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::ContentBlocked(_)));
}

#[tokio::test]
async fn test_gemini_uses_openai_compatible_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let fenced = "```json\n{\"metaTitle\":\"Lisbon\",\"metaDescription\":\"Hills\",\"seoScore\":\"82\"}\n```";
    let mock = server
        .mock("POST", "/openai/chat/completions")
        .match_header("authorization", "Bearer gem-test")
        .with_status(200)
        .with_body(chat_body(fenced))
        .create_async()
        .await;

    let request = SeoOptimizationRequest {
        title: "Lisbon".to_string(),
        content: "Hills and trams.".to_string(),
        target_keywords: vec![],
    };
    let response = gemini(server.url()).optimize_seo(&request).await.unwrap();

    mock.assert_async().await;
    assert_eq!(response.meta_title, "Lisbon");
    assert_eq!(response.seo_score, 82);
}

#[tokio::test]
async fn test_gemini_image_returns_data_url() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/models/gemini-2.0-flash-exp:generateContent")
        .match_header("x-goog-api-key", "gem-test")
        .with_status(200)
        .with_body(
            json!({
                "candidates": [{
                    "content": {
                        "parts": [
                            { "text": "Here is your image" },
                            { "inlineData": { "mimeType": "image/png", "data": "iVBORw0KGgo=" } }
                        ]
                    }
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let response = gemini(server.url())
        .generate_image(&image_request())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response.image_url, "data:image/png;base64,iVBORw0KGgo=");
}

#[tokio::test]
async fn test_gemini_blocked_prompt() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/models/gemini-2.0-flash-exp:generateContent")
        .with_status(200)
        .with_body(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#)
        .create_async()
        .await;

    let err = gemini(server.url())
        .generate_image(&image_request())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::ContentBlocked(reason) if reason == "SAFETY"));
}

#[tokio::test]
async fn test_gemini_image_without_image_part() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/models/gemini-2.0-flash-exp:generateContent")
        .with_status(200)
        .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"Sorry"}]}}]}"#)
        .create_async()
        .await;

    let err = gemini(server.url())
        .generate_image(&image_request())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::MalformedEnvelope(_)));
}

#[tokio::test]
async fn test_perplexity_research_with_citations() {
    let mut server = mockito::Server::new_async().await;
    let reply = r#"Here is what I found:
{"summary":"Lisbon is Europe's sunniest capital.","keyFacts":["Lisbon has about 290 sunny days a year"],"relatedTopics":["Sintra"]}"#;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::Regex("\"model\":\"sonar-pro\"".to_string()))
        .with_status(200)
        .with_body(
            json!({
                "choices": [{ "message": { "content": reply }, "finish_reason": "stop" }],
                "citations": ["https://visitlisboa.test", "https://wiki.test/Lisbon"]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let request = ResearchRequest {
        topic: "Lisbon".to_string(),
        depth: ResearchDepth::Standard,
    };
    let response = perplexity(server.url()).research(&request).await.unwrap();

    mock.assert_async().await;
    assert_eq!(response.summary, "Lisbon is Europe's sunniest capital.");
    assert_eq!(response.key_facts.len(), 1);
    assert_eq!(response.related_topics, vec!["Sintra".to_string()]);
    assert_eq!(response.sources.len(), 2);
    assert_eq!(response.sources[0].url, "https://visitlisboa.test");
}

#[test]
fn test_adapter_capability_sets() {
    let url = "http://127.0.0.1:9".to_string();
    assert_eq!(openai(url.clone()).capabilities(), ProviderId::OpenAI.capabilities());
    assert_eq!(gemini(url.clone()).capabilities(), ProviderId::Gemini.capabilities());
    assert_eq!(perplexity(url).capabilities(), ProviderId::Perplexity.capabilities());
    assert!(perplexity("http://127.0.0.1:9".to_string()).image_generator().is_none());
}
