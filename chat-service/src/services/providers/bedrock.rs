//! Amazon Bedrock provider implementation.
//!
//! Invokes an Anthropic Claude model through the Bedrock runtime
//! `InvokeModel` API with a bearer API key.

use super::{FinishReason, GenerationParams, ProviderError, ProviderResponse, TextProvider};
use crate::config::BedrockConfig;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

/// Messages API version Bedrock expects for Anthropic models.
const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Bedrock text provider.
pub struct BedrockTextProvider {
    config: BedrockConfig,
    client: Client,
}

impl BedrockTextProvider {
    pub fn new(config: BedrockConfig) -> Result<Self, ProviderError> {
        if config.api_key.expose_secret().is_empty() {
            return Err(ProviderError::NotConfigured(
                "Bedrock API key not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Build the InvokeModel URL for the configured model.
    fn invoke_url(&self) -> String {
        format!(
            "{}/model/{}/invoke",
            self.config.endpoint.trim_end_matches('/'),
            urlencoding::encode(&self.config.model_id)
        )
    }
}

#[async_trait]
impl TextProvider for BedrockTextProvider {
    async fn generate(
        &self,
        message: &str,
        system_prompt: Option<&str>,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        let request = InvokeModelRequest {
            anthropic_version: ANTHROPIC_VERSION,
            max_tokens: params.max_tokens,
            messages: vec![Message {
                role: "user",
                content: message,
            }],
            temperature: params.temperature,
            top_p: params.top_p,
            system: system_prompt,
        };

        tracing::info!(
            model = %self.config.model_id,
            region = %self.config.region,
            "Invoking Bedrock model"
        );

        let response = self
            .client
            .post(self.invoke_url())
            .bearer_auth(self.config.api_key.expose_secret())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError(format!(
                "Bedrock API error {}: {}",
                status, error_text
            )));
        }

        let api_response: InvokeModelResponse = response.json().await.map_err(|e| {
            ProviderError::UnexpectedResponse(format!("Failed to parse response: {}", e))
        })?;

        let text = api_response
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .ok_or_else(|| {
                ProviderError::UnexpectedResponse(
                    "Response contained no generated text".to_string(),
                )
            })?;

        let finish_reason = match api_response.stop_reason.as_deref() {
            Some("end_turn") | Some("stop_sequence") => FinishReason::Complete,
            Some("max_tokens") => FinishReason::Length,
            _ => FinishReason::Other,
        };

        let usage = api_response.usage.unwrap_or_default();

        Ok(ProviderResponse {
            text,
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            finish_reason,
        })
    }

    fn model_id(&self) -> &str {
        &self.config.model_id
    }
}

// ============================================================================
// Bedrock / Anthropic Messages Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct InvokeModelRequest<'a> {
    anthropic_version: &'static str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
    temperature: f32,
    top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct InvokeModelResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct Usage {
    input_tokens: Option<u32>,
    output_tokens: Option<u32>,
}
