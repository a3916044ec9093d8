//! Mock provider for local development and tests.

use super::{FinishReason, GenerationParams, ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;

/// Mock text provider that answers without calling any service.
#[derive(Debug, Default)]
pub struct MockTextProvider;

impl MockTextProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn generate(
        &self,
        message: &str,
        _system_prompt: Option<&str>,
        _params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        Ok(ProviderResponse {
            text: format!("Mock response for: {}", message),
            input_tokens: Some((message.len() / 4) as u32),
            output_tokens: Some(10),
            finish_reason: FinishReason::Complete,
        })
    }

    fn model_id(&self) -> &str {
        "mock"
    }
}
