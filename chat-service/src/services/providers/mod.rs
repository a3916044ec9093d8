//! Text generation provider abstractions and implementations.
//!
//! Handlers only see the [`TextProvider`] trait, so the hosted backend
//! (Bedrock) and the local mock are interchangeable at startup.

pub mod bedrock;
pub mod mock;

use async_trait::async_trait;
use service_core::error::AppError;
use thiserror::Error;

pub use bedrock::BedrockTextProvider;
pub use mock::MockTextProvider;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured(msg) => AppError::ConfigError(anyhow::anyhow!(msg)),
            other => AppError::UpstreamError(anyhow::Error::new(other)),
        }
    }
}

/// Generated reply returned by a provider.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// First generated text segment.
    pub text: String,

    /// Input tokens consumed, when reported.
    pub input_tokens: Option<u32>,

    /// Output tokens generated, when reported.
    pub output_tokens: Option<u32>,

    /// Why generation stopped.
    pub finish_reason: FinishReason,
}

/// Reason why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Complete,
    Length,
    Other,
}

/// Sampling settings sent with every generation request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    /// Maximum output tokens.
    pub max_tokens: u32,

    /// Temperature (0.0 - 1.0).
    pub temperature: f32,

    /// Top-p sampling.
    pub top_p: f32,
}

impl GenerationParams {
    /// The fixed settings used for chat replies. Callers cannot override them.
    pub const CHAT: GenerationParams = GenerationParams {
        max_tokens: 2048,
        temperature: 0.7,
        top_p: 0.9,
    };
}

/// Trait for single-turn text generation backends.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Generate a reply to one user message, optionally steered by a system
    /// instruction.
    async fn generate(
        &self,
        message: &str,
        system_prompt: Option<&str>,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError>;

    /// Identifier of the model serving requests, for logs.
    fn model_id(&self) -> &str;
}
