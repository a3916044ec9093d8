use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;

const DEFAULT_REGION: &str = "eu-west-1";
const DEFAULT_MODEL_ID: &str = "anthropic.claude-3-haiku-20240307-v1:0";

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub common: core_config::Config,
    pub history: HistoryConfig,
    pub genai: GenaiConfig,
}

#[derive(Debug, Clone)]
pub struct HistoryConfig {
    pub backend: HistoryBackend,
    /// Present when `backend` is MongoDB.
    pub mongodb: Option<MongoConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryBackend {
    Mongodb,
    Memory,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: Secret<String>,
    pub database: String,
    pub collection: String,
}

#[derive(Debug, Clone)]
pub struct GenaiConfig {
    pub provider: ProviderKind,
    /// Present when `provider` is Bedrock.
    pub bedrock: Option<BedrockConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Bedrock,
    Mock,
}

#[derive(Debug, Clone)]
pub struct BedrockConfig {
    pub region: String,
    pub model_id: String,
    pub api_key: Secret<String>,
    /// Base URL of the Bedrock runtime API.
    pub endpoint: String,
}

impl FromStr for HistoryBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(HistoryBackend::Mongodb),
            "memory" => Ok(HistoryBackend::Memory),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "Unknown HISTORY_BACKEND '{}' (expected 'mongodb' or 'memory')",
                other
            ))),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bedrock" => Ok(ProviderKind::Bedrock),
            "mock" => Ok(ProviderKind::Mock),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "Unknown GENAI_PROVIDER '{}' (expected 'bedrock' or 'mock')",
                other
            ))),
        }
    }
}

impl ChatConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let backend: HistoryBackend = get_env("HISTORY_BACKEND", Some("mongodb"), is_prod)?.parse()?;
        let mongodb = match backend {
            HistoryBackend::Mongodb => Some(MongoConfig {
                uri: Secret::new(get_env("MONGODB_URI", None, is_prod)?),
                database: get_env("MONGODB_DATABASE", Some("chat_db"), is_prod)?,
                collection: get_env("CHAT_HISTORY_COLLECTION", Some("chat_history"), is_prod)?,
            }),
            HistoryBackend::Memory => None,
        };

        let provider: ProviderKind = get_env("GENAI_PROVIDER", Some("bedrock"), is_prod)?.parse()?;
        let bedrock = match provider {
            ProviderKind::Bedrock => {
                let region = get_env("REGION", Some(DEFAULT_REGION), is_prod)?;
                let default_endpoint = format!("https://bedrock-runtime.{}.amazonaws.com", region);
                Some(BedrockConfig {
                    model_id: get_env("BEDROCK_MODEL_ID", Some(DEFAULT_MODEL_ID), is_prod)?,
                    api_key: Secret::new(get_env("BEDROCK_API_KEY", None, is_prod)?),
                    endpoint: get_env("BEDROCK_ENDPOINT", Some(&default_endpoint), is_prod)?,
                    region,
                })
            }
            ProviderKind::Mock => None,
        };

        Ok(ChatConfig {
            common: common_config,
            history: HistoryConfig { backend, mongodb },
            genai: GenaiConfig { provider, bedrock },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
