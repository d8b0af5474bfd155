//! Engine settings loaded from the environment.

use std::str::FromStr;

use crate::infrastructure::gemini::{
    DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_IMAGE_MODEL, DEFAULT_GEMINI_MODEL,
};
use crate::infrastructure::ollama::{DEFAULT_OLLAMA_BASE_URL, DEFAULT_OLLAMA_MODEL};
use crate::infrastructure::resilient_llm::RetryConfig;

/// Creative (long-form) text model default.
pub const DEFAULT_CREATIVE_MODEL: &str = "gemini-3-pro-preview";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("GEMINI_API_KEY (or API_KEY) must be set when LLM_PROVIDER=gemini")]
    MissingApiKey,
    #[error("Unknown LLM provider '{0}' (expected 'gemini' or 'ollama')")]
    UnknownProvider(String),
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    #[default]
    Gemini,
    Ollama,
}

impl FromStr for LlmProvider {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(LlmProvider::Gemini),
            "ollama" => Ok(LlmProvider::Ollama),
            other => Err(SettingsError::UnknownProvider(other.to_string())),
        }
    }
}

/// Model selection threaded through every stage.
///
/// Structural stages use the fast model, long-form drafting uses the
/// creative model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    pub fast_model: String,
    pub creative_model: String,
    pub image_model: String,
    /// Render images inside the pipeline run instead of on demand
    pub render_images: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            fast_model: DEFAULT_GEMINI_MODEL.to_string(),
            creative_model: DEFAULT_CREATIVE_MODEL.to_string(),
            image_model: DEFAULT_GEMINI_IMAGE_MODEL.to_string(),
            render_images: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub provider: LlmProvider,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub ollama_base_url: String,
    pub ollama_model: String,
    pub generation: GenerationConfig,
    pub retry: RetryConfig,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            gemini_api_key: None,
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            generation: GenerationConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl EngineSettings {
    /// Read settings from process environment variables.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let provider = get("LLM_PROVIDER")
            .map(|p| p.parse::<LlmProvider>())
            .transpose()?
            .unwrap_or_default();

        let gemini_api_key = get("GEMINI_API_KEY").or_else(|| get("API_KEY"));
        if provider == LlmProvider::Gemini && gemini_api_key.is_none() {
            return Err(SettingsError::MissingApiKey);
        }

        let generation = GenerationConfig {
            fast_model: get("MODEL_TEXT_FAST").unwrap_or(defaults.generation.fast_model),
            creative_model: get("MODEL_TEXT_CREATIVE")
                .unwrap_or(defaults.generation.creative_model),
            image_model: get("MODEL_IMAGE").unwrap_or(defaults.generation.image_model),
            render_images: parse_or(
                "RENDER_IMAGES",
                get("RENDER_IMAGES"),
                defaults.generation.render_images,
            )?,
        };

        let retry = RetryConfig {
            max_attempts: parse_or(
                "RETRY_MAX_ATTEMPTS",
                get("RETRY_MAX_ATTEMPTS"),
                defaults.retry.max_attempts,
            )?,
            base_delay_ms: parse_or(
                "RETRY_BASE_DELAY_MS",
                get("RETRY_BASE_DELAY_MS"),
                defaults.retry.base_delay_ms,
            )?,
            max_delay_ms: parse_or(
                "RETRY_MAX_DELAY_MS",
                get("RETRY_MAX_DELAY_MS"),
                defaults.retry.max_delay_ms,
            )?,
            jitter_factor: defaults.retry.jitter_factor,
        };

        Ok(Self {
            provider,
            gemini_api_key,
            gemini_base_url: get("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
            ollama_base_url: get("OLLAMA_BASE_URL")
                .or_else(|| get("OLLAMA_URL"))
                .unwrap_or(defaults.ollama_base_url),
            ollama_model: get("OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
            generation,
            retry,
        })
    }
}

fn parse_or<T: FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, SettingsError> {
    match raw {
        Some(value) => value
            .parse()
            .map_err(|_| SettingsError::InvalidValue { key, value }),
        None => Ok(default),
    }
}
