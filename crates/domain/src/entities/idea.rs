//! IdeaSeed entity - The raw request that starts a pipeline run

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::types::{AgeBracket, LanguageMode, SafetyLevel, StoryMode};

/// Settings chosen alongside the idea text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSettings {
    pub mode: StoryMode,
    pub age: AgeBracket,
    /// Requested number of units (scenes/pages/panels)
    pub count: u32,
    pub safety: SafetyLevel,
    #[serde(default)]
    pub language_mode: LanguageMode,
}

impl PipelineSettings {
    pub fn new(mode: StoryMode, age: AgeBracket, count: u32, safety: SafetyLevel) -> Self {
        Self {
            mode,
            age,
            count,
            safety,
            language_mode: LanguageMode::default(),
        }
    }

    pub fn with_language_mode(mut self, language_mode: LanguageMode) -> Self {
        self.language_mode = language_mode;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.count == 0 {
            return Err(DomainError::validation("Unit count must be at least 1"));
        }
        Ok(())
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::new(
            StoryMode::PictureBook,
            AgeBracket::MiddleYears,
            5,
            SafetyLevel::Strict,
        )
    }
}

/// Free-text idea plus its settings. Immutable once a run starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaSeed {
    prompt: String,
    settings: PipelineSettings,
}

impl IdeaSeed {
    pub fn new(prompt: impl Into<String>, settings: PipelineSettings) -> Result<Self, DomainError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(DomainError::validation("Idea prompt cannot be empty"));
        }
        settings.validate()?;
        Ok(Self { prompt, settings })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }
}
