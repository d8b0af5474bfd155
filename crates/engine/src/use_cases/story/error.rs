//! Stage and pipeline error types.

use std::fmt;

use storyloom_domain::DomainError;

use super::sanitizer::SanitizeError;
use crate::infrastructure::ports::LlmError;

/// User-facing message for quota exhaustion.
pub const QUOTA_USER_MESSAGE: &str = "API Quota Exceeded (429). Please try again later.";

/// User-facing message for every other failure.
pub const GENERIC_USER_MESSAGE: &str = "System Malfunction: Check API Key";

/// Every model-backed step, pipeline and on-demand alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Refine,
    Bible,
    Draft,
    Illustrate,
    Image,
    Review,
    Translate,
    Voice,
    Sound,
    Trends,
    Strategy,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Refine => "refine",
            Stage::Bible => "bible",
            Stage::Draft => "draft",
            Stage::Illustrate => "illustrate",
            Stage::Image => "image",
            Stage::Review => "review",
            Stage::Translate => "translate",
            Stage::Voice => "voice",
            Stage::Sound => "sound",
            Stage::Trends => "trends",
            Stage::Strategy => "strategy",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum StageError {
    #[error("{stage} stage hit the model quota: {message}")]
    QuotaExceeded { stage: Stage, message: String },
    #[error("{stage} stage failed: {message}")]
    Failed { stage: Stage, message: String },
}

impl StageError {
    pub fn failed(stage: Stage, message: impl Into<String>) -> Self {
        Self::Failed {
            stage,
            message: message.into(),
        }
    }

    /// Classify a transport failure that survived the retry executor.
    pub fn from_llm(stage: Stage, error: LlmError) -> Self {
        if error.is_quota() {
            Self::QuotaExceeded {
                stage,
                message: error.to_string(),
            }
        } else {
            Self::failed(stage, error.to_string())
        }
    }

    pub fn malformed(stage: Stage, error: SanitizeError) -> Self {
        Self::failed(stage, format!("unusable model output: {}", error))
    }

    pub fn stage(&self) -> Stage {
        match self {
            Self::QuotaExceeded { stage, .. } | Self::Failed { stage, .. } => *stage,
        }
    }

    pub fn is_quota(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid settings: {0}")]
    InvalidSettings(#[from] DomainError),
    #[error(transparent)]
    Stage(#[from] StageError),
}

impl PipelineError {
    pub fn is_quota(&self) -> bool {
        matches!(self, Self::Stage(e) if e.is_quota())
    }

    /// The single message shown to the person who started the run.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidSettings(e) => e.to_string(),
            Self::Stage(e) if e.is_quota() => QUOTA_USER_MESSAGE.to_string(),
            Self::Stage(_) => GENERIC_USER_MESSAGE.to_string(),
        }
    }
}
