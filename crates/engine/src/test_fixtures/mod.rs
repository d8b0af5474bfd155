//! Test fixtures: canned model replies and a role-routing scripted model.
//!
//! Stage replies live in `test_data/stages/` as raw model output (fences,
//! preambles and all), so the sanitizer sees realistic text.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_fixtures::{app_with, ScriptedLlm};
//!
//! #[tokio::test]
//! async fn test_pipeline() {
//!     let llm = Arc::new(ScriptedLlm::happy());
//!     let app = app_with(llm.clone());
//!     // ... run the pipeline
//! }
//! ```

pub mod image_mocks;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::app::App;
use crate::infrastructure::clock::{FixedClock, FixedRandom, RecordingSleeper};
use crate::infrastructure::ports::{ImageGenPort, LlmError, LlmPort, LlmRequest, LlmResponse};
use crate::infrastructure::resilient_llm::{ResilientLlmClient, RetryConfig, RetryExecutor};
use crate::infrastructure::settings::GenerationConfig;
use crate::use_cases::story::prompts::{
    BIBLE_ROLE, DRAFT_ROLE, ILLUSTRATION_ROLE, REFINER_ROLE, REVIEW_ROLE, SOUND_ROLE,
    STRATEGY_ROLE, TRANSLATOR_ROLE, TREND_ROLE, VOICE_ROLE,
};
use crate::use_cases::story::StoryPipeline;

use image_mocks::PlaceholderImageGen;

// =============================================================================
// Fixture Loading
// =============================================================================

/// Load a raw model reply from the test_data/ directory.
///
/// # Panics
///
/// Panics if the fixture file cannot be read.
pub fn load_reply(path: &str) -> String {
    let fixture_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_data")
        .join(path);
    std::fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read fixture '{}': {}",
            fixture_path.display(),
            e
        )
    })
}

/// Canned replies for the lost-cat story, one per pipeline stage.
pub mod replies {
    use super::load_reply;

    pub fn refine() -> String {
        load_reply("stages/refine.txt")
    }

    pub fn bible() -> String {
        load_reply("stages/bible.txt")
    }

    /// Three units.
    pub fn draft() -> String {
        load_reply("stages/draft.txt")
    }

    /// Unit 2's prompt omits the character token on purpose.
    pub fn illustrate() -> String {
        load_reply("stages/illustrate.txt")
    }

    /// One issue, one text fix for unit 2.
    pub fn review() -> String {
        load_reply("stages/review.txt")
    }
}

// =============================================================================
// Scripted LLM
// =============================================================================

const ROLES: [&str; 10] = [
    REFINER_ROLE,
    BIBLE_ROLE,
    DRAFT_ROLE,
    ILLUSTRATION_ROLE,
    REVIEW_ROLE,
    TRANSLATOR_ROLE,
    VOICE_ROLE,
    SOUND_ROLE,
    TREND_ROLE,
    STRATEGY_ROLE,
];

/// Model fake that answers by the role named in the system prompt.
///
/// Roles without a script fail with an invalid-response error.
#[derive(Default)]
pub struct ScriptedLlm {
    replies: HashMap<&'static str, Result<String, LlmError>>,
    calls: Mutex<Vec<&'static str>>,
}

impl ScriptedLlm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every pipeline stage answers with its canned reply.
    pub fn happy() -> Self {
        Self::new()
            .reply(REFINER_ROLE, replies::refine())
            .reply(BIBLE_ROLE, replies::bible())
            .reply(DRAFT_ROLE, replies::draft())
            .reply(ILLUSTRATION_ROLE, replies::illustrate())
            .reply(REVIEW_ROLE, replies::review())
    }

    pub fn reply(mut self, role: &'static str, text: impl Into<String>) -> Self {
        self.replies.insert(role, Ok(text.into()));
        self
    }

    pub fn fail(mut self, role: &'static str, error: LlmError) -> Self {
        self.replies.insert(role, Err(error));
        self
    }

    pub fn calls_for(&self, role: &str) -> usize {
        self.calls
            .lock()
            .map(|calls| calls.iter().filter(|r| **r == role).count())
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    fn role_of(request: &LlmRequest) -> Option<&'static str> {
        let system = request.system_prompt.as_deref().unwrap_or_default();
        ROLES
            .iter()
            .copied()
            .find(|role| system.starts_with(&format!("You are the \"{}\"", role)))
    }
}

#[async_trait]
impl LlmPort for ScriptedLlm {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let role = Self::role_of(&request)
            .ok_or_else(|| LlmError::InvalidResponse("unrecognised system prompt".into()))?;
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(role);
        }
        match self.replies.get(role) {
            Some(Ok(text)) => Ok(LlmResponse::text(text.clone())),
            Some(Err(e)) => Err(e.clone()),
            None => Err(LlmError::InvalidResponse(format!("no script for {}", role))),
        }
    }
}

// =============================================================================
// Composition
// =============================================================================

/// Wrap `llm` in the retry executor with instant, recorded waits.
pub fn resilient(llm: Arc<dyn LlmPort>, sleeper: Arc<RecordingSleeper>) -> Arc<dyn LlmPort> {
    let executor = RetryExecutor::new(RetryConfig::default(), sleeper);
    Arc::new(ResilientLlmClient::with_executor(llm, executor))
}

/// App over `llm` with a fixed clock, nil ids and placeholder images.
pub fn app_with(llm: Arc<dyn LlmPort>) -> App {
    app_with_parts(
        llm,
        Arc::new(PlaceholderImageGen::new()),
        GenerationConfig::default(),
    )
}

pub fn app_with_parts(
    llm: Arc<dyn LlmPort>,
    image_gen: Arc<dyn ImageGenPort>,
    generation: GenerationConfig,
) -> App {
    App::with_ports(
        llm,
        image_gen,
        generation,
        Arc::new(FixedClock(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap())),
        Arc::new(FixedRandom(0.0)),
    )
}

pub fn pipeline_with(llm: Arc<dyn LlmPort>) -> Arc<StoryPipeline> {
    app_with(llm).use_cases.story.pipeline
}
