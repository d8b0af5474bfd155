//! Stage 1: turn a raw idea into a production prompt plus bible seed.
//!
//! Never fails. Transport errors and unusable output both degrade to a
//! brief that passes the original idea through untouched.

use std::sync::Arc;

use serde::Deserialize;
use storyloom_domain::{
    BibleSeed, IdeaSeed, PromptVersion, PromptVersionId, RefinedBrief, DEFAULT_QUALITY_SCORE,
};

use super::sanitizer::{self, StageRecord};
use super::{invoke, prompts, Stage};
use crate::infrastructure::ports::{ChatMessage, ClockPort, LlmPort, LlmRequest, RandomPort};
use crate::infrastructure::settings::GenerationConfig;

const UNTITLED: &str = "Untitled Story";
const DEFAULT_CHANGELOG: &str = "ปรับปรุงคำสั่งให้ชัดเจนและปลอดภัยแล้วครับ";

#[derive(Debug, Deserialize)]
struct RefineRecord {
    quality_score_0_100: Option<f64>,
    #[serde(default)]
    detected_intent: Option<String>,
    title: Option<String>,
    production_prompt: Option<String>,
    #[serde(default)]
    story_bible_seed: BibleSeed,
    #[serde(default)]
    auto_fix_notes: Vec<String>,
}

impl StageRecord for RefineRecord {
    fn validate(&self) -> Result<(), String> {
        match &self.production_prompt {
            Some(p) if !p.trim().is_empty() => Ok(()),
            _ => Err("production_prompt is missing".to_string()),
        }
    }
}

impl RefineRecord {
    fn into_brief(self, original: &str) -> RefinedBrief {
        let score = self
            .quality_score_0_100
            .map(|s| s.clamp(0.0, 100.0).round() as u8)
            .unwrap_or(DEFAULT_QUALITY_SCORE);
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| UNTITLED.to_string());
        let changelog = if self.auto_fix_notes.is_empty() {
            DEFAULT_CHANGELOG.to_string()
        } else {
            self.auto_fix_notes.join(". ")
        };

        RefinedBrief::new(
            self.production_prompt
                .unwrap_or_else(|| original.to_string()),
            title,
            score,
            changelog,
            self.story_bible_seed,
        )
    }
}

pub struct PromptRefiner {
    llm: Arc<dyn LlmPort>,
    models: GenerationConfig,
    clock: Arc<dyn ClockPort>,
    random: Arc<dyn RandomPort>,
}

impl PromptRefiner {
    pub fn new(
        llm: Arc<dyn LlmPort>,
        models: GenerationConfig,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        Self {
            llm,
            models,
            clock,
            random,
        }
    }

    pub async fn refine(&self, idea: &IdeaSeed) -> RefinedBrief {
        let settings = idea.settings();
        let request = LlmRequest::new(vec![ChatMessage::user(format!(
            "Raw Idea: \"{}\"",
            idea.prompt()
        ))])
        .with_system_prompt(prompts::refine(settings.age, settings.mode, settings.safety))
        .with_model(&self.models.fast_model)
        .json();

        let raw = match invoke(self.llm.as_ref(), Stage::Refine, request).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "Prompt refinement unavailable, passing idea through");
                return RefinedBrief::degraded(idea.prompt());
            }
        };

        match sanitizer::parse::<RefineRecord>(&raw) {
            Ok(record) => {
                tracing::debug!(
                    intent = record.detected_intent.as_deref().unwrap_or(""),
                    "Prompt refined"
                );
                let brief = record.into_brief(idea.prompt());
                tracing::info!(
                    quality_score = brief.quality_score,
                    title = %brief.title,
                    "Refined brief ready"
                );
                brief
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    original = %raw,
                    "Unusable refinement output, passing idea through"
                );
                RefinedBrief::degraded(idea.prompt())
            }
        }
    }

    /// Refine and record the result as a prompt history entry.
    pub async fn refine_versioned(&self, idea: &IdeaSeed) -> (RefinedBrief, PromptVersion) {
        let brief = self.refine(idea).await;
        let version = PromptVersion::from_brief(
            PromptVersionId::from_uuid(self.random.gen_uuid()),
            idea.prompt(),
            &brief,
            self.clock.now(),
        );
        (brief, version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::{FixedClock, FixedRandom};
    use crate::infrastructure::ports::{LlmError, LlmResponse, MockLlmPort};
    use chrono::{TimeZone, Utc};
    use storyloom_domain::{PipelineSettings, DEGRADED_CHANGELOG, DEGRADED_TITLE};

    fn idea() -> IdeaSeed {
        IdeaSeed::new("a lost cat finds a lantern", PipelineSettings::default()).unwrap()
    }

    fn refiner(mock: MockLlmPort) -> PromptRefiner {
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap());
        PromptRefiner::new(
            Arc::new(mock),
            GenerationConfig::default(),
            Arc::new(clock),
            Arc::new(FixedRandom(0.0)),
        )
    }

    #[tokio::test]
    async fn parses_refinement_record() {
        let mut mock = MockLlmPort::new();
        mock.expect_generate()
            .withf(|req| {
                req.json_mode
                    && req.model.as_deref() == Some("gemini-3-flash-preview")
                    && req
                        .system_prompt
                        .as_deref()
                        .is_some_and(|s| s.contains(prompts::REFINER_ROLE))
            })
            .returning(|_| {
                Ok(LlmResponse::text(
                    r#"```json
{"quality_score_0_100": 82.4, "title": "แมวหลงทางกับตะเกียง", "production_prompt": "A 3-scene picture book about Miso the cat",
 "story_bible_seed": {"tone": "warm", "main_characters": [{"name": "Miso", "role": "hero"}]},
 "auto_fix_notes": ["เพิ่มฉาก", "ปรับภาษา"]}
```"#,
                ))
            });

        let brief = refiner(mock).refine(&idea()).await;

        assert_eq!(brief.prompt, "A 3-scene picture book about Miso the cat");
        assert_eq!(brief.quality_score, 82);
        assert_eq!(brief.changelog, "เพิ่มฉาก. ปรับภาษา");
        assert_eq!(brief.seed.main_characters[0].name, "Miso");
    }

    #[tokio::test]
    async fn malformed_output_degrades() {
        let mut mock = MockLlmPort::new();
        mock.expect_generate()
            .returning(|_| Ok(LlmResponse::text("Sorry, I can't do JSON today.")));

        let brief = refiner(mock).refine(&idea()).await;

        assert_eq!(brief.prompt, "a lost cat finds a lantern");
        assert_eq!(brief.title, DEGRADED_TITLE);
        assert_eq!(brief.changelog, DEGRADED_CHANGELOG);
        assert_eq!(brief.quality_score, 50);
        assert!(brief.seed.is_empty());
    }

    #[tokio::test]
    async fn quota_failure_degrades() {
        let mut mock = MockLlmPort::new();
        mock.expect_generate().times(1).returning(|_| {
            Err(LlmError::Api {
                status: 429,
                message: "RESOURCE_EXHAUSTED".into(),
            })
        });

        let brief = refiner(mock).refine(&idea()).await;
        assert_eq!(brief, RefinedBrief::degraded("a lost cat finds a lantern"));
    }

    #[tokio::test]
    async fn missing_optional_fields_use_defaults() {
        let mut mock = MockLlmPort::new();
        mock.expect_generate()
            .returning(|_| Ok(LlmResponse::text(r#"{"production_prompt": "refined"}"#)));

        let brief = refiner(mock).refine(&idea()).await;

        assert_eq!(brief.title, UNTITLED);
        assert_eq!(brief.quality_score, DEFAULT_QUALITY_SCORE);
        assert_eq!(brief.changelog, DEFAULT_CHANGELOG);
    }

    #[tokio::test]
    async fn versioned_refinement_uses_injected_clock_and_ids() {
        let mut mock = MockLlmPort::new();
        mock.expect_generate()
            .returning(|_| Ok(LlmResponse::text(r#"{"production_prompt": "refined"}"#)));

        let (brief, version) = refiner(mock).refine_versioned(&idea()).await;

        assert_eq!(version.original, "a lost cat finds a lantern");
        assert_eq!(version.refined, brief.prompt);
        assert_eq!(version.id, PromptVersionId::from_uuid(uuid::Uuid::nil()));
        assert_eq!(
            version.created_at,
            Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()
        );
    }
}
