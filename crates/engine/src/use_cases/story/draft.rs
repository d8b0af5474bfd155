//! Stage 3: write the unit texts from the bible's plot spine.

use std::sync::Arc;

use serde::Deserialize;
use storyloom_domain::{SafetyLevel, StoryBible, StoryMode, Unit};

use super::sanitizer::{self, StageRecord};
use super::{invoke, prompts, to_json, Stage, StageError};
use crate::infrastructure::ports::{ChatMessage, LlmPort, LlmRequest};
use crate::infrastructure::settings::GenerationConfig;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DraftUnit {
    title: String,
    text: String,
    dialogue: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DraftRecord {
    units: Vec<DraftUnit>,
}

impl StageRecord for DraftRecord {
    fn validate(&self) -> Result<(), String> {
        if self.units.is_empty() {
            Err("draft contains no units".to_string())
        } else {
            Ok(())
        }
    }
}

pub struct DraftWriter {
    llm: Arc<dyn LlmPort>,
    models: GenerationConfig,
}

impl DraftWriter {
    pub fn new(llm: Arc<dyn LlmPort>, models: GenerationConfig) -> Self {
        Self { llm, models }
    }

    /// Units come back numbered 1..=n in draft order. Surplus units are
    /// dropped; a short draft is kept as-is.
    pub async fn write(
        &self,
        prompt: &str,
        count: u32,
        bible: &StoryBible,
        mode: StoryMode,
        safety: SafetyLevel,
    ) -> Result<Vec<Unit>, StageError> {
        let request = LlmRequest::new(vec![ChatMessage::user(format!(
            "Refined Request: \"{}\"\nBible: {}",
            prompt,
            to_json(bible)
        ))])
        .with_system_prompt(prompts::draft(
            count,
            mode,
            safety,
            &to_json(bible.plot_spine()),
        ))
        .with_model(&self.models.creative_model)
        .json();

        let raw = invoke(self.llm.as_ref(), Stage::Draft, request).await?;
        let record = sanitizer::parse::<DraftRecord>(&raw).map_err(|e| {
            tracing::warn!(error = %e, original = %raw, "Unusable draft output");
            StageError::malformed(Stage::Draft, e)
        })?;

        let produced = record.units.len();
        if produced > count as usize {
            tracing::debug!(produced, requested = count, "Dropping surplus draft units");
        } else if produced < count as usize {
            tracing::warn!(produced, requested = count, "Draft is shorter than requested");
        }

        let units = record
            .units
            .into_iter()
            .take(count as usize)
            .zip(1u32..)
            .map(|(u, position)| {
                Unit::new(position, Unit::compose_content(&u.title, &u.text, &u.dialogue))
            })
            .collect();
        Ok(units)
    }
}
