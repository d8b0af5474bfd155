//! On-demand audio direction for a single unit: voice script and soundscape.

use std::sync::Arc;

use serde::Deserialize;
use storyloom_domain::{
    AgeBracket, CinematicAudioScript, LanguageMode, MixGuidelines, SafetyLevel, StoryBible,
    UnitSoundDesign,
};

use super::prompts::{self, SoundBrief};
use super::sanitizer::{self, StageRecord};
use super::{invoke, Stage, StageError};
use crate::infrastructure::ports::{ChatMessage, LlmPort, LlmRequest};
use crate::infrastructure::settings::GenerationConfig;

/// Floor for the scene duration hint given to the sound designer.
const MIN_SCENE_SECONDS: f32 = 30.0;

#[derive(Debug, Deserialize)]
struct VoiceRecord {
    audio_script: Vec<CinematicAudioScript>,
    #[serde(default)]
    qc_rules: Vec<String>,
}

impl StageRecord for VoiceRecord {}

#[derive(Debug, Deserialize)]
struct SoundRecord {
    sound_cues: Vec<UnitSoundDesign>,
    #[serde(default)]
    mix_guidelines: Option<MixGuidelines>,
}

impl StageRecord for SoundRecord {}

pub struct VoiceDirector {
    llm: Arc<dyn LlmPort>,
    models: GenerationConfig,
}

impl VoiceDirector {
    pub fn new(llm: Arc<dyn LlmPort>, models: GenerationConfig) -> Self {
        Self { llm, models }
    }

    pub async fn script(
        &self,
        content: &str,
        bible: &StoryBible,
        language_mode: LanguageMode,
        age: AgeBracket,
        unit_no: u32,
    ) -> Result<CinematicAudioScript, StageError> {
        let mut cast = vec!["Narrator (Standard)"];
        cast.extend(bible.character_names());

        let request = LlmRequest::new(vec![ChatMessage::user(format!(
            "Unit Text: \"{}\"",
            content
        ))])
        .with_system_prompt(prompts::voice(age, &cast.join(", "), language_mode, unit_no))
        .with_model(&self.models.fast_model)
        .json();

        let raw = invoke(self.llm.as_ref(), Stage::Voice, request).await?;
        let record = sanitizer::parse::<VoiceRecord>(&raw).map_err(|e| {
            tracing::warn!(error = %e, original = %raw, "Unusable voice script output");
            StageError::malformed(Stage::Voice, e)
        })?;

        if !record.qc_rules.is_empty() {
            tracing::debug!(rules = ?record.qc_rules, "Voice QC rules");
        }

        match record.audio_script.into_iter().find(|s| s.unit_no == unit_no) {
            Some(script) => Ok(script),
            None => {
                tracing::warn!(unit_no, "Voice script missing for unit");
                Ok(CinematicAudioScript::empty(unit_no))
            }
        }
    }
}

pub struct SoundDesigner {
    llm: Arc<dyn LlmPort>,
    models: GenerationConfig,
}

impl SoundDesigner {
    pub fn new(llm: Arc<dyn LlmPort>, models: GenerationConfig) -> Self {
        Self { llm, models }
    }

    pub fn duration_hint(script: Option<&CinematicAudioScript>) -> f32 {
        script
            .and_then(CinematicAudioScript::longest_track_sec)
            .map_or(MIN_SCENE_SECONDS, |s| s.max(MIN_SCENE_SECONDS))
    }

    pub fn intensity_limit(safety: SafetyLevel) -> &'static str {
        match safety {
            SafetyLevel::Strict => "low",
            SafetyLevel::Moderate | SafetyLevel::Open => "medium",
        }
    }

    pub async fn design(
        &self,
        content: &str,
        image_prompt: &str,
        audio_script: Option<&CinematicAudioScript>,
        age: AgeBracket,
        unit_no: u32,
        safety: SafetyLevel,
    ) -> Result<UnitSoundDesign, StageError> {
        let brief = SoundBrief {
            content,
            image_prompt,
            age,
            duration_sec: Self::duration_hint(audio_script),
            intensity: Self::intensity_limit(safety),
            unit_no,
        };

        let request = LlmRequest::new(vec![ChatMessage::user(
            "Analyze this scene for sound design.",
        )])
        .with_system_prompt(prompts::sound(&brief))
        .with_model(&self.models.fast_model)
        .json();

        let raw = invoke(self.llm.as_ref(), Stage::Sound, request).await?;
        let record = sanitizer::parse::<SoundRecord>(&raw).map_err(|e| {
            tracing::warn!(error = %e, original = %raw, "Unusable sound design output");
            StageError::malformed(Stage::Sound, e)
        })?;

        let SoundRecord {
            sound_cues,
            mix_guidelines,
        } = record;
        match sound_cues.into_iter().find(|d| d.unit_no == unit_no) {
            Some(mut design) => {
                if design.mix_guidelines.is_none() {
                    design.mix_guidelines = mix_guidelines;
                }
                Ok(design)
            }
            None => {
                tracing::warn!(unit_no, "Sound design missing for unit");
                Ok(UnitSoundDesign::missing(unit_no))
            }
        }
    }
}
