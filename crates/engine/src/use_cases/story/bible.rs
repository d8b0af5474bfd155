//! Stage 2: build the story bible and mint consistency tokens.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use storyloom_domain::{
    Character, CharacterId, ConsistencyTokens, Location, LocationId, PipelineSettings, PlotSpine,
    RefinedBrief, StoryBible, StyleGuide,
};

use super::sanitizer::{self, StageRecord};
use super::{invoke, prompts, to_json, Stage, StageError};
use crate::infrastructure::ports::{ChatMessage, LlmPort, LlmRequest, RandomPort};
use crate::infrastructure::settings::GenerationConfig;

const DEFAULT_TONE: &str = "Fun";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CharacterRecord {
    name: String,
    role: String,
    description: String,
    #[serde(rename = "visualTrait", alias = "visual_trait")]
    visual_trait: String,
    personality: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LocationRecord {
    name: String,
    description: String,
    #[serde(rename = "visualStyle", alias = "visual_style")]
    visual_style: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StyleRecord {
    art_style: Option<String>,
    palette: Option<String>,
    lighting: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BibleBody {
    #[serde(default)]
    characters: Vec<CharacterRecord>,
    #[serde(default)]
    locations: Vec<LocationRecord>,
    #[serde(default)]
    plot_spine: PlotSpine,
    #[serde(default)]
    style_guide: StyleRecord,
}

#[derive(Debug, Deserialize)]
struct BibleRecord {
    bible: BibleBody,
    #[serde(default)]
    consistency_tokens: ConsistencyTokens,
    #[serde(default)]
    glossary: BTreeMap<String, String>,
}

impl StageRecord for BibleRecord {
    fn validate(&self) -> Result<(), String> {
        if self.bible.characters.iter().any(|c| !c.name.trim().is_empty()) {
            Ok(())
        } else {
            Err("bible has no named characters".to_string())
        }
    }
}

pub struct BibleBuilder {
    llm: Arc<dyn LlmPort>,
    models: GenerationConfig,
    random: Arc<dyn RandomPort>,
}

impl BibleBuilder {
    pub fn new(llm: Arc<dyn LlmPort>, models: GenerationConfig, random: Arc<dyn RandomPort>) -> Self {
        Self { llm, models, random }
    }

    pub async fn build(
        &self,
        brief: &RefinedBrief,
        settings: &PipelineSettings,
    ) -> Result<StoryBible, StageError> {
        let target_age = if brief.seed.target_age.trim().is_empty() {
            settings.age.label().to_string()
        } else {
            brief.seed.target_age.clone()
        };

        let request = LlmRequest::new(vec![ChatMessage::user(format!(
            "Refined Prompt: \"{}\"\nBible Seed: {}",
            brief.prompt,
            to_json(&brief.seed)
        ))])
        .with_system_prompt(prompts::bible(&target_age, settings.safety))
        .with_model(&self.models.fast_model)
        .json();

        let raw = invoke(self.llm.as_ref(), Stage::Bible, request).await?;
        let record = sanitizer::parse::<BibleRecord>(&raw).map_err(|e| {
            tracing::warn!(error = %e, original = %raw, "Unusable story bible output");
            StageError::malformed(Stage::Bible, e)
        })?;

        let tone = if brief.seed.tone.trim().is_empty() {
            DEFAULT_TONE.to_string()
        } else {
            brief.seed.tone.clone()
        };
        let bible = self.assemble(record, tone);

        tracing::info!(
            characters = bible.characters().len(),
            locations = bible.locations().len(),
            tokens = !bible.consistency().is_empty(),
            "Story bible built"
        );
        Ok(bible)
    }

    fn assemble(&self, record: BibleRecord, tone: String) -> StoryBible {
        let BibleRecord {
            bible,
            consistency_tokens,
            glossary,
        } = record;

        let characters = bible
            .characters
            .into_iter()
            .filter(|c| !c.name.trim().is_empty())
            .map(|c| Character {
                id: CharacterId::from_uuid(self.random.gen_uuid()),
                name: c.name,
                role: c.role,
                description: c.description,
                visual_trait: c.visual_trait,
                personality: c.personality,
            })
            .collect();

        let locations = bible
            .locations
            .into_iter()
            .filter(|l| !l.name.trim().is_empty())
            .map(|l| Location {
                id: LocationId::from_uuid(self.random.gen_uuid()),
                name: l.name,
                description: l.description,
                visual_style: l.visual_style,
            })
            .collect();

        let defaults = StyleGuide::default();
        let style = StyleGuide {
            art_style: bible
                .style_guide
                .art_style
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.art_style),
            palette: bible.style_guide.palette,
            lighting: bible.style_guide.lighting,
            tone,
        };

        StoryBible::new(
            characters,
            locations,
            bible.plot_spine,
            style,
            consistency_tokens,
            glossary,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedRandom;
    use crate::infrastructure::ports::{LlmError, LlmResponse, MockLlmPort};
    use storyloom_domain::BibleSeed;

    const BIBLE_JSON: &str = r#"Here is the bible:
{"bible": {
   "characters": [{"name": "Miso", "role": "hero", "description": "แมวส้มขี้สงสัย", "visualTrait": "orange tabby, red scarf", "personality": "curious"},
                  {"name": "", "role": "ghost"}],
   "locations": [{"name": "Lantern Market", "description": "ตลาดกลางคืน", "visualStyle": "warm paper lanterns"}],
   "plot_spine": {"start": "lost", "middle": "search", "end": "home", "theme": "courage", "lesson": "ask for help"},
   "style_guide": {"art_style": "Watercolor", "palette": "amber"}
 },
 "consistency_tokens": {"character_tokens": {"Miso": "orange tabby cat with red scarf"}, "global_style_tokens": ["soft watercolor"]},
 "glossary": {"มิโซะ": "Miso"}}"#;

    fn builder(mock: MockLlmPort) -> BibleBuilder {
        BibleBuilder::new(
            Arc::new(mock),
            GenerationConfig::default(),
            Arc::new(FixedRandom(0.0)),
        )
    }

    fn brief(tone: &str) -> RefinedBrief {
        let seed = BibleSeed {
            tone: tone.to_string(),
            ..BibleSeed::default()
        };
        RefinedBrief::new("A cat named Miso", "Miso", 80, "", seed)
    }

    #[tokio::test]
    async fn builds_bible_with_tokens() {
        let mut mock = MockLlmPort::new();
        mock.expect_generate()
            .withf(|req| {
                req.system_prompt
                    .as_deref()
                    .is_some_and(|s| s.contains("readers aged 6-8"))
            })
            .returning(|_| Ok(LlmResponse::text(BIBLE_JSON)));

        let bible = builder(mock)
            .build(&brief(""), &PipelineSettings::default())
            .await
            .unwrap();

        assert_eq!(bible.character_names(), vec!["Miso"]);
        assert_eq!(bible.characters()[0].visual_trait, "orange tabby, red scarf");
        assert_eq!(bible.locations()[0].visual_style, "warm paper lanterns");
        assert_eq!(bible.style().art_style, "Watercolor");
        assert_eq!(bible.style().tone, DEFAULT_TONE);
        assert_eq!(bible.plot_spine().lesson.as_deref(), Some("ask for help"));
        assert_eq!(
            bible.consistency().character_tokens.get("Miso").map(String::as_str),
            Some("orange tabby cat with red scarf")
        );
        assert_eq!(bible.glossary().get("มิโซะ").map(String::as_str), Some("Miso"));
    }

    #[tokio::test]
    async fn seed_tone_carries_into_style() {
        let mut mock = MockLlmPort::new();
        mock.expect_generate()
            .returning(|_| Ok(LlmResponse::text(BIBLE_JSON)));

        let bible = builder(mock)
            .build(&brief("Cozy"), &PipelineSettings::default())
            .await
            .unwrap();

        assert_eq!(bible.style().tone, "Cozy");
    }

    #[tokio::test]
    async fn bible_without_characters_is_failure() {
        let mut mock = MockLlmPort::new();
        mock.expect_generate().returning(|_| {
            Ok(LlmResponse::text(r#"{"bible": {"characters": [], "locations": []}}"#))
        });

        let err = builder(mock)
            .build(&brief(""), &PipelineSettings::default())
            .await
            .unwrap_err();

        assert!(matches!(err, StageError::Failed { stage: Stage::Bible, .. }));
    }

    #[tokio::test]
    async fn quota_propagates() {
        let mut mock = MockLlmPort::new();
        mock.expect_generate()
            .times(1)
            .returning(|_| Err(LlmError::QuotaExceeded("429".into())));

        let err = builder(mock)
            .build(&brief(""), &PipelineSettings::default())
            .await
            .unwrap_err();

        assert!(err.is_quota());
        assert_eq!(err.stage(), Stage::Bible);
    }
}
