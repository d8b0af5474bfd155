//! Stage 4: one image prompt per unit, with consistency tokens enforced.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use storyloom_domain::{SafetyLevel, StoryBible, Unit};

use super::sanitizer::{self, StageRecord};
use super::{invoke, prompts, to_json, Stage, StageError};
use crate::infrastructure::ports::{ChatMessage, LlmPort, LlmRequest};
use crate::infrastructure::settings::GenerationConfig;

const NO_TOKENS_HINT: &str = "Use consistent characters.";

/// Image direction for one unit, as returned by both the illustration and
/// review stages.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub(super) struct ImageDirection {
    pub unit_no: u32,
    pub image_prompt: String,
    pub negative_prompt: Option<String>,
    pub alt_text_th: Option<String>,
}

impl ImageDirection {
    /// Write this direction into `unit`, repairing missing tokens. A blank
    /// prompt leaves the unit untouched.
    pub fn apply_to(&self, unit: &mut Unit, bible: &StoryBible) -> bool {
        if self.image_prompt.trim().is_empty() {
            return false;
        }
        unit.illustration_prompt = bible.consistency().enforce(&self.image_prompt);
        if self.negative_prompt.is_some() {
            unit.negative_prompt = self.negative_prompt.clone();
        }
        if self.alt_text_th.is_some() {
            unit.alt_text = self.alt_text_th.clone();
        }
        true
    }
}

#[derive(Debug, Deserialize)]
struct IllustrationRecord {
    images: Vec<ImageDirection>,
}

impl StageRecord for IllustrationRecord {}

pub struct IllustrationDirector {
    llm: Arc<dyn LlmPort>,
    models: GenerationConfig,
}

impl IllustrationDirector {
    pub fn new(llm: Arc<dyn LlmPort>, models: GenerationConfig) -> Self {
        Self { llm, models }
    }

    /// Attach image prompts to `units`. The first direction for a position
    /// wins; units with no usable direction keep an empty prompt.
    pub async fn direct(
        &self,
        mut units: Vec<Unit>,
        bible: &StoryBible,
        safety: SafetyLevel,
    ) -> Result<Vec<Unit>, StageError> {
        let payload: Vec<_> = units
            .iter()
            .map(|u| json!({"unit_no": u.position(), "content": u.content}))
            .collect();
        let tokens = if bible.consistency().is_empty() {
            NO_TOKENS_HINT.to_string()
        } else {
            to_json(bible.consistency())
        };

        let request = LlmRequest::new(vec![ChatMessage::user(format!(
            "Units: {}\nTokens: {}",
            to_json(&payload),
            tokens
        ))])
        .with_system_prompt(prompts::illustrate(safety))
        .with_model(&self.models.fast_model)
        .json();

        let raw = invoke(self.llm.as_ref(), Stage::Illustrate, request).await?;
        let record = sanitizer::parse::<IllustrationRecord>(&raw).map_err(|e| {
            tracing::warn!(error = %e, original = %raw, "Unusable illustration output");
            StageError::malformed(Stage::Illustrate, e)
        })?;

        let mut directed = 0usize;
        for unit in units.iter_mut() {
            let direction = record
                .images
                .iter()
                .find(|d| d.unit_no == unit.position());
            if let Some(direction) = direction {
                if direction.apply_to(unit, bible) {
                    directed += 1;
                }
            }
        }

        if directed < units.len() {
            tracing::warn!(
                directed,
                units = units.len(),
                "Some units received no image prompt"
            );
        }
        Ok(units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{LlmResponse, MockLlmPort};
    use storyloom_domain::ConsistencyTokens;

    fn bible() -> StoryBible {
        let mut tokens = ConsistencyTokens::default();
        tokens
            .character_tokens
            .insert("Miso".into(), "orange tabby cat with red scarf".into());
        tokens.global_style_tokens.push("soft watercolor".into());
        StoryBible::new(
            vec![],
            vec![],
            Default::default(),
            Default::default(),
            tokens,
            Default::default(),
        )
    }

    fn director(reply: &'static str) -> IllustrationDirector {
        let mut mock = MockLlmPort::new();
        mock.expect_generate()
            .withf(|req| {
                req.messages[0].content.contains("orange tabby cat with red scarf")
                    && req.messages[0].content.contains("\"unit_no\":1")
            })
            .returning(move |_| Ok(LlmResponse::text(reply)));
        IllustrationDirector::new(Arc::new(mock), GenerationConfig::default())
    }

    #[tokio::test]
    async fn enforces_tokens_on_prompts() {
        let units = vec![Unit::new(1, "Miso walks"), Unit::new(2, "Miso sleeps")];
        let units = director(
            r#"{"images": [
                {"unit_no": 2, "image_prompt": "Miso asleep, soft watercolor", "alt_text_th": "มิโซะหลับ"},
                {"unit_no": 1, "image_prompt": "Miso on a street", "negative_prompt": "scary"}
            ]}"#,
        )
        .direct(units, &bible(), SafetyLevel::Strict)
        .await
        .unwrap();

        assert_eq!(
            units[0].illustration_prompt,
            "Miso on a street, orange tabby cat with red scarf, soft watercolor"
        );
        assert_eq!(units[0].negative_prompt.as_deref(), Some("scary"));
        assert!(units[1]
            .illustration_prompt
            .contains("orange tabby cat with red scarf"));
        assert_eq!(units[1].alt_text.as_deref(), Some("มิโซะหลับ"));
        for unit in &units {
            assert!(bible().consistency().missing_from(&unit.illustration_prompt).is_empty());
        }
    }

    #[tokio::test]
    async fn first_direction_wins_and_blank_is_ignored() {
        let units = vec![Unit::new(1, "Miso walks"), Unit::new(2, "quiet night")];
        let units = director(
            r#"{"images": [
                {"unit_no": 1, "image_prompt": "first"},
                {"unit_no": 1, "image_prompt": "second"},
                {"unit_no": 2, "image_prompt": "  "}
            ]}"#,
        )
        .direct(units, &bible(), SafetyLevel::Strict)
        .await
        .unwrap();

        assert!(units[0].illustration_prompt.starts_with("first"));
        assert!(!units[1].has_illustration_prompt());
    }
}
