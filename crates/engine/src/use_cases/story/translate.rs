//! On-demand translation of unit content, glossary-bound.

use std::sync::Arc;

use storyloom_domain::{AgeBracket, StoryBible, Unit};

use super::sanitizer::strip_fences;
use super::{invoke, prompts, to_json, Stage, StageError};
use crate::infrastructure::ports::{ChatMessage, LlmPort, LlmRequest};
use crate::infrastructure::settings::GenerationConfig;

pub struct Translator {
    llm: Arc<dyn LlmPort>,
    models: GenerationConfig,
}

impl Translator {
    pub fn new(llm: Arc<dyn LlmPort>, models: GenerationConfig) -> Self {
        Self { llm, models }
    }

    /// Free-text translation. Markdown structure is preserved by the model;
    /// only surrounding fences are removed here.
    pub async fn translate(
        &self,
        content: &str,
        bible: &StoryBible,
        age: AgeBracket,
    ) -> Result<String, StageError> {
        let request = LlmRequest::new(vec![ChatMessage::user(content)])
            .with_system_prompt(prompts::translate(age, &to_json(bible.glossary())))
            .with_model(&self.models.fast_model);

        let raw = invoke(self.llm.as_ref(), Stage::Translate, request).await?;
        let text = strip_fences(&raw);
        if text.trim().is_empty() {
            return Err(StageError::failed(Stage::Translate, "empty translation"));
        }
        Ok(text.trim().to_string())
    }

    pub async fn translate_unit(
        &self,
        unit: &mut Unit,
        bible: &StoryBible,
        age: AgeBracket,
    ) -> Result<(), StageError> {
        let translation = self.translate(&unit.content, bible, age).await?;
        unit.translation = Some(translation);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{LlmResponse, MockLlmPort};

    fn bible() -> StoryBible {
        let glossary = [("มิโซะ".to_string(), "Miso".to_string())].into_iter().collect();
        StoryBible::new(
            vec![],
            vec![],
            Default::default(),
            Default::default(),
            Default::default(),
            glossary,
        )
    }

    #[tokio::test]
    async fn sends_glossary_and_stores_translation() {
        let mut mock = MockLlmPort::new();
        mock.expect_generate()
            .withf(|req| {
                !req.json_mode
                    && req
                        .system_prompt
                        .as_deref()
                        .is_some_and(|s| s.contains(r#"{"มิโซะ":"Miso"}"#))
            })
            .returning(|_| Ok(LlmResponse::text("## Lost\n\nMiso is lost.\n")));
        let translator = Translator::new(Arc::new(mock), GenerationConfig::default());

        let mut unit = Unit::new(1, "## หลงทาง\n\nมิโซะหลงทาง");
        translator
            .translate_unit(&mut unit, &bible(), AgeBracket::MiddleYears)
            .await
            .unwrap();

        assert_eq!(unit.translation.as_deref(), Some("## Lost\n\nMiso is lost."));
    }

    #[tokio::test]
    async fn empty_reply_is_failure() {
        let mut mock = MockLlmPort::new();
        mock.expect_generate()
            .returning(|_| Ok(LlmResponse::text("  \n")));
        let translator = Translator::new(Arc::new(mock), GenerationConfig::default());

        let err = translator
            .translate("text", &bible(), AgeBracket::MiddleYears)
            .await
            .unwrap_err();

        assert!(matches!(err, StageError::Failed { stage: Stage::Translate, .. }));
    }
}
