//! Stage 6: QA and safety review with position-keyed fix merging.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use storyloom_domain::{AgeBracket, ExportHints, SafetyLevel, StoryBible, Unit};

use super::illustrate::ImageDirection;
use super::sanitizer::{self, StageRecord};
use super::{invoke, prompts, to_json, Stage, StageError};
use crate::infrastructure::ports::{ChatMessage, LlmPort, LlmRequest};
use crate::infrastructure::settings::GenerationConfig;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FixedUnit {
    unit_no: u32,
    title: String,
    text: String,
    dialogue: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ExportHintsRecord {
    pdf_layout: Option<String>,
    cover_idea: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReviewRecord {
    issues: Option<Vec<String>>,
    fixed_units: Option<Vec<FixedUnit>>,
    fixed_images: Option<Vec<ImageDirection>>,
    export_hints: Option<ExportHintsRecord>,
}

impl StageRecord for ReviewRecord {
    fn validate(&self) -> Result<(), String> {
        if self.issues.is_none()
            && self.fixed_units.is_none()
            && self.fixed_images.is_none()
            && self.export_hints.is_none()
        {
            Err("review record has none of the expected fields".to_string())
        } else {
            Ok(())
        }
    }
}

/// How the review's issue list relates to the fixes it returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDisposition {
    /// Nothing reported, nothing changed.
    NoIssues,
    /// At least one fix was merged.
    AutoFixed,
    /// Issues were reported without any fix records.
    AcknowledgedUnfixed,
}

#[derive(Debug, Clone)]
pub struct ReviewReport {
    pub issues: Vec<String>,
    pub units: Vec<Unit>,
    pub export_hints: ExportHints,
    pub disposition: ReviewDisposition,
    /// Fix records that named a position no unit holds.
    pub unmatched_fix_positions: Vec<u32>,
}

pub struct QaReviewer {
    llm: Arc<dyn LlmPort>,
    models: GenerationConfig,
}

impl QaReviewer {
    pub fn new(llm: Arc<dyn LlmPort>, models: GenerationConfig) -> Self {
        Self { llm, models }
    }

    pub async fn review(
        &self,
        units: Vec<Unit>,
        bible: &StoryBible,
        age: AgeBracket,
        safety: SafetyLevel,
    ) -> Result<ReviewReport, StageError> {
        if units.is_empty() {
            return Err(StageError::failed(Stage::Review, "no units to review"));
        }

        let context = json!({
            "bible": {
                "characters": bible
                    .characters()
                    .iter()
                    .map(|c| json!({"name": c.name, "visualTrait": c.visual_trait}))
                    .collect::<Vec<_>>(),
            },
            "units": units
                .iter()
                .map(|u| json!({
                    "unit_no": u.position(),
                    "content": u.content,
                    "image_prompt": u.illustration_prompt,
                }))
                .collect::<Vec<_>>(),
        });

        let request = LlmRequest::new(vec![ChatMessage::user(to_json(&context))])
            .with_system_prompt(prompts::review(age, safety))
            .with_model(&self.models.fast_model)
            .json();

        let raw = invoke(self.llm.as_ref(), Stage::Review, request).await?;
        let record = sanitizer::parse::<ReviewRecord>(&raw).map_err(|e| {
            tracing::warn!(error = %e, original = %raw, "Unusable review output");
            StageError::malformed(Stage::Review, e)
        })?;

        let report = merge(units, bible, record);
        if !report.unmatched_fix_positions.is_empty() {
            tracing::warn!(
                positions = ?report.unmatched_fix_positions,
                "Review returned fixes for positions no unit holds"
            );
        }
        tracing::info!(
            issues = report.issues.len(),
            disposition = ?report.disposition,
            "Review complete"
        );
        Ok(report)
    }
}

fn merge(mut units: Vec<Unit>, bible: &StoryBible, record: ReviewRecord) -> ReviewReport {
    let issues = record.issues.unwrap_or_default();
    let fixed_units = record.fixed_units.unwrap_or_default();
    let fixed_images = record.fixed_images.unwrap_or_default();

    // First record per position wins, matching the illustration stage.
    let mut applied = 0usize;
    for unit in units.iter_mut() {
        let position = unit.position();
        if let Some(fix) = fixed_units.iter().find(|f| f.unit_no == position) {
            if !fix.text.trim().is_empty() {
                unit.content = Unit::compose_content(&fix.title, &fix.text, &fix.dialogue);
                applied += 1;
            }
        }
        if let Some(fix) = fixed_images.iter().find(|f| f.unit_no == position) {
            if fix.apply_to(unit, bible) {
                applied += 1;
            }
        }
    }

    let mut unmatched: Vec<u32> = fixed_units
        .iter()
        .map(|f| f.unit_no)
        .chain(fixed_images.iter().map(|f| f.unit_no))
        .filter(|n| !units.iter().any(|u| u.position() == *n))
        .collect();
    unmatched.sort_unstable();
    unmatched.dedup();

    let disposition = if applied > 0 {
        ReviewDisposition::AutoFixed
    } else if issues.is_empty() {
        ReviewDisposition::NoIssues
    } else {
        ReviewDisposition::AcknowledgedUnfixed
    };

    let hints = record.export_hints.unwrap_or_default();
    ReviewReport {
        issues,
        units,
        export_hints: ExportHints {
            layout: hints.pdf_layout,
            cover_idea: hints.cover_idea,
        },
        disposition,
        unmatched_fix_positions: unmatched,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{LlmError, LlmResponse, MockLlmPort};
    use storyloom_domain::ConsistencyTokens;

    fn bible() -> StoryBible {
        let mut tokens = ConsistencyTokens::default();
        tokens.character_tokens.insert("Miso".into(), "orange tabby".into());
        StoryBible::new(
            vec![],
            vec![],
            Default::default(),
            Default::default(),
            tokens,
            Default::default(),
        )
    }

    fn units() -> Vec<Unit> {
        (1..=3)
            .map(|n| {
                let mut unit = Unit::new(n, format!("unit {}", n));
                unit.illustration_prompt = format!("scene {}", n);
                unit
            })
            .collect()
    }

    fn reviewer(reply: &'static str) -> QaReviewer {
        let mut mock = MockLlmPort::new();
        mock.expect_generate()
            .returning(move |_| Ok(LlmResponse::text(reply)));
        QaReviewer::new(Arc::new(mock), GenerationConfig::default())
    }

    #[tokio::test]
    async fn fixes_only_touch_their_position() {
        let before = units();
        let report = reviewer(
            r#"{"issues": ["ชื่อไม่ตรง"],
                "fixed_units": [{"unit_no": 3, "title": "แก้", "text": "Miso returns", "dialogue": []}],
                "fixed_images": [{"unit_no": 3, "image_prompt": "Miso at home", "alt_text_th": "บ้าน"}],
                "export_hints": {"pdf_layout": "square", "cover_idea": "lantern"}}"#,
        )
        .review(before.clone(), &bible(), AgeBracket::MiddleYears, SafetyLevel::Strict)
        .await
        .unwrap();

        assert_eq!(report.units[0], before[0]);
        assert_eq!(report.units[1], before[1]);
        assert_eq!(report.units[2].content, "## แก้\n\nMiso returns\n\n");
        assert_eq!(report.units[2].illustration_prompt, "Miso at home, orange tabby");
        assert_eq!(report.units[2].alt_text.as_deref(), Some("บ้าน"));
        assert_eq!(report.disposition, ReviewDisposition::AutoFixed);
        assert_eq!(report.export_hints.layout.as_deref(), Some("square"));
        assert!(report.unmatched_fix_positions.is_empty());
    }

    #[tokio::test]
    async fn empty_issue_list_is_terminal() {
        let before = units();
        let report = reviewer(r#"{"issues": [], "fixed_units": []}"#)
            .review(before.clone(), &bible(), AgeBracket::PreTeen, SafetyLevel::Moderate)
            .await
            .unwrap();

        assert_eq!(report.disposition, ReviewDisposition::NoIssues);
        assert_eq!(report.units, before);
    }

    #[tokio::test]
    async fn issues_without_fixes_are_acknowledged() {
        let report = reviewer(r#"{"issues": ["ภาพไม่ตรงกับเนื้อเรื่อง"]}"#)
            .review(units(), &bible(), AgeBracket::PreTeen, SafetyLevel::Moderate)
            .await
            .unwrap();

        assert_eq!(report.disposition, ReviewDisposition::AcknowledgedUnfixed);
        assert_eq!(report.issues.len(), 1);
    }

    #[tokio::test]
    async fn unmatched_positions_are_reported() {
        let before = units();
        let report = reviewer(
            r#"{"issues": ["x"], "fixed_units": [{"unit_no": 9, "title": "t", "text": "ghost"}],
                "fixed_images": [{"unit_no": 9, "image_prompt": "ghost"}]}"#,
        )
        .review(before.clone(), &bible(), AgeBracket::PreTeen, SafetyLevel::Moderate)
        .await
        .unwrap();

        assert_eq!(report.unmatched_fix_positions, vec![9]);
        assert_eq!(report.units, before);
        assert_eq!(report.disposition, ReviewDisposition::AcknowledgedUnfixed);
    }

    #[tokio::test]
    async fn first_fix_for_a_position_wins() {
        let report = reviewer(
            r#"{"issues": ["x"],
                "fixed_units": [{"unit_no": 2, "title": "a", "text": "first"},
                                {"unit_no": 2, "title": "b", "text": "second"}],
                "fixed_images": [{"unit_no": 2, "image_prompt": "first scene"},
                                 {"unit_no": 2, "image_prompt": "second scene"}]}"#,
        )
        .review(units(), &bible(), AgeBracket::PreTeen, SafetyLevel::Moderate)
        .await
        .unwrap();

        assert_eq!(report.units[1].content, "## a\n\nfirst\n\n");
        assert_eq!(report.units[1].illustration_prompt, "first scene");
        assert!(report.unmatched_fix_positions.is_empty());
    }

    #[tokio::test]
    async fn transport_failure_is_stage_error() {
        let mut mock = MockLlmPort::new();
        mock.expect_generate()
            .returning(|_| Err(LlmError::RequestFailed("connection reset".into())));
        let reviewer = QaReviewer::new(Arc::new(mock), GenerationConfig::default());

        let err = reviewer
            .review(units(), &bible(), AgeBracket::PreTeen, SafetyLevel::Open)
            .await
            .unwrap_err();

        assert_eq!(err.stage(), Stage::Review);
    }

    #[tokio::test]
    async fn no_units_is_stage_error() {
        let err = reviewer("{}")
            .review(vec![], &bible(), AgeBracket::PreTeen, SafetyLevel::Open)
            .await
            .unwrap_err();
        assert!(matches!(err, StageError::Failed { stage: Stage::Review, .. }));
    }
}
