//! Linear sequencing of the story stages.
//!
//! refine -> bible -> draft -> illustrate -> review, with optional image
//! synthesis once prompts are final. Each stage consumes the previous
//! stage's typed output. Refinement degrades instead of failing, image
//! synthesis is best effort, and any other stage failure aborts the run
//! without exposing partial output.

use std::sync::Arc;

use storyloom_domain::{IdeaSeed, PipelineResult, PipelineSettings, RefinedBrief};

use super::{
    BibleBuilder, DraftWriter, IllustrationDirector, ImageSynthesizer, PipelineError,
    PromptRefiner, QaReviewer, Stage,
};

const UNTITLED: &str = "Untitled";

/// One milestone, emitted when a stage is entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineProgress {
    pub stage: Stage,
    /// 1-based position in this run's sequence
    pub step: u8,
    pub message: &'static str,
}

impl PipelineProgress {
    fn milestone(stage: Stage, step: u8) -> Self {
        let message = match stage {
            Stage::Refine => "กำลังเกลาไอเดีย + เช็คความปลอดภัย...",
            Stage::Bible => "กำลังสร้างคัมภีร์ข้อมูลเรื่อง (Story Bible)...",
            Stage::Draft => "AI กำลังแต่งเนื้อเรื่องภาษาไทย...",
            Stage::Illustrate => "ผู้กำกับกำลังวางมุมกล้องและภาพประกอบ...",
            Stage::Review => "ตรวจทานความเรียบร้อยขั้นตอนสุดท้าย...",
            Stage::Image => "กำลังวาดภาพประกอบ...",
            _ => "",
        };
        Self {
            stage,
            step,
            message,
        }
    }
}

pub struct StoryPipeline {
    refiner: Arc<PromptRefiner>,
    bible_builder: Arc<BibleBuilder>,
    writer: Arc<DraftWriter>,
    illustrator: Arc<IllustrationDirector>,
    images: Arc<ImageSynthesizer>,
    reviewer: Arc<QaReviewer>,
    synthesize_images: bool,
}

impl StoryPipeline {
    pub fn new(
        refiner: Arc<PromptRefiner>,
        bible_builder: Arc<BibleBuilder>,
        writer: Arc<DraftWriter>,
        illustrator: Arc<IllustrationDirector>,
        images: Arc<ImageSynthesizer>,
        reviewer: Arc<QaReviewer>,
    ) -> Self {
        Self {
            refiner,
            bible_builder,
            writer,
            illustrator,
            images,
            reviewer,
            synthesize_images: false,
        }
    }

    /// Render images after review. Off by default; the shell usually
    /// renders on demand per unit.
    pub fn with_image_synthesis(mut self, enabled: bool) -> Self {
        self.synthesize_images = enabled;
        self
    }

    pub async fn run(
        &self,
        prompt: &str,
        settings: PipelineSettings,
        pre_refined: Option<RefinedBrief>,
        on_progress: impl Fn(PipelineProgress) + Send + Sync,
    ) -> Result<PipelineResult, PipelineError> {
        let mut step = 0u8;
        let mut enter = |stage: Stage| {
            step += 1;
            tracing::info!(stage = %stage, step, "Entering pipeline stage");
            on_progress(PipelineProgress::milestone(stage, step));
        };

        let brief = match pre_refined {
            Some(brief) => {
                // The raw prompt is unused here, so only the settings are checked.
                settings.validate()?;
                tracing::debug!("Using pre-refined brief, skipping refinement");
                brief
            }
            None => {
                let idea = IdeaSeed::new(prompt, settings)?;
                enter(Stage::Refine);
                self.refiner.refine(&idea).await
            }
        };

        enter(Stage::Bible);
        let bible = self.bible_builder.build(&brief, &settings).await?;

        enter(Stage::Draft);
        let units = self
            .writer
            .write(&brief.prompt, settings.count, &bible, settings.mode, settings.safety)
            .await?;

        enter(Stage::Illustrate);
        let units = self
            .illustrator
            .direct(units, &bible, settings.safety)
            .await?;

        enter(Stage::Review);
        let report = self
            .reviewer
            .review(units, &bible, settings.age, settings.safety)
            .await?;
        let mut units = report.units;

        if self.synthesize_images {
            enter(Stage::Image);
            self.images.synthesize_all(&mut units).await;
        }

        let title = if brief.title.trim().is_empty() {
            UNTITLED.to_string()
        } else {
            brief.title
        };

        let result = PipelineResult {
            title,
            bible,
            units,
            refined_prompt: brief.prompt,
            seed: brief.seed,
            export_hints: report.export_hints,
            review_issues: report.issues,
            requested_unit_count: settings.count,
        };

        if !result.is_complete() {
            tracing::warn!(
                missing = result.missing_unit_count(),
                "Pipeline finished with fewer units than requested"
            );
        }
        tracing::info!(title = %result.title, units = result.units.len(), "Pipeline complete");
        Ok(result)
    }
}
