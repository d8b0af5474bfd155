//! Story generation pipeline.
//!
//! Six typed stages (refine, bible, draft, illustrate, image, review)
//! sequenced by [`StoryPipeline`], plus the on-demand per-unit stages
//! (translate, voice, sound) the shell calls after a run.

mod audio;
mod bible;
mod draft;
mod error;
mod illustrate;
mod image;
mod orchestrator;
pub mod prompts;
mod refine;
mod review;
pub mod sanitizer;
mod translate;

use std::sync::Arc;

pub use audio::{SoundDesigner, VoiceDirector};
pub use bible::BibleBuilder;
pub use draft::DraftWriter;
pub use error::{
    PipelineError, Stage, StageError, GENERIC_USER_MESSAGE, QUOTA_USER_MESSAGE,
};
pub use illustrate::IllustrationDirector;
pub use image::ImageSynthesizer;
pub use orchestrator::{PipelineProgress, StoryPipeline};
pub use refine::PromptRefiner;
pub use review::{QaReviewer, ReviewDisposition, ReviewReport};
pub use translate::Translator;

use crate::infrastructure::ports::{LlmPort, LlmRequest};

/// Container for story use cases.
pub struct StoryUseCases {
    pub pipeline: Arc<StoryPipeline>,
    pub refiner: Arc<PromptRefiner>,
    pub images: Arc<ImageSynthesizer>,
    pub reviewer: Arc<QaReviewer>,
    pub translator: Arc<Translator>,
    pub voice: Arc<VoiceDirector>,
    pub sound: Arc<SoundDesigner>,
}

/// One model call on behalf of `stage`, mapped into the stage taxonomy.
async fn invoke(llm: &dyn LlmPort, stage: Stage, request: LlmRequest) -> Result<String, StageError> {
    tracing::debug!(stage = %stage, "Invoking model");
    match llm.generate(request).await {
        Ok(response) => Ok(response.content),
        Err(e) => {
            let error = StageError::from_llm(stage, e);
            tracing::warn!(stage = %stage, error = %error, "Model call failed");
            Err(error)
        }
    }
}

/// Serialize a payload fragment for a prompt.
fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}
