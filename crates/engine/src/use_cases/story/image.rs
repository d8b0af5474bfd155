//! Stage 5: render image prompts to pictures.
//!
//! Best effort. A failed render leaves the unit without an image and
//! never fails the run.

use std::sync::Arc;

use futures_util::future::join_all;
use storyloom_domain::{ImageRef, Unit};

use crate::infrastructure::ports::{ImageGenPort, ImageRequest};
use crate::infrastructure::settings::GenerationConfig;

pub struct ImageSynthesizer {
    image_gen: Arc<dyn ImageGenPort>,
    models: GenerationConfig,
}

impl ImageSynthesizer {
    pub fn new(image_gen: Arc<dyn ImageGenPort>, models: GenerationConfig) -> Self {
        Self { image_gen, models }
    }

    /// Final prompt sent to the image model, negative prompt appended.
    pub fn compose_prompt(prompt: &str, negative: Option<&str>) -> String {
        match negative.map(str::trim).filter(|n| !n.is_empty()) {
            Some(negative) => format!("{}\n\n(NO: {})", prompt, negative),
            None => prompt.to_string(),
        }
    }

    pub async fn synthesize(&self, prompt: &str, negative: Option<&str>) -> Option<ImageRef> {
        if prompt.trim().is_empty() {
            return None;
        }
        let request = ImageRequest::new(Self::compose_prompt(prompt, negative))
            .with_model(&self.models.image_model);

        match self.image_gen.generate(request).await {
            Ok(result) => Some(result.to_image_ref()),
            Err(e) => {
                tracing::warn!(error = %e, "Image generation failed");
                None
            }
        }
    }

    /// Render every unit that has a prompt, concurrently. Returns how many
    /// images were produced.
    pub async fn synthesize_all(&self, units: &mut [Unit]) -> usize {
        let renders = units.iter_mut().map(|unit| async move {
            if !unit.has_illustration_prompt() {
                return false;
            }
            let image = self
                .synthesize(&unit.illustration_prompt, unit.negative_prompt.as_deref())
                .await;
            let rendered = image.is_some();
            unit.image = image;
            rendered
        });
        let rendered = join_all(renders).await.into_iter().filter(|r| *r).count();
        tracing::info!(rendered, units = units.len(), "Batch image synthesis complete");
        rendered
    }
}
