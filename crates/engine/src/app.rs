//! Application state and composition.

use std::sync::Arc;

use async_trait::async_trait;
use storyloom_domain::{ProductStrategy, TrendAnalysis};

use crate::infrastructure::{
    clock::{SystemClock, SystemRandom},
    gemini::GeminiClient,
    ollama::OllamaClient,
    ports::{
        ClockPort, ImageGenError, ImageGenPort, ImageRequest, ImageResult, LlmPort, RandomPort,
    },
    resilient_llm::{ResilientImageGen, ResilientLlmClient},
    settings::{EngineSettings, GenerationConfig, LlmProvider, SettingsError},
};
use crate::use_cases::analytics::{AnalyticsUseCases, ProductStrategist, TrendAnalyst};
use crate::use_cases::story::{
    BibleBuilder, DraftWriter, IllustrationDirector, ImageSynthesizer, PromptRefiner,
    QaReviewer, SoundDesigner, StoryPipeline, StoryUseCases, Translator, VoiceDirector,
};

/// Main application state.
///
/// Holds the model ports and every use case wired against them.
pub struct App {
    pub use_cases: UseCases,
    pub llm: Arc<dyn LlmPort>,
    pub image_gen: Arc<dyn ImageGenPort>,
}

/// Container for all use cases.
pub struct UseCases {
    pub story: StoryUseCases,
    pub analytics: AnalyticsUseCases,
}

impl App {
    /// Create a new App with system clock and randomness.
    pub fn new(
        llm: Arc<dyn LlmPort>,
        image_gen: Arc<dyn ImageGenPort>,
        generation: GenerationConfig,
    ) -> Self {
        Self::with_ports(
            llm,
            image_gen,
            generation,
            Arc::new(SystemClock::new()),
            Arc::new(SystemRandom::new()),
        )
    }

    pub fn with_ports(
        llm: Arc<dyn LlmPort>,
        image_gen: Arc<dyn ImageGenPort>,
        generation: GenerationConfig,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        let refiner = Arc::new(PromptRefiner::new(
            llm.clone(),
            generation.clone(),
            clock,
            random.clone(),
        ));
        let images = Arc::new(ImageSynthesizer::new(image_gen.clone(), generation.clone()));
        let reviewer = Arc::new(QaReviewer::new(llm.clone(), generation.clone()));

        let pipeline = Arc::new(StoryPipeline::new(
            refiner.clone(),
            Arc::new(BibleBuilder::new(llm.clone(), generation.clone(), random)),
            Arc::new(DraftWriter::new(llm.clone(), generation.clone())),
            Arc::new(IllustrationDirector::new(llm.clone(), generation.clone())),
            images.clone(),
            reviewer.clone(),
        )
        .with_image_synthesis(generation.render_images));

        let story = StoryUseCases {
            pipeline,
            refiner,
            images,
            reviewer,
            translator: Arc::new(Translator::new(llm.clone(), generation.clone())),
            voice: Arc::new(VoiceDirector::new(llm.clone(), generation.clone())),
            sound: Arc::new(SoundDesigner::new(llm.clone(), generation.clone())),
        };

        let analytics = AnalyticsUseCases::new(
            Arc::new(TrendAnalyst::new(llm.clone(), generation.clone())),
            Arc::new(ProductStrategist::new(llm.clone(), generation)),
        );

        Self {
            use_cases: UseCases { story, analytics },
            llm,
            image_gen,
        }
    }

    /// Build the configured provider clients, wrapped in the retry executor.
    pub fn from_settings(settings: &EngineSettings) -> Result<Self, SettingsError> {
        let (llm, image_gen): (Arc<dyn LlmPort>, Arc<dyn ImageGenPort>) = match settings.provider
        {
            LlmProvider::Gemini => {
                let api_key = settings
                    .gemini_api_key
                    .as_deref()
                    .ok_or(SettingsError::MissingApiKey)?;
                let client = Arc::new(
                    GeminiClient::new(&settings.gemini_base_url, api_key).with_models(
                        &settings.generation.fast_model,
                        &settings.generation.image_model,
                    ),
                );
                (
                    Arc::new(ResilientLlmClient::new(client.clone(), settings.retry.clone())),
                    Arc::new(ResilientImageGen::new(client, settings.retry.clone())),
                )
            }
            LlmProvider::Ollama => {
                let client = Arc::new(OllamaClient::new(
                    &settings.ollama_base_url,
                    &settings.ollama_model,
                ));
                (
                    Arc::new(ResilientLlmClient::new(client, settings.retry.clone())),
                    Arc::new(NoImageBackend),
                )
            }
        };

        tracing::info!(
            provider = ?settings.provider,
            max_attempts = settings.retry.max_attempts,
            base_delay_ms = settings.retry.base_delay_ms,
            "Model clients configured"
        );
        Ok(Self::new(llm, image_gen, settings.generation.clone()))
    }

    /// Trend digest and feature strategy for the dashboard. Never fails.
    pub async fn dashboard(&self) -> (TrendAnalysis, ProductStrategy) {
        self.use_cases.analytics.dashboard().await
    }
}

/// Image port for providers without an image model.
struct NoImageBackend;

#[async_trait]
impl ImageGenPort for NoImageBackend {
    async fn generate(&self, _request: ImageRequest) -> Result<ImageResult, ImageGenError> {
        Err(ImageGenError::NoImage)
    }
}
