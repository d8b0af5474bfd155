//! Dashboard generators: trend digest and feature strategy.
//!
//! Both are best effort. Any failure, quota or otherwise, returns the
//! static dataset in [`fallback`] unchanged.

pub mod fallback;

use std::sync::Arc;

use serde_json::json;
use storyloom_domain::{ProductStrategy, TrendAnalysis};

use crate::infrastructure::ports::{ChatMessage, LlmPort, LlmRequest};
use crate::infrastructure::settings::GenerationConfig;
use crate::use_cases::story::sanitizer::{self, StageRecord};
use crate::use_cases::story::{prompts, Stage};

pub use fallback::{fallback_strategy, fallback_trends, FALLBACK_UPDATE_FREQUENCY};

impl StageRecord for TrendAnalysis {
    fn validate(&self) -> Result<(), String> {
        if self.trend_digest.is_empty() {
            Err("trend digest is empty".to_string())
        } else {
            Ok(())
        }
    }
}

impl StageRecord for ProductStrategy {
    fn validate(&self) -> Result<(), String> {
        if self.top_features.is_empty() {
            Err("no features recommended".to_string())
        } else {
            Ok(())
        }
    }
}

/// Platform metrics the trend analyst reasons over.
fn platform_metrics() -> serde_json::Value {
    json!({
        "total_reads_last_24h": 4500,
        "top_tags": ["โรงเรียนเวทมนตร์", "แมวจอมป่วน", "ทำอาหาร", "สืบสวนจิ๋ว"],
        "completion_rate_by_genre": {"Fantasy": 85, "Sci-Fi": 70, "SliceOfLife": 92},
        "avg_read_time": "3 mins",
    })
}

/// Call the model and parse `T`, or hand back `fallback`.
async fn generate_or<T: StageRecord>(
    llm: &dyn LlmPort,
    stage: Stage,
    request: LlmRequest,
    fallback: impl FnOnce() -> T,
) -> T {
    let raw = match llm.generate(request).await {
        Ok(response) => response.content,
        Err(e) if e.is_quota() => {
            tracing::info!(stage = %stage, "Using fallback (quota exceeded)");
            return fallback();
        }
        Err(e) => {
            tracing::warn!(stage = %stage, error = %e, "Generation failed, using fallback");
            return fallback();
        }
    };
    sanitizer::parse_or(&raw, fallback(), stage.name())
}

pub struct TrendAnalyst {
    llm: Arc<dyn LlmPort>,
    models: GenerationConfig,
}

impl TrendAnalyst {
    pub fn new(llm: Arc<dyn LlmPort>, models: GenerationConfig) -> Self {
        Self { llm, models }
    }

    pub async fn analyze(&self) -> TrendAnalysis {
        let metrics = platform_metrics().to_string();
        let request = LlmRequest::new(vec![ChatMessage::user("Analyze current trends.")])
            .with_system_prompt(prompts::trends(&metrics))
            .with_model(&self.models.fast_model)
            .json();
        generate_or(self.llm.as_ref(), Stage::Trends, request, fallback_trends).await
    }
}

pub struct ProductStrategist {
    llm: Arc<dyn LlmPort>,
    models: GenerationConfig,
}

impl ProductStrategist {
    pub fn new(llm: Arc<dyn LlmPort>, models: GenerationConfig) -> Self {
        Self { llm, models }
    }

    pub async fn recommend(&self) -> ProductStrategy {
        let request =
            LlmRequest::new(vec![ChatMessage::user("Generate feature strategy roadmap.")])
                .with_system_prompt(prompts::strategy())
                .with_model(&self.models.fast_model)
                .json();
        generate_or(self.llm.as_ref(), Stage::Strategy, request, fallback_strategy).await
    }
}

/// Container for dashboard use cases.
pub struct AnalyticsUseCases {
    pub trends: Arc<TrendAnalyst>,
    pub strategy: Arc<ProductStrategist>,
}

impl AnalyticsUseCases {
    pub fn new(trends: Arc<TrendAnalyst>, strategy: Arc<ProductStrategist>) -> Self {
        Self { trends, strategy }
    }

    /// Both generators, concurrently.
    pub async fn dashboard(&self) -> (TrendAnalysis, ProductStrategy) {
        tokio::join!(self.trends.analyze(), self.strategy.recommend())
    }
}
