//! Dashboard analytics records - trend digest and feature strategy
//!
//! Field names mirror the model wire format.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendItem {
    pub rank: u32,
    pub title: String,
    pub why_popular: String,
    pub recommended_for_age: Vec<String>,
    pub prompt_starter: String,
    pub safety_note: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoNotRecommend {
    pub tag: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendAnalysis {
    pub trend_digest: Vec<TrendItem>,
    pub do_not_recommend: Vec<DoNotRecommend>,
    pub update_frequency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureCategory {
    Engagement,
    Social,
    #[serde(rename = "Creator Tools")]
    CreatorTools,
    #[serde(rename = "Safety/Parents")]
    SafetyParents,
    #[serde(rename = "Learning/Edu")]
    LearningEdu,
    Monetization,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effort {
    S,
    M,
    L,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRecommendation {
    pub name: String,
    pub category: FeatureCategory,
    pub impact: String,
    pub effort: Effort,
    pub why: String,
    pub risk_control: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductStrategy {
    pub top_features: Vec<FeatureRecommendation>,
}
