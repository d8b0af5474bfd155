//! Domain entities

mod analytics;
mod bible;
mod brief;
mod idea;
mod pipeline_result;
mod unit;

pub use analytics::{
    DoNotRecommend, Effort, FeatureCategory, FeatureRecommendation, ProductStrategy,
    TrendAnalysis, TrendItem,
};
pub use bible::{Character, Location, PlotSpine, StoryBible, StyleGuide};
pub use brief::{
    BibleSeed, PromptVersion, RefinedBrief, SeedCharacter, SeedLocation, DEFAULT_QUALITY_SCORE,
    DEGRADED_CHANGELOG, DEGRADED_TITLE,
};
pub use idea::{IdeaSeed, PipelineSettings};
pub use pipeline_result::{ExportHints, PipelineResult};
pub use unit::{
    CinematicAudioScript, Energy, ImageRef, MixGuidelines, PronunciationEntry, SfxCue,
    SoundEffect, SoundLayer, Unit, UnitSoundDesign, VoiceStyle, VoiceTrack,
};
