//! Storyloom domain: story settings, briefs, bibles, units and results.
//!
//! Pure data plus invariants. No I/O lives here.

pub mod entities;
pub mod error;
pub mod ids;
pub mod types;
pub mod value_objects;

pub use entities::{
    BibleSeed, CinematicAudioScript, Character, DoNotRecommend, Effort, Energy, ExportHints,
    FeatureCategory, FeatureRecommendation, IdeaSeed, ImageRef, Location, MixGuidelines,
    PipelineResult, PipelineSettings, PlotSpine, ProductStrategy, PromptVersion,
    PronunciationEntry, RefinedBrief, SeedCharacter, SeedLocation, SfxCue, SoundEffect,
    SoundLayer, StoryBible, StyleGuide, TrendAnalysis, TrendItem, Unit, UnitSoundDesign,
    VoiceStyle, VoiceTrack, DEFAULT_QUALITY_SCORE, DEGRADED_CHANGELOG, DEGRADED_TITLE,
};
pub use error::DomainError;
pub use ids::{CharacterId, LocationId, PromptVersionId, UnitId};
pub use types::{AgeBracket, LanguageMode, SafetyLevel, StoryMode};
pub use value_objects::ConsistencyTokens;
