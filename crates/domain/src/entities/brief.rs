//! RefinedBrief entity - Output of the prompt refiner, input to the bible builder

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::PromptVersionId;

/// Default quality score used when refinement could not score the idea.
pub const DEFAULT_QUALITY_SCORE: u8 = 50;

/// Title used when refinement failed.
pub const DEGRADED_TITLE: &str = "เรื่องใหม่";

/// Changelog shown when refinement failed (network or quota trouble).
pub const DEGRADED_CHANGELOG: &str = "ระบบกำลังมีปัญหา (อาจเป็นที่อินเทอร์เน็ตหรือโควต้า)";

/// A character extracted from the idea before the bible exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedCharacter {
    pub name: String,
    pub role: String,
    pub traits: String,
    pub visual_signature: String,
}

/// A location extracted from the idea before the bible exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedLocation {
    pub name: String,
    pub description: String,
}

/// Characters, locations and world rules pulled out of the raw idea.
///
/// Field names follow the model wire format so the seed can be echoed back
/// verbatim into the bible builder's payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BibleSeed {
    pub target_age: String,
    pub genre: String,
    pub tone: String,
    pub main_characters: Vec<SeedCharacter>,
    pub locations: Vec<SeedLocation>,
    pub world_rules: Vec<String>,
}

impl BibleSeed {
    pub fn is_empty(&self) -> bool {
        self.main_characters.is_empty() && self.locations.is_empty() && self.world_rules.is_empty()
    }
}

/// Production-ready prompt plus the seed the bible builder expands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinedBrief {
    pub prompt: String,
    pub title: String,
    /// 0-100
    pub quality_score: u8,
    pub changelog: String,
    pub seed: BibleSeed,
}

impl RefinedBrief {
    pub fn new(
        prompt: impl Into<String>,
        title: impl Into<String>,
        quality_score: u8,
        changelog: impl Into<String>,
        seed: BibleSeed,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            title: title.into(),
            quality_score: quality_score.min(100),
            changelog: changelog.into(),
            seed,
        }
    }

    /// Degraded-but-valid brief used when refinement fails: the original
    /// prompt passes through untouched with an empty seed.
    pub fn degraded(original_prompt: impl Into<String>) -> Self {
        Self::new(
            original_prompt,
            DEGRADED_TITLE,
            DEFAULT_QUALITY_SCORE,
            DEGRADED_CHANGELOG,
            BibleSeed::default(),
        )
    }
}

/// One entry of a project's prompt refinement history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptVersion {
    pub id: PromptVersionId,
    pub created_at: DateTime<Utc>,
    pub original: String,
    pub refined: String,
    pub changes_summary: String,
    pub quality_score: u8,
    pub bible_seed: Option<BibleSeed>,
}

impl PromptVersion {
    pub fn from_brief(
        id: PromptVersionId,
        original: impl Into<String>,
        brief: &RefinedBrief,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            created_at: now,
            original: original.into(),
            refined: brief.prompt.clone(),
            changes_summary: brief.changelog.clone(),
            quality_score: brief.quality_score,
            bible_seed: (!brief.seed.is_empty()).then(|| brief.seed.clone()),
        }
    }

    /// Rebuild a brief from a stored version so it can skip refinement.
    pub fn to_brief(&self, title: impl Into<String>) -> RefinedBrief {
        RefinedBrief::new(
            self.refined.clone(),
            title,
            self.quality_score,
            self.changes_summary.clone(),
            self.bible_seed.clone().unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_brief_keeps_original_prompt() {
        let brief = RefinedBrief::degraded("a lost cat finds a lantern");
        assert_eq!(brief.prompt, "a lost cat finds a lantern");
        assert_eq!(brief.quality_score, DEFAULT_QUALITY_SCORE);
        assert!(brief.seed.is_empty());
    }

    #[test]
    fn quality_score_is_clamped() {
        let brief = RefinedBrief::new("p", "t", 250, "", BibleSeed::default());
        assert_eq!(brief.quality_score, 100);
    }

    #[test]
    fn seed_tolerates_missing_fields() {
        let seed: BibleSeed =
            serde_json::from_str(r#"{"main_characters":[{"name":"Mali"}]}"#).unwrap();
        assert_eq!(seed.main_characters[0].name, "Mali");
        assert!(seed.world_rules.is_empty());
    }

    #[test]
    fn version_round_trips_to_brief() {
        let brief = RefinedBrief::new("refined", "title", 80, "notes", BibleSeed::default());
        let version = PromptVersion::from_brief(PromptVersionId::new(), "raw", &brief, Utc::now());
        assert!(version.bible_seed.is_none());
        let rebuilt = version.to_brief("title");
        assert_eq!(rebuilt, brief);
    }
}
