//! PipelineResult entity - The terminal artifact of a successful run

use serde::{Deserialize, Serialize};

use super::{BibleSeed, StoryBible, Unit};

/// Layout and cover suggestions produced by the QA reviewer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportHints {
    pub layout: Option<String>,
    pub cover_idea: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    pub title: String,
    pub bible: StoryBible,
    /// Ordered by position, 1..=units.len()
    pub units: Vec<Unit>,
    pub refined_prompt: String,
    pub seed: BibleSeed,
    pub export_hints: ExportHints,
    /// Issues reported by the QA reviewer
    pub review_issues: Vec<String>,
    pub requested_unit_count: u32,
}

impl PipelineResult {
    /// How many requested units the draft writer did not produce.
    pub fn missing_unit_count(&self) -> u32 {
        self.requested_unit_count
            .saturating_sub(u32::try_from(self.units.len()).unwrap_or(u32::MAX))
    }

    pub fn is_complete(&self) -> bool {
        self.missing_unit_count() == 0
    }
}
