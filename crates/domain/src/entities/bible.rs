//! StoryBible entity - The canonical consistency record for one story
//!
//! Built once by the bible builder and read-only afterwards. Entity IDs are
//! minted at construction and never reused.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value_objects::ConsistencyTokens;
use crate::{CharacterId, LocationId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub role: String,
    /// Narrative description shown to the reader
    pub description: String,
    /// Visual trait string for image generation
    pub visual_trait: String,
    pub personality: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub description: String,
    pub visual_style: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotSpine {
    pub start: String,
    pub middle: String,
    pub end: String,
    pub theme: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lesson: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleGuide {
    pub art_style: String,
    pub palette: Option<String>,
    pub lighting: Option<String>,
    pub tone: String,
}

impl Default for StyleGuide {
    fn default() -> Self {
        Self {
            art_style: "Digital Illustration".to_string(),
            palette: None,
            lighting: None,
            tone: "Fun".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryBible {
    characters: Vec<Character>,
    locations: Vec<Location>,
    plot_spine: PlotSpine,
    style: StyleGuide,
    consistency: ConsistencyTokens,
    /// Proper noun -> secondary-language rendering
    glossary: BTreeMap<String, String>,
}

impl StoryBible {
    pub fn new(
        characters: Vec<Character>,
        locations: Vec<Location>,
        plot_spine: PlotSpine,
        style: StyleGuide,
        consistency: ConsistencyTokens,
        glossary: BTreeMap<String, String>,
    ) -> Self {
        Self {
            characters,
            locations,
            plot_spine,
            style,
            consistency,
            glossary,
        }
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn plot_spine(&self) -> &PlotSpine {
        &self.plot_spine
    }

    pub fn style(&self) -> &StyleGuide {
        &self.style
    }

    pub fn consistency(&self) -> &ConsistencyTokens {
        &self.consistency
    }

    pub fn glossary(&self) -> &BTreeMap<String, String> {
        &self.glossary
    }

    /// Character names joined for voice casting and prompts.
    pub fn character_names(&self) -> Vec<&str> {
        self.characters.iter().map(|c| c.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bible() -> StoryBible {
        StoryBible::new(
            vec![Character {
                id: CharacterId::new(),
                name: "Miso".to_string(),
                role: "Protagonist".to_string(),
                description: "A small grey cat".to_string(),
                visual_trait: "grey cat with a red collar".to_string(),
                personality: "curious".to_string(),
            }],
            vec![],
            PlotSpine::default(),
            StyleGuide::default(),
            ConsistencyTokens::default(),
            BTreeMap::new(),
        )
    }

    #[test]
    fn character_names_follow_sheet_order() {
        let bible = bible();
        assert_eq!(bible.character_names(), vec!["Miso"]);
    }

    #[test]
    fn style_guide_defaults() {
        let style = StyleGuide::default();
        assert_eq!(style.art_style, "Digital Illustration");
        assert_eq!(style.tone, "Fun");
    }
}
