//! Unit entity - One sequence-positioned chunk of a story (scene/page/panel)
//!
//! Units are created in order by the draft writer and enriched in place by
//! later stages. Position never changes once assigned.

use serde::{Deserialize, Serialize};

use crate::UnitId;

/// Reference to a generated image (a `data:` URL or remote URL).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    /// Build a `data:` URL from base64 payload and MIME type.
    pub fn data_url(media_type: &str, base64_data: &str) -> Self {
        Self(format!("data:{};base64,{}", media_type, base64_data))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: UnitId,
    /// 1-based, contiguous within a story
    position: u32,
    /// Primary-language narrative (Markdown)
    pub content: String,
    /// Secondary-language translation of `content`
    pub translation: Option<String>,
    pub illustration_prompt: String,
    pub negative_prompt: Option<String>,
    /// Accessibility description of the illustration
    pub alt_text: Option<String>,
    pub image: Option<ImageRef>,
    pub audio_script: Option<CinematicAudioScript>,
    pub sound_design: Option<UnitSoundDesign>,
}

impl Unit {
    pub fn new(position: u32, content: impl Into<String>) -> Self {
        Self {
            id: UnitId::new(),
            position,
            content: content.into(),
            translation: None,
            illustration_prompt: String::new(),
            negative_prompt: None,
            alt_text: None,
            image: None,
            audio_script: None,
            sound_design: None,
        }
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn has_illustration_prompt(&self) -> bool {
        !self.illustration_prompt.trim().is_empty()
    }

    /// Markdown body: heading, narrative paragraph, then one bullet per
    /// dialogue line.
    pub fn compose_content(title: &str, text: &str, dialogue: &[String]) -> String {
        let lines = dialogue
            .iter()
            .map(|line| format!("- {}", line))
            .collect::<Vec<_>>()
            .join("\n");
        format!("## {}\n\n{}\n\n{}", title, text, lines)
    }
}

// =============================================================================
// Audio
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Energy {
    Low,
    #[default]
    Medium,
    High,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceStyle {
    /// e.g. "warm", "excited", "whisper"
    pub emotion: String,
    pub pace_wpm: u32,
    pub energy: Energy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceTrack {
    /// e.g. "TH_NARRATOR", "EN_CHARACTER_1"
    pub track_id: String,
    pub speaker: String,
    pub style: VoiceStyle,
    /// `<speak>...</speak>`
    pub ssml: String,
    pub timing_hint_sec: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PronunciationEntry {
    pub word: String,
    pub ipa: String,
    pub note: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SfxCue {
    pub description: String,
    pub timestamp: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CinematicAudioScript {
    pub unit_no: u32,
    pub tracks: Vec<VoiceTrack>,
    pub pronunciation_lexicon: Vec<PronunciationEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sfx_cues: Vec<SfxCue>,
}

impl CinematicAudioScript {
    pub fn empty(unit_no: u32) -> Self {
        Self {
            unit_no,
            ..Self::default()
        }
    }

    /// Longest track timing hint, in seconds.
    pub fn longest_track_sec(&self) -> Option<f32> {
        self.tracks
            .iter()
            .map(|t| t.timing_hint_sec)
            .fold(None, |acc, t| Some(acc.map_or(t, |a: f32| a.max(t))))
    }
}

// =============================================================================
// Sound design
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundLayer {
    /// e.g. "forest_day", "gentle_adventure"
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    /// e.g. "0s"
    pub start: String,
    pub end: String,
    pub mix_db: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundEffect {
    pub name: String,
    /// e.g. "6s"
    pub at: String,
    pub mix_db: f32,
    pub note: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixGuidelines {
    pub dialogue_priority: String,
    pub max_sfx_per_minute: u32,
    pub ducking_when_speaking_db: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitSoundDesign {
    pub unit_no: u32,
    pub ambience: Vec<SoundLayer>,
    pub bgm: Vec<SoundLayer>,
    pub sfx: Vec<SoundEffect>,
    /// "pass" / "fail", or "error" when no design came back
    pub safety_check: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mix_guidelines: Option<MixGuidelines>,
}

impl UnitSoundDesign {
    /// Placeholder returned when the designer produced nothing for a unit.
    pub fn missing(unit_no: u32) -> Self {
        Self {
            unit_no,
            safety_check: "error".to_string(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_content_formats_markdown() {
        let content = Unit::compose_content(
            "The Lantern",
            "Miso found a glowing lantern.",
            &["Hello?".to_string(), "Who's there?".to_string()],
        );
        assert_eq!(
            content,
            "## The Lantern\n\nMiso found a glowing lantern.\n\n- Hello?\n- Who's there?"
        );
    }

    #[test]
    fn new_unit_has_no_illustration() {
        let unit = Unit::new(2, "text");
        assert_eq!(unit.position(), 2);
        assert!(!unit.has_illustration_prompt());
        assert!(unit.image.is_none());
    }

    #[test]
    fn longest_track_picks_maximum() {
        let mut script = CinematicAudioScript::empty(1);
        assert_eq!(script.longest_track_sec(), None);
        for secs in [12.0, 41.5, 30.0] {
            script.tracks.push(VoiceTrack {
                timing_hint_sec: secs,
                ..VoiceTrack::default()
            });
        }
        assert_eq!(script.longest_track_sec(), Some(41.5));
    }

    #[test]
    fn unknown_energy_is_tolerated() {
        let style: VoiceStyle =
            serde_json::from_str(r#"{"emotion":"warm","pace_wpm":140,"energy":"explosive"}"#)
                .unwrap();
        assert_eq!(style.energy, Energy::Unknown);
    }

    #[test]
    fn sound_layer_reads_type_field() {
        let layer: SoundLayer =
            serde_json::from_str(r#"{"type":"forest_day","start":"0s","end":"28s","mix_db":-18}"#)
                .unwrap();
        assert_eq!(layer.kind, "forest_day");
        assert_eq!(layer.mix_db, -18.0);
    }
}
