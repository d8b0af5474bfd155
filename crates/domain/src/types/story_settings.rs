//! Enumerated story settings chosen before a pipeline run.
//!
//! Parsing is lenient about case and separators because these values arrive
//! from form inputs and from model output alike.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Narrative mode of the story being produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoryMode {
    #[default]
    PictureBook,
    Novel,
    Comic,
    NonFiction,
    CinematicRealism,
}

impl StoryMode {
    /// Wire name used inside model instructions.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryMode::PictureBook => "PICTURE_BOOK",
            StoryMode::Novel => "NOVEL",
            StoryMode::Comic => "COMIC",
            StoryMode::NonFiction => "NON_FICTION",
            StoryMode::CinematicRealism => "CINEMATIC_REALISM",
        }
    }
}

impl fmt::Display for StoryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoryMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "picture_book" | "picturebook" => Ok(StoryMode::PictureBook),
            "novel" => Ok(StoryMode::Novel),
            "comic" => Ok(StoryMode::Comic),
            "non_fiction" | "nonfiction" => Ok(StoryMode::NonFiction),
            "cinematic_realism" | "cinematic" => Ok(StoryMode::CinematicRealism),
            other => Err(DomainError::parse(format!("unknown story mode '{}'", other))),
        }
    }
}

/// Content safety tier applied to every generation stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SafetyLevel {
    /// Kids under ten
    #[default]
    Strict,
    /// Teens 10-15
    Moderate,
    /// Young adults 16+
    Open,
}

impl SafetyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SafetyLevel::Strict => "STRICT",
            SafetyLevel::Moderate => "MODERATE",
            SafetyLevel::Open => "OPEN",
        }
    }
}

impl fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SafetyLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "strict" => Ok(SafetyLevel::Strict),
            "moderate" => Ok(SafetyLevel::Moderate),
            "open" => Ok(SafetyLevel::Open),
            other => Err(DomainError::parse(format!("unknown safety level '{}'", other))),
        }
    }
}

/// Target reader age bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgeBracket {
    /// 3-5
    EarlyYears,
    /// 6-8
    #[default]
    MiddleYears,
    /// 9-12
    PreTeen,
    /// 13+
    YoungAdult,
}

impl AgeBracket {
    /// Range label as shown to readers and embedded in prompts.
    pub fn label(&self) -> &'static str {
        match self {
            AgeBracket::EarlyYears => "3-5",
            AgeBracket::MiddleYears => "6-8",
            AgeBracket::PreTeen => "9-12",
            AgeBracket::YoungAdult => "13+",
        }
    }
}

impl fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AgeBracket {
    type Err = DomainError;

    /// Accepts the bare range ("6-8") or the range followed by a caption
    /// ("6-8 (Middle Gen)").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let head = s.trim().split_whitespace().next().unwrap_or_default();
        match head {
            "3-5" => Ok(AgeBracket::EarlyYears),
            "6-8" => Ok(AgeBracket::MiddleYears),
            "9-12" => Ok(AgeBracket::PreTeen),
            "13+" | "teens" | "Teens" => Ok(AgeBracket::YoungAdult),
            _ => Err(DomainError::parse(format!("unknown age bracket '{}'", s.trim()))),
        }
    }
}

/// Which languages narrative text is produced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LanguageMode {
    #[default]
    PrimaryOnly,
    SecondaryOnly,
    /// Parallel display of both languages
    Bilingual,
}

impl LanguageMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageMode::PrimaryOnly => "THAI_ONLY",
            LanguageMode::SecondaryOnly => "ENGLISH_ONLY",
            LanguageMode::Bilingual => "BILINGUAL",
        }
    }
}

impl fmt::Display for LanguageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LanguageMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "thai_only" | "primary_only" | "thai" => Ok(LanguageMode::PrimaryOnly),
            "english_only" | "secondary_only" | "english" => Ok(LanguageMode::SecondaryOnly),
            "bilingual" => Ok(LanguageMode::Bilingual),
            other => Err(DomainError::parse(format!("unknown language mode '{}'", other))),
        }
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace(['-', ' '], "_")
}
