mod story_settings;

pub use story_settings::{AgeBracket, LanguageMode, SafetyLevel, StoryMode};
