//! On-demand tools the shell calls after a run: prompt history, translation,
//! voice and sound direction, review re-runs.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use storyloom_domain::{IdeaSeed, LanguageMode, PipelineResult, PipelineSettings};

use crate::app::App;
use crate::test_fixtures::{app_with, ScriptedLlm};
use crate::use_cases::story::prompts::{
    REFINER_ROLE, REVIEW_ROLE, SOUND_ROLE, TRANSLATOR_ROLE, VOICE_ROLE,
};
use crate::use_cases::story::ReviewDisposition;

const IDEA: &str = "แมวหลงทางในตลาดกลางคืน";

fn settings() -> PipelineSettings {
    PipelineSettings {
        count: 3,
        ..PipelineSettings::default()
    }
    .with_language_mode(LanguageMode::Bilingual)
}

async fn story(app: &App) -> PipelineResult {
    app.use_cases
        .story
        .pipeline
        .run(IDEA, settings(), None, |_| {})
        .await
        .expect("pipeline should complete")
}

#[tokio::test]
async fn prompt_version_feeds_a_later_run() {
    let llm = Arc::new(ScriptedLlm::happy());
    let app = app_with(llm.clone());
    let idea = IdeaSeed::new(IDEA, settings()).unwrap();

    let (brief, version) = app.use_cases.story.refiner.refine_versioned(&idea).await;
    assert_eq!(version.original, IDEA);
    assert_eq!(version.refined, brief.prompt);
    assert_eq!(version.quality_score, 88);
    assert_eq!(
        version.created_at,
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    );
    assert!(version.bible_seed.is_some());

    let result = app
        .use_cases
        .story
        .pipeline
        .run(IDEA, settings(), Some(version.to_brief(brief.title.clone())), |_| {})
        .await
        .unwrap();

    assert_eq!(llm.calls_for(REFINER_ROLE), 1);
    assert_eq!(result.refined_prompt, brief.prompt);
    assert_eq!(result.title, brief.title);
}

#[tokio::test]
async fn unit_gets_translation_voice_and_sound() {
    let llm = Arc::new(
        ScriptedLlm::happy()
            .reply(
                TRANSLATOR_ROLE,
                "## The Night Moth\n\nMiso chased a moth into the Lantern Market.\n\n- Wait for me!",
            )
            .reply(
                VOICE_ROLE,
                r#"{"audio_script": [{"unit_no": 1, "tracks": [
                    {"track_id": "TH_NARRATOR", "speaker": "Narrator", "style": {"emotion": "warm", "pace_wpm": 130, "energy": "medium"},
                     "ssml": "<speak>มิโซะวิ่ง</speak>", "timing_hint_sec": 18},
                    {"track_id": "EN_NARRATOR", "speaker": "Narrator", "style": {"emotion": "warm", "pace_wpm": 140, "energy": "medium"},
                     "ssml": "<speak>Miso ran</speak>", "timing_hint_sec": 45}
                ], "pronunciation_lexicon": []}], "qc_rules": []}"#,
            )
            .reply(
                SOUND_ROLE,
                r#"{"sound_cues": [{"unit_no": 1, "ambience": [{"type": "night_market", "start": "0s", "end": "45s", "mix_db": -20}],
                    "bgm": [{"mood": "curious", "start": "0s", "end": "45s", "mix_db": -24}], "sfx": [], "safety_check": "pass"}]}"#,
            ),
    );
    let app = app_with(llm.clone());
    let mut result = story(&app).await;
    let tools = &app.use_cases.story;
    let unit = &mut result.units[0];

    tools
        .translator
        .translate_unit(unit, &result.bible, settings().age)
        .await
        .unwrap();
    let script = tools
        .voice
        .script(&unit.content, &result.bible, LanguageMode::Bilingual, settings().age, 1)
        .await
        .unwrap();
    let design = tools
        .sound
        .design(
            &unit.content,
            &unit.illustration_prompt,
            Some(&script),
            settings().age,
            1,
            settings().safety,
        )
        .await
        .unwrap();

    assert!(unit
        .translation
        .as_deref()
        .is_some_and(|t| t.starts_with("## The Night Moth")));
    assert_eq!(script.tracks.len(), 2);
    assert_eq!(script.longest_track_sec(), Some(45.0));
    assert_eq!(design.bgm[0].mood.as_deref(), Some("curious"));

    unit.audio_script = Some(script);
    unit.sound_design = Some(design);
    assert_eq!(llm.calls_for(TRANSLATOR_ROLE), 1);
    assert_eq!(llm.calls_for(VOICE_ROLE), 1);
    assert_eq!(llm.calls_for(SOUND_ROLE), 1);
}

#[tokio::test]
async fn review_rerun_after_edit_keeps_units() {
    let llm = Arc::new(ScriptedLlm::happy());
    let app = app_with(llm.clone());
    let result = story(&app).await;

    let llm = Arc::new(
        ScriptedLlm::new().reply(REVIEW_ROLE, r#"{"issues": ["ตอนจบสั้นไป"], "fixed_units": []}"#),
    );
    let rerun = app_with(llm.clone());
    let mut units = result.units.clone();
    units[2].content.push_str(" แล้วก็หลับฝันดี");

    let report = rerun
        .use_cases
        .story
        .reviewer
        .review(units.clone(), &result.bible, settings().age, settings().safety)
        .await
        .unwrap();

    assert_eq!(report.disposition, ReviewDisposition::AcknowledgedUnfixed);
    assert_eq!(report.units, units);
    assert_eq!(llm.calls_for(REVIEW_ROLE), 1);
}
