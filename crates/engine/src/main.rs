//! Storyloom Engine - command line entry point.
//!
//! `storyloom-engine "<idea>" [count] [--mode comic] [--age 9-12] [--safety moderate]`

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storyloom_domain::{AgeBracket, LanguageMode, PipelineSettings, SafetyLevel, StoryMode};
use storyloom_engine::infrastructure::settings::EngineSettings;
use storyloom_engine::App;

#[derive(Debug, Parser)]
#[command(name = "storyloom-engine")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Turn a one-line idea into an illustrated, reviewed story")]
struct Cli {
    /// The story idea
    idea: String,

    /// Number of units (scenes/pages/panels)
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    count: Option<u32>,

    /// picture-book, novel, comic, non-fiction or cinematic
    #[arg(long)]
    mode: Option<StoryMode>,

    /// Reader age bracket: 3-5, 6-8, 9-12 or 13+
    #[arg(long)]
    age: Option<AgeBracket>,

    /// strict, moderate or open
    #[arg(long)]
    safety: Option<SafetyLevel>,

    /// thai, english or bilingual
    #[arg(long)]
    language: Option<LanguageMode>,
}

impl Cli {
    fn settings(&self) -> PipelineSettings {
        let defaults = PipelineSettings::default();
        PipelineSettings::new(
            self.mode.unwrap_or(defaults.mode),
            self.age.unwrap_or(defaults.age),
            self.count.unwrap_or(defaults.count),
            self.safety.unwrap_or(defaults.safety),
        )
        .with_language_mode(self.language.unwrap_or(defaults.language_mode))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load environment from repo root (the binary may run from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storyloom_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = cli.settings();

    let engine_settings = EngineSettings::from_env()?;
    tracing::info!(
        provider = ?engine_settings.provider,
        fast_model = %engine_settings.generation.fast_model,
        creative_model = %engine_settings.generation.creative_model,
        "Starting Storyloom Engine"
    );
    let app = App::from_settings(&engine_settings)?;

    let result = app
        .use_cases
        .story
        .pipeline
        .run(&cli.idea, settings, None, |progress| {
            tracing::info!(step = progress.step, "{}", progress.message);
        })
        .await;

    match result {
        Ok(result) => {
            if !result.is_complete() {
                tracing::warn!(
                    missing = result.missing_unit_count(),
                    "Story has fewer units than requested"
                );
            }
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "Pipeline failed");
            anyhow::bail!(e.user_message())
        }
    }
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_pipeline_defaults() {
        let cli = Cli::try_parse_from(["storyloom-engine", "a lost cat"]).unwrap();
        assert_eq!(cli.settings(), PipelineSettings::default());
    }

    #[test]
    fn settings_flags_use_lenient_parsers() {
        let cli = Cli::try_parse_from([
            "storyloom-engine",
            "a lost cat",
            "3",
            "--mode",
            "comic",
            "--age",
            "9-12",
            "--safety",
            "MODERATE",
            "--language",
            "bilingual",
        ])
        .unwrap();
        let settings = cli.settings();
        assert_eq!(settings.count, 3);
        assert_eq!(settings.mode, StoryMode::Comic);
        assert_eq!(settings.age, AgeBracket::PreTeen);
        assert_eq!(settings.safety, SafetyLevel::Moderate);
        assert_eq!(settings.language_mode, LanguageMode::Bilingual);
    }

    #[test]
    fn rejects_unknown_mode_and_zero_count() {
        assert!(Cli::try_parse_from(["storyloom-engine", "cat", "--mode", "opera"]).is_err());
        assert!(Cli::try_parse_from(["storyloom-engine", "cat", "0"]).is_err());
    }
}
