//! Use cases - story generation and dashboard analytics.
//!
//! Each module wires stages against the model ports in `infrastructure`.

pub mod analytics;
pub mod story;

pub use analytics::AnalyticsUseCases;
pub use story::StoryUseCases;
