//! Storyloom Engine library.
//!
//! Turns a raw story idea into an illustrated, reviewed story through a
//! sequence of model-backed stages.
//!
//! ## Structure
//!
//! - `use_cases/` - Story pipeline stages, on-demand unit tools, dashboard
//! - `infrastructure/` - Model clients, retry executor, settings (ports + adapters)
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod use_cases;

/// Test fixtures: scripted model and canned stage replies.
#[cfg(test)]
pub mod test_fixtures;

/// End-to-end pipeline scenarios against a scripted model.
#[cfg(test)]
mod e2e_tests;

pub use app::App;
