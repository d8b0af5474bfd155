//! Testability ports for injecting time, randomness and waiting.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

// =============================================================================
// Testability Ports
// =============================================================================

pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub trait RandomPort: Send + Sync {
    /// Uniform sample in `0.0..1.0`.
    fn gen_unit(&self) -> f64;
    fn gen_uuid(&self) -> Uuid;
}

/// Async wait, so backoff can be asserted without real delays.
#[async_trait]
pub trait SleepPort: Send + Sync {
    async fn sleep(&self, duration: Duration);
}
