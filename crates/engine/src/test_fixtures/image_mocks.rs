//! Mock image generation for testing.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::infrastructure::ports::{ImageGenError, ImageGenPort, ImageRequest, ImageResult};

/// 1x1 transparent PNG.
pub const PLACEHOLDER_PNG: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// Returns the placeholder PNG for every prompt, except prompts containing
/// the failure marker.
pub struct PlaceholderImageGen {
    fail_marker: Option<String>,
    call_count: AtomicUsize,
}

impl PlaceholderImageGen {
    pub fn new() -> Self {
        Self {
            fail_marker: None,
            call_count: AtomicUsize::new(0),
        }
    }

    /// Fail every prompt that contains `marker`.
    pub fn failing_on(marker: impl Into<String>) -> Self {
        Self {
            fail_marker: Some(marker.into()),
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }
}

impl Default for PlaceholderImageGen {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenPort for PlaceholderImageGen {
    async fn generate(&self, request: ImageRequest) -> Result<ImageResult, ImageGenError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Some(marker) = &self.fail_marker {
            if request.prompt.contains(marker.as_str()) {
                return Err(ImageGenError::NoImage);
            }
        }
        Ok(ImageResult {
            data: PLACEHOLDER_PNG.to_string(),
            media_type: "image/png".to_string(),
        })
    }
}
