//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - LLM calls (could swap Gemini -> Ollama -> other)
//! - Image generation
//! - Clock/Random/Sleep (for testing)

mod error;
mod external;
mod testing;

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{
    ChatMessage, FinishReason, ImageGenPort, ImageRequest, ImageResult, LlmPort, LlmRequest,
    LlmResponse, MessageRole, TokenUsage,
};

#[cfg(test)]
pub use external::{MockImageGenPort, MockLlmPort};

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::{ClockPort, RandomPort, SleepPort};

// =============================================================================
// Error Types
// =============================================================================
pub use error::{FailureClass, ImageGenError, LlmError};
