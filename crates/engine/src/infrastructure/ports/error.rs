//! Error types for port operations.

/// How a transport failure should be treated by the retry executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Provider throttled the caller. Never retried.
    Quota,
    /// Network hiccup, 5xx, malformed body. Retried with backoff.
    Transient,
    /// Bad request or bad credentials. Never retried.
    Permanent,
}

/// Markers providers use in error bodies when a quota is exhausted.
const QUOTA_MARKERS: [&str; 3] = ["429", "quota", "resource_exhausted"];

fn classify_status(status: u16, message: &str) -> FailureClass {
    match status {
        429 => FailureClass::Quota,
        400 | 401 | 403 => FailureClass::Permanent,
        _ => classify_message(message),
    }
}

fn classify_message(message: &str) -> FailureClass {
    let lower = message.to_ascii_lowercase();
    if QUOTA_MARKERS.iter().any(|m| lower.contains(m)) {
        FailureClass::Quota
    } else {
        FailureClass::Transient
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
    #[error("LLM API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("LLM quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    pub fn classify(&self) -> FailureClass {
        match self {
            LlmError::QuotaExceeded(_) => FailureClass::Quota,
            LlmError::Api { status, message } => classify_status(*status, message),
            LlmError::RequestFailed(message) => classify_message(message),
            LlmError::InvalidResponse(_) => FailureClass::Transient,
        }
    }

    pub fn is_quota(&self) -> bool {
        self.classify() == FailureClass::Quota
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ImageGenError {
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
    #[error("Image API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Image quota exceeded: {0}")]
    QuotaExceeded(String),
    /// The model answered but returned no image part.
    #[error("No image in response")]
    NoImage,
    #[error("Service unavailable")]
    Unavailable,
}

impl ImageGenError {
    pub fn classify(&self) -> FailureClass {
        match self {
            ImageGenError::QuotaExceeded(_) => FailureClass::Quota,
            ImageGenError::Api { status, message } => classify_status(*status, message),
            ImageGenError::GenerationFailed(message) => classify_message(message),
            ImageGenError::NoImage => FailureClass::Permanent,
            ImageGenError::Unavailable => FailureClass::Transient,
        }
    }
}

impl From<LlmError> for ImageGenError {
    fn from(error: LlmError) -> Self {
        match error {
            LlmError::QuotaExceeded(message) => ImageGenError::QuotaExceeded(message),
            LlmError::Api { status, message } => ImageGenError::Api { status, message },
            other => ImageGenError::GenerationFailed(other.to_string()),
        }
    }
}
