//! Resilient model clients with exponential backoff retry
//!
//! Wraps any `LlmPort` / `ImageGenPort` implementation with a retry executor.
//! Quota and permanent failures fail fast; transient failures are retried
//! with `base * 2^attempt` delays, capped at `max_delay_ms`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::infrastructure::clock::{SystemRandom, TokioSleeper};
use crate::infrastructure::ports::{
    FailureClass, ImageGenError, ImageGenPort, ImageRequest, ImageResult, LlmError, LlmPort,
    LlmRequest, LlmResponse, RandomPort, SleepPort,
};

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts including the first one (values below 1 behave as 1)
    pub max_attempts: u32,
    /// Delay in milliseconds after the first failed attempt
    pub base_delay_ms: u64,
    /// Maximum delay in milliseconds (caps exponential growth)
    pub max_delay_ms: u64,
    /// Jitter factor (0.0-1.0) applied symmetrically around each delay
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 3000,
            max_delay_ms: 30000,
            jitter_factor: 0.0,
        }
    }
}

/// Errors the executor knows how to classify.
pub trait Retryable: std::fmt::Display {
    fn failure_class(&self) -> FailureClass;
}

impl Retryable for LlmError {
    fn failure_class(&self) -> FailureClass {
        self.classify()
    }
}

impl Retryable for ImageGenError {
    fn failure_class(&self) -> FailureClass {
        self.classify()
    }
}

/// Result of one logical call plus how many attempts it took.
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    pub result: Result<T, E>,
    pub attempts: u32,
}

/// Attempt indices are 0-based.
#[derive(Debug)]
enum RetryState<T, E> {
    Attempting { attempt: u32 },
    Waiting { attempt: u32, delay: Duration },
    Retrying { attempt: u32 },
    Succeeded { value: T, attempts: u32 },
    Failed { error: E, attempts: u32 },
}

/// Drives one logical call through Attempting -> Waiting -> Retrying until
/// it reaches Succeeded or Failed.
#[derive(Clone)]
pub struct RetryExecutor {
    config: RetryConfig,
    sleeper: Arc<dyn SleepPort>,
    random: Arc<dyn RandomPort>,
}

impl RetryExecutor {
    pub fn new(config: RetryConfig, sleeper: Arc<dyn SleepPort>) -> Self {
        Self {
            config,
            sleeper,
            random: Arc::new(SystemRandom::new()),
        }
    }

    pub fn with_random(mut self, random: Arc<dyn RandomPort>) -> Self {
        self.random = random;
        self
    }

    /// Wait after the failed attempt `attempt` (0-based): base * 2^attempt,
    /// capped, then jittered.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponential = self
            .config
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt));
        let capped = exponential.min(self.config.max_delay_ms);

        let jitter_range = capped as f64 * self.config.jitter_factor.clamp(0.0, 1.0);
        if jitter_range > 0.0 {
            let offset = (self.random.gen_unit() * 2.0 - 1.0) * jitter_range;
            Duration::from_millis((capped as f64 + offset).max(0.0) as u64)
        } else {
            Duration::from_millis(capped)
        }
    }

    /// `None` means the failure is terminal.
    fn next_delay(&self, attempt: u32, class: FailureClass) -> Option<Duration> {
        match class {
            FailureClass::Quota | FailureClass::Permanent => None,
            FailureClass::Transient if attempt + 1 < self.config.max_attempts.max(1) => {
                Some(self.delay_for(attempt))
            }
            FailureClass::Transient => None,
        }
    }

    pub async fn run<T, E, F, Fut>(&self, operation_name: &str, mut operation: F) -> RetryOutcome<T, E>
    where
        E: Retryable,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut state = RetryState::Attempting { attempt: 0 };

        loop {
            state = match state {
                RetryState::Attempting { attempt } => match operation().await {
                    Ok(value) => RetryState::Succeeded {
                        value,
                        attempts: attempt + 1,
                    },
                    Err(error) => {
                        let class = error.failure_class();
                        match self.next_delay(attempt, class) {
                            Some(delay) => {
                                tracing::warn!(
                                    attempt = attempt + 1,
                                    max_attempts,
                                    delay_ms = delay.as_millis() as u64,
                                    error = %error,
                                    operation = operation_name,
                                    "Model request failed, retrying..."
                                );
                                RetryState::Waiting { attempt, delay }
                            }
                            None => {
                                match class {
                                    FailureClass::Quota => tracing::warn!(
                                        error = %error,
                                        operation = operation_name,
                                        "Model quota exhausted, not retrying"
                                    ),
                                    FailureClass::Permanent => tracing::error!(
                                        error = %error,
                                        operation = operation_name,
                                        "Model request failed with non-retryable error"
                                    ),
                                    FailureClass::Transient => tracing::error!(
                                        attempts = attempt + 1,
                                        error = %error,
                                        operation = operation_name,
                                        "Model request failed after all retry attempts"
                                    ),
                                }
                                RetryState::Failed {
                                    error,
                                    attempts: attempt + 1,
                                }
                            }
                        }
                    }
                },
                RetryState::Waiting { attempt, delay } => {
                    self.sleeper.sleep(delay).await;
                    RetryState::Retrying {
                        attempt: attempt + 1,
                    }
                }
                RetryState::Retrying { attempt } => {
                    tracing::debug!(
                        attempt = attempt + 1,
                        operation = operation_name,
                        "Retrying model request"
                    );
                    RetryState::Attempting { attempt }
                }
                RetryState::Succeeded { value, attempts } => {
                    if attempts > 1 {
                        tracing::info!(
                            attempts,
                            operation = operation_name,
                            "Model request succeeded after retry"
                        );
                    }
                    return RetryOutcome {
                        result: Ok(value),
                        attempts,
                    };
                }
                RetryState::Failed { error, attempts } => {
                    return RetryOutcome {
                        result: Err(error),
                        attempts,
                    };
                }
            };
        }
    }
}

/// Wrapper that adds retry logic to any LLM client
pub struct ResilientLlmClient {
    inner: Arc<dyn LlmPort>,
    executor: RetryExecutor,
}

impl ResilientLlmClient {
    /// Create a new resilient wrapper using real sleeps.
    pub fn new(inner: Arc<dyn LlmPort>, config: RetryConfig) -> Self {
        Self::with_executor(inner, RetryExecutor::new(config, Arc::new(TokioSleeper)))
    }

    pub fn with_executor(inner: Arc<dyn LlmPort>, executor: RetryExecutor) -> Self {
        Self { inner, executor }
    }
}

#[async_trait]
impl LlmPort for ResilientLlmClient {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let inner = Arc::clone(&self.inner);
        self.executor
            .run("generate", || {
                let inner = Arc::clone(&inner);
                let request = request.clone();
                async move { inner.generate(request).await }
            })
            .await
            .result
    }
}

/// Same retry policy for image generation
pub struct ResilientImageGen {
    inner: Arc<dyn ImageGenPort>,
    executor: RetryExecutor,
}

impl ResilientImageGen {
    pub fn new(inner: Arc<dyn ImageGenPort>, config: RetryConfig) -> Self {
        Self::with_executor(inner, RetryExecutor::new(config, Arc::new(TokioSleeper)))
    }

    pub fn with_executor(inner: Arc<dyn ImageGenPort>, executor: RetryExecutor) -> Self {
        Self { inner, executor }
    }
}

#[async_trait]
impl ImageGenPort for ResilientImageGen {
    async fn generate(&self, request: ImageRequest) -> Result<ImageResult, ImageGenError> {
        let inner = Arc::clone(&self.inner);
        self.executor
            .run("generate_image", || {
                let inner = Arc::clone(&inner);
                let request = request.clone();
                async move { inner.generate(request).await }
            })
            .await
            .result
    }
}
