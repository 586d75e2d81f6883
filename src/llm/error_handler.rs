use std::fmt;
use std::time::Duration;
use tokio::time::sleep;
use rand::Rng;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

/// Distinguishable collaborator failures. Callers get one of these instead of
/// a crash when a text-generation request goes wrong.
#[derive(Debug, Clone)]
pub enum LlmError {
    RateLimited {
        provider: String,
        message: String,
        retry_after: Option<Duration>,
    },
    NetworkError {
        provider: String,
        error: String,
    },
    ApiError {
        provider: String,
        message: String,
    },
    ParseError {
        provider: String,
        message: String,
    },
    MaxRetriesExceeded {
        provider: String,
        attempts: u32,
        last_error: String,
    },
}

impl LlmError {
    /// Map a raw error message onto the taxonomy. The HTTP layer only hands
    /// us strings, so this is a best-effort classification.
    pub fn classify(provider: &str, message: &str) -> Self {
        let provider = provider.to_string();
        let lowered = message.to_lowercase();

        if lowered.contains("rate limit") || lowered.contains("429") {
            LlmError::RateLimited {
                provider,
                message: message.to_string(),
                retry_after: Some(Duration::from_secs(60)),
            }
        } else if lowered.contains("network")
            || lowered.contains("connection")
            || lowered.contains("timed out")
        {
            LlmError::NetworkError {
                provider,
                error: message.to_string(),
            }
        } else if lowered.contains("parse") || lowered.contains("invalid") {
            LlmError::ParseError {
                provider,
                message: message.to_string(),
            }
        } else {
            LlmError::ApiError {
                provider,
                message: message.to_string(),
            }
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            LlmError::RateLimited { .. } | LlmError::NetworkError { .. }
        )
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::RateLimited { provider, message, retry_after } => {
                write!(f, "Rate limited by {}: {}. Retry after: {:?}", provider, message, retry_after)
            }
            LlmError::NetworkError { provider, error } => {
                write!(f, "Network error with {}: {}", provider, error)
            }
            LlmError::ApiError { provider, message } => {
                write!(f, "API error from {}: {}", provider, message)
            }
            LlmError::ParseError { provider, message } => {
                write!(f, "Parse error from {}: {}", provider, message)
            }
            LlmError::MaxRetriesExceeded { provider, attempts, last_error } => {
                write!(f, "Max retries ({}) exceeded for {}: {}", attempts, provider, last_error)
            }
        }
    }
}

impl std::error::Error for LlmError {}

pub struct ErrorHandler {
    provider: String,
    config: RetryConfig,
}

impl ErrorHandler {
    pub fn new(provider: &str, config: RetryConfig) -> Self {
        Self {
            provider: provider.to_string(),
            config,
        }
    }

    /// Run an operation with exponential backoff on retryable failures.
    pub async fn execute_with_retry<F, Fut, T>(&self, mut operation: F) -> Result<T, LlmError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, LlmError>>,
    {
        let mut attempts = 0;
        let mut last_error = None;

        while attempts <= self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(error) => {
                    attempts += 1;

                    if let LlmError::RateLimited { retry_after: Some(delay), .. } = &error {
                        if attempts <= self.config.max_retries {
                            sleep(*delay).await;
                            last_error = Some(error);
                            continue;
                        }
                    }

                    let retryable = error.is_retryable();
                    last_error = Some(error);

                    if !retryable || attempts > self.config.max_retries {
                        break;
                    }

                    sleep(self.calculate_delay(attempts)).await;
                }
            }
        }

        let last = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown error".to_string());

        Err(LlmError::MaxRetriesExceeded {
            provider: self.provider.clone(),
            attempts,
            last_error: last,
        })
    }

    fn calculate_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let base = self.config.base_delay.as_millis() as f64;
        let mut delay_ms = base * self.config.backoff_multiplier.powi(exponent as i32);

        if self.config.jitter {
            let jitter = rand::thread_rng().gen_range(0.8..1.2);
            delay_ms *= jitter;
        }

        Duration::from_millis(delay_ms as u64).min(self.config.max_delay)
    }
}
