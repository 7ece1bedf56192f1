//! Bounded retry for backends that intermittently answer with nothing.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;

use super::{ProviderError, Summarizer, SummaryRequest};
use crate::logging::Logger;

/// How many times to ask, and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// Five attempts, two seconds apart.
    pub const fn local_model() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(2),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::local_model()
    }
}

/// Wraps a summarizer so that empty answers and errors are retried under a [`RetryPolicy`].
///
/// Both outcomes count the same: attempt `n + 1` starts only after the fixed delay following
/// attempt `n`. When attempts run out the result is `Ok("")` and an error is logged.
pub struct Retrying<S> {
    inner: S,
    policy: RetryPolicy,
    label: String,
    logger: Arc<dyn Logger>,
}

impl<S: Summarizer> Retrying<S> {
    pub fn new(inner: S, policy: RetryPolicy, label: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self {
            inner,
            policy,
            label: label.into(),
            logger,
        }
    }
}

#[async_trait]
impl<S: Summarizer> Summarizer for Retrying<S> {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, ProviderError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_error: Option<ProviderError> = None;

        for attempt in 1..=max_attempts {
            self.logger
                .debug(&format!("[{}] Attempt {attempt}/{max_attempts}", self.label));

            match self.inner.summarize(request).await {
                Ok(summary) if !summary.trim().is_empty() => return Ok(summary.trim().to_string()),
                Ok(_) => {
                    self.logger
                        .debug(&format!("[{}] Response is empty (attempt {attempt})", self.label));
                    last_error = None;
                }
                Err(error) => {
                    self.logger
                        .debug(&format!("[{}] Request failed (attempt {attempt}): {error}", self.label));
                    last_error = Some(error);
                }
            }

            if attempt < max_attempts {
                self.logger.debug(&format!(
                    "[{}] Waiting {:?} before retry...",
                    self.label, self.policy.delay
                ));
                tokio::time::sleep(self.policy.delay).await;
            }
        }

        match last_error {
            Some(error) => self.logger.error(&format!(
                "[{}] No valid response after {max_attempts} attempts. Last error: {error}",
                self.label
            )),
            None => self.logger.error(&format!(
                "[{}] No valid response after {max_attempts} attempts.",
                self.label
            )),
        }
        Ok(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llms::mock::{MockSummarizer, RecordingLogger};
    use tracing::Level;

    fn no_delay(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_local_model_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.delay, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts_on_empty() {
        let logger = Arc::new(RecordingLogger::new());
        let mock = MockSummarizer::with_default("   ");
        let retrying = Retrying::new(mock.clone(), no_delay(5), "OLLAMA", logger.clone());

        let summary = retrying.summarize(&SummaryRequest::default()).await.unwrap();

        assert_eq!(summary, "");
        assert_eq!(mock.calls(), 5);
        assert_eq!(logger.count(Level::ERROR), 1);
        assert!(logger.contains(Level::ERROR, "No valid response after 5 attempts"));
        assert!(logger.contains(Level::DEBUG, "Attempt 5/5"));
    }

    #[tokio::test]
    async fn test_errors_are_retried_like_empty_responses() {
        let logger = Arc::new(RecordingLogger::new());
        let mock = MockSummarizer::with_failure();
        let retrying = Retrying::new(mock.clone(), no_delay(5), "OLLAMA", logger.clone());

        let summary = retrying.summarize(&SummaryRequest::default()).await.unwrap();

        assert_eq!(summary, "");
        assert_eq!(mock.calls(), 5);
        assert!(logger.contains(Level::ERROR, "Last error"));
    }

    #[tokio::test]
    async fn test_stops_at_first_non_empty_answer() {
        let logger = Arc::new(RecordingLogger::new());
        let mock = MockSummarizer::with_sequence(vec!["", "", " third time lucky "]);
        let retrying = Retrying::new(mock.clone(), no_delay(5), "OLLAMA", logger.clone());

        let summary = retrying.summarize(&SummaryRequest::default()).await.unwrap();

        assert_eq!(summary, "third time lucky");
        assert_eq!(mock.calls(), 3);
        assert_eq!(logger.count(Level::ERROR), 0);
    }

    #[tokio::test]
    async fn test_waits_between_attempts() {
        let logger = Arc::new(RecordingLogger::new());
        let mock = MockSummarizer::with_default("");
        let policy = RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_millis(20),
        };
        let retrying = Retrying::new(mock.clone(), policy, "OLLAMA", logger);

        let start = std::time::Instant::now();
        retrying.summarize(&SummaryRequest::default()).await.unwrap();

        // two gaps between three attempts, none after the last
        assert!(start.elapsed() >= Duration::from_millis(40));
        assert_eq!(mock.calls(), 3);
    }
}
