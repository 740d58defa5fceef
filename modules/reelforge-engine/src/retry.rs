use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use tracing::warn;

use reelforge_common::{AttemptOutcome, GenerationAttempt, ProviderError, ProviderId};

/// Bounded retry applied to each provider attempt. Delays are fixed per
/// failure class rather than exponential: upstream free-tier quotas reset
/// on human timescales, so one short, bounded retry is worth more than an
/// elaborate backoff schedule.
#[derive(Debug, Clone)]
pub struct RetryTuning {
    pub max_attempts: u32,
    pub rate_limit_delay: Duration,
    pub transient_delay: Duration,
}

impl Default for RetryTuning {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            rate_limit_delay: Duration::from_millis(2000),
            transient_delay: Duration::from_millis(1200),
        }
    }
}

impl RetryTuning {
    fn delay_for(&self, err: &ProviderError) -> Duration {
        match err {
            ProviderError::RateLimited(_) => self.rate_limit_delay,
            _ => self.transient_delay,
        }
    }
}

/// Run an operation with bounded retry on transient failure classes.
///
/// Every try is recorded in the attempt log, success or not. Permanent
/// failures (auth, quota, invalid request, malformed payload) return
/// immediately; retrying cannot change their outcome.
pub async fn with_retry<T, F, Fut>(
    tuning: &RetryTuning,
    provider: ProviderId,
    model_id: &str,
    attempts: &mut Vec<GenerationAttempt>,
    mut op: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt_number = 0;
    loop {
        attempt_number += 1;
        let started_at = Utc::now();

        match op().await {
            Ok(value) => {
                attempts.push(GenerationAttempt {
                    provider,
                    model_id: model_id.to_string(),
                    attempt_number,
                    started_at,
                    outcome: AttemptOutcome::Success,
                    error: None,
                });
                return Ok(value);
            }
            Err(err) => {
                let retryable = err.is_retryable();
                attempts.push(GenerationAttempt {
                    provider,
                    model_id: model_id.to_string(),
                    attempt_number,
                    started_at,
                    outcome: if retryable {
                        AttemptOutcome::TransientFailure
                    } else {
                        AttemptOutcome::PermanentFailure
                    },
                    error: Some(err.clone()),
                });

                if !retryable || attempt_number >= tuning.max_attempts {
                    return Err(err);
                }

                warn!(
                    provider = %provider,
                    attempt = attempt_number,
                    error = %err,
                    "Attempt failed, retrying after backoff"
                );
                tokio::time::sleep(tuning.delay_for(&err)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn fast() -> RetryTuning {
        RetryTuning {
            max_attempts: 2,
            rate_limit_delay: Duration::ZERO,
            transient_delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn non_retryable_fails_after_one_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut attempts = Vec::new();

        let result: Result<(), _> = with_retry(
            &fast(),
            ProviderId::NvidiaSdxl,
            "m",
            &mut attempts,
            || {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(ProviderError::Auth("bad key".into()))
                }
            },
        )
        .await;

        assert!(matches!(result, Err(ProviderError::Auth(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].outcome, AttemptOutcome::PermanentFailure);
    }

    #[tokio::test]
    async fn rate_limited_then_success_takes_two_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut attempts = Vec::new();

        let result = with_retry(
            &fast(),
            ProviderId::Pollinations,
            "flux",
            &mut attempts,
            || {
                let calls = calls.clone();
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(ProviderError::RateLimited("slow down".into()))
                    } else {
                        Ok(42u32)
                    }
                }
            },
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].outcome, AttemptOutcome::TransientFailure);
        assert_eq!(attempts[1].outcome, AttemptOutcome::Success);
        assert_eq!(attempts[1].attempt_number, 2);
    }

    #[tokio::test]
    async fn retry_budget_is_capped() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut attempts = Vec::new();

        let result: Result<(), _> = with_retry(
            &fast(),
            ProviderId::Huggingface,
            "m",
            &mut attempts,
            || {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(ProviderError::Unavailable {
                        status: 503,
                        message: "loading".into(),
                    })
                }
            },
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(attempts.len(), 2);
    }
}
