use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use reelforge_common::{AsyncJobHandle, ProviderError};

/// Tuning for the submit-then-poll vendor loop. Defaults give a 2 minute
/// aggregate budget (60 polls, 2 s apart).
#[derive(Debug, Clone)]
pub struct PollTuning {
    pub interval: Duration,
    pub max_polls: u32,
}

impl Default for PollTuning {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            max_polls: 60,
        }
    }
}

impl PollTuning {
    /// Total wall-clock budget of the loop.
    pub fn budget(&self) -> Duration {
        self.interval * self.max_polls
    }
}

/// Terminal outcome of a polling loop.
#[derive(Debug)]
pub enum PollOutcome {
    /// Vendor reported success; carries the final response body.
    Completed(Value),
    /// Vendor explicitly reported failure.
    Failed(String),
    /// Poll budget exhausted without reaching a terminal status.
    TimedOut,
}

/// Vendors spell terminal success several ways.
pub fn is_terminal_success(status: &str) -> bool {
    matches!(
        status.to_lowercase().as_str(),
        "completed" | "succeeded" | "complete"
    )
}

pub fn is_terminal_failure(status: &str) -> bool {
    matches!(status.to_lowercase().as_str(), "failed" | "error")
}

/// Drive a submitted job to a terminal state.
///
/// One poll call per interval. A single poll failure is logged and the
/// loop continues; only the attempt cap ends it. Any status outside the
/// terminal vocabulary is treated as still-in-progress.
pub async fn poll_until_terminal<F, Fut>(
    handle: &mut AsyncJobHandle,
    tuning: &PollTuning,
    mut poll: F,
) -> PollOutcome
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Value, ProviderError>>,
{
    while handle.poll_count < tuning.max_polls {
        tokio::time::sleep(tuning.interval).await;
        handle.poll_count += 1;

        let body = match poll(handle.request_id.clone()).await {
            Ok(body) => body,
            Err(e) => {
                warn!(
                    request_id = %handle.request_id,
                    poll = handle.poll_count,
                    error = %e,
                    "Poll attempt failed, continuing"
                );
                continue;
            }
        };

        let status = body
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        if is_terminal_success(&status) {
            return PollOutcome::Completed(body);
        }
        if is_terminal_failure(&status) {
            let message = body
                .get("error")
                .or_else(|| body.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("job failed")
                .to_string();
            return PollOutcome::Failed(message);
        }

        debug!(
            request_id = %handle.request_id,
            status = %status,
            poll = handle.poll_count,
            "Job still in progress"
        );
    }

    PollOutcome::TimedOut
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;

    fn fast(max_polls: u32) -> PollTuning {
        PollTuning {
            interval: Duration::ZERO,
            max_polls,
        }
    }

    #[tokio::test]
    async fn completes_after_terminal_status() {
        let statuses = Arc::new(Mutex::new(VecDeque::from(vec![
            "queued",
            "queued",
            "completed",
        ])));
        let mut handle = AsyncJobHandle::new("req-1");

        let outcome = poll_until_terminal(&mut handle, &fast(60), |_id| {
            let statuses = statuses.clone();
            async move {
                let status = statuses.lock().unwrap().pop_front().unwrap();
                Ok(json!({ "status": status }))
            }
        })
        .await;

        assert!(matches!(outcome, PollOutcome::Completed(_)));
        assert_eq!(handle.poll_count, 3);
    }

    #[tokio::test]
    async fn exhausted_budget_times_out() {
        let mut handle = AsyncJobHandle::new("req-2");

        let outcome = poll_until_terminal(&mut handle, &fast(5), |_id| async {
            Ok(json!({ "status": "queued" }))
        })
        .await;

        assert!(matches!(outcome, PollOutcome::TimedOut));
        assert_eq!(handle.poll_count, 5);
    }

    #[tokio::test]
    async fn vendor_failure_is_distinct_from_timeout() {
        let mut handle = AsyncJobHandle::new("req-3");

        let outcome = poll_until_terminal(&mut handle, &fast(5), |_id| async {
            Ok(json!({ "status": "failed", "error": "content rejected" }))
        })
        .await;

        match outcome {
            PollOutcome::Failed(message) => assert_eq!(message, "content rejected"),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn single_poll_error_does_not_abort_loop() {
        let polls = Arc::new(Mutex::new(0u32));
        let mut handle = AsyncJobHandle::new("req-4");

        let outcome = poll_until_terminal(&mut handle, &fast(10), |_id| {
            let polls = polls.clone();
            async move {
                let mut count = polls.lock().unwrap();
                *count += 1;
                if *count == 1 {
                    Err(ProviderError::Unavailable {
                        status: 502,
                        message: "bad gateway".into(),
                    })
                } else {
                    Ok(json!({ "status": "succeeded" }))
                }
            }
        })
        .await;

        assert!(matches!(outcome, PollOutcome::Completed(_)));
        assert_eq!(handle.poll_count, 2);
    }

    #[tokio::test]
    async fn unknown_status_means_in_progress() {
        let statuses = Arc::new(Mutex::new(VecDeque::from(vec!["warming-up", "complete"])));
        let mut handle = AsyncJobHandle::new("req-5");

        let outcome = poll_until_terminal(&mut handle, &fast(10), |_id| {
            let statuses = statuses.clone();
            async move {
                let status = statuses.lock().unwrap().pop_front().unwrap();
                Ok(json!({ "status": status }))
            }
        })
        .await;

        assert!(matches!(outcome, PollOutcome::Completed(_)));
        assert_eq!(handle.poll_count, 2);
    }
}
