//! Retry loop: run attempts until one succeeds or the policy says stop.

use serde::de::DeserializeOwned;
use std::future::Future;

use super::classify;
use super::error::{FetchError, RetryError};
use super::policy::{RetryDecision, RetryPolicy};
use super::request::RetryRequest;
use crate::cancel::CancelToken;
use crate::fetch::Fetcher;

/// Result of one attempt: a payload or the failure that ended it.
pub type AttemptOutcome<T> = Result<T, FetchError>;

/// Runs `attempt_fn` until it succeeds or the policy says to stop.
///
/// `attempt_fn` receives the 1-based attempt number. Attempts never overlap:
/// the next one starts only after the previous future has resolved. On a
/// retryable failure the loop sleeps for the backoff delay (if any) and tries
/// again. Only the last failure is kept. Cancelling `cancel` drops the
/// in-flight attempt and ends the sequence with [`RetryError::Cancelled`].
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancelToken,
    mut attempt_fn: F,
) -> Result<T, RetryError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = AttemptOutcome<T>>,
{
    if policy.max_attempts == 0 {
        return Err(RetryError::InvalidRequest(
            "attempt budget must be at least 1".into(),
        ));
    }

    let mut attempt = 1u32;
    loop {
        if cancel.is_cancelled() {
            return Err(RetryError::Cancelled {
                attempts_made: attempt - 1,
            });
        }
        tracing::debug!(attempt, max_attempts = policy.max_attempts, "starting attempt");

        let outcome = tokio::select! {
            outcome = attempt_fn(attempt) => outcome,
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
        };

        let err = match outcome {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(attempt, "succeeded after retry");
                }
                return Ok(value);
            }
            Err(FetchError::Cancelled) => {
                return Err(RetryError::Cancelled {
                    attempts_made: attempt,
                })
            }
            Err(e) => e,
        };

        let kind = classify(&err);
        match policy.decide(attempt, kind) {
            RetryDecision::NoRetry => {
                tracing::warn!(attempt, error = %err, "giving up");
                return Err(RetryError::Exhausted {
                    attempts_made: attempt,
                    last_error: err.to_string(),
                });
            }
            RetryDecision::RetryAfter(delay) => {
                tracing::warn!(attempt, error = %err, ?kind, ?delay, "attempt failed, retrying");
                if !delay.is_zero() {
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = cancel.cancelled() => {
                            return Err(RetryError::Cancelled {
                                attempts_made: attempt,
                            });
                        }
                    }
                }
                attempt += 1;
            }
        }
    }
}

/// Fetch `request` and decode the first successful (2xx) body as JSON into `T`.
///
/// Transport failures, non-2xx statuses and undecodable bodies are all failed
/// attempts. Exhaustion reports the attempts made and the last failure.
pub async fn fetch_json<T, F>(
    fetcher: &F,
    request: &RetryRequest,
    cancel: &CancelToken,
) -> Result<T, RetryError>
where
    T: DeserializeOwned,
    F: Fetcher,
{
    let resource = request.resource();
    run_with_retry(request.policy(), cancel, |attempt| async move {
        tracing::debug!(resource, attempt, "fetching");
        let response = fetcher.fetch(resource, cancel).await?;
        if !response.is_success() {
            return Err(FetchError::Status(response.status));
        }
        serde_json::from_slice::<T>(&response.body).map_err(|e| FetchError::Decode(e.to_string()))
    })
    .await
}

/// [`fetch_json`] with an untyped payload.
pub async fn fetch_value<F: Fetcher>(
    fetcher: &F,
    request: &RetryRequest,
    cancel: &CancelToken,
) -> Result<serde_json::Value, RetryError> {
    fetch_json(fetcher, request, cancel).await
}
