use std::future::Future;
use std::pin::pin;
use std::time::Duration;

use dashboard_core::{PollState, PollStep};
use dashboard_logging::{dash_debug, dash_warn};
use futures_util::future::{select, Either};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::ApiError;

pub const TIMEOUT_WARNING: &str =
    "Die Daten werden noch berechnet. Angezeigt wird das Ergebnis des letzten Versuchs.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 24,
        }
    }
}

/// Final answer of a polling cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Polled {
    pub payload: Value,
    /// Scheduled retries that were needed (the final attempt is not counted).
    pub attempts: u32,
    pub timed_out: bool,
    pub warning: Option<String>,
}

/// True when the backend answered with the `{"status": "loading"}` placeholder.
pub fn is_loading(payload: &Value) -> bool {
    payload.get("status").and_then(Value::as_str) == Some("loading")
}

/// Calls `fetch` until the answer is no longer a loading placeholder.
///
/// Every `loading` answer schedules one retry after `settings.interval` and
/// reports the attempt count to `on_progress`. Once `max_attempts` retries
/// are spent, one last fetch is made and its answer is returned with
/// `timed_out` set. Errors from `fetch` end the cycle at once. Cancelling
/// `cancel` aborts a pending wait or request with `FailureKind::Cancelled`.
pub async fn fetch_with_polling<F, Fut, P>(
    mut fetch: F,
    settings: &PollSettings,
    cancel: &CancellationToken,
    mut on_progress: P,
) -> Result<Polled, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Value, ApiError>>,
    P: FnMut(u32),
{
    let mut poll = PollState::new(settings.interval, settings.max_attempts);
    loop {
        let payload = cancellable(cancel, fetch()).await??;
        match poll.observe(is_loading(&payload)) {
            PollStep::Done => {
                return Ok(Polled {
                    payload,
                    attempts: poll.attempts(),
                    timed_out: false,
                    warning: None,
                });
            }
            PollStep::Retry { attempt, delay } => {
                dash_debug!(
                    "backend still loading, retry {}/{} in {:?}",
                    attempt,
                    poll.max_attempts(),
                    delay
                );
                on_progress(attempt);
                cancellable(cancel, tokio::time::sleep(delay)).await?;
            }
            PollStep::FinalAttempt { delay } => {
                cancellable(cancel, tokio::time::sleep(delay)).await?;
                let payload = cancellable(cancel, fetch()).await??;
                dash_warn!(
                    "backend still loading after {} attempts, keeping final answer",
                    poll.attempts()
                );
                return Ok(Polled {
                    payload,
                    attempts: poll.attempts(),
                    timed_out: true,
                    warning: Some(TIMEOUT_WARNING.to_string()),
                });
            }
        }
    }
}

async fn cancellable<T>(
    cancel: &CancellationToken,
    work: impl Future<Output = T>,
) -> Result<T, ApiError> {
    let cancelled = pin!(cancel.cancelled());
    let work = pin!(work);
    match select(cancelled, work).await {
        Either::Left(_) => Err(ApiError::cancelled()),
        Either::Right((value, _)) => Ok(value),
    }
}
