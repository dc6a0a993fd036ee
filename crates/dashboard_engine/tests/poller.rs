use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dashboard_engine::{
    fetch_with_polling, is_loading, ApiError, FailureKind, PollSettings, TIMEOUT_WARNING,
};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

fn fast(max_attempts: u32) -> PollSettings {
    PollSettings {
        interval: Duration::from_millis(1),
        max_attempts,
    }
}

/// Fetch function that replays `script` and then repeats its last entry.
fn scripted(
    script: Vec<Result<Value, ApiError>>,
) -> (
    Arc<AtomicU32>,
    impl FnMut() -> std::future::Ready<Result<Value, ApiError>>,
) {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let fetch = move || {
        let n = counter.fetch_add(1, Ordering::SeqCst) as usize;
        let step = script[n.min(script.len() - 1)].clone();
        std::future::ready(step)
    };
    (calls, fetch)
}

#[test]
fn loading_sentinel_is_detected() {
    assert!(is_loading(&json!({"status": "loading"})));
    assert!(!is_loading(&json!({"status": "ok"})));
    assert!(!is_loading(&json!([{"status": "loading"}])));
    assert!(!is_loading(&Value::Null));
}

#[tokio::test]
async fn settles_after_two_retries() {
    let (calls, fetch) = scripted(vec![
        Ok(json!({"status": "loading"})),
        Ok(json!({"status": "loading"})),
        Ok(json!({"status": "ok", "data": [1, 2]})),
    ]);
    let progress = Arc::new(Mutex::new(Vec::new()));
    let seen = progress.clone();

    let polled = fetch_with_polling(fetch, &fast(24), &CancellationToken::new(), |n| {
        seen.lock().unwrap().push(n)
    })
    .await
    .expect("polling settles");

    assert_eq!(polled.payload, json!({"status": "ok", "data": [1, 2]}));
    assert_eq!(polled.attempts, 2);
    assert!(!polled.timed_out);
    assert_eq!(polled.warning, None);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(*progress.lock().unwrap(), vec![1, 2]);
}

#[tokio::test]
async fn always_loading_times_out_after_final_attempt() {
    let (calls, fetch) = scripted(vec![Ok(json!({"status": "loading"}))]);
    let progress = Arc::new(AtomicU32::new(0));
    let seen = progress.clone();

    let polled = fetch_with_polling(fetch, &fast(24), &CancellationToken::new(), |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    })
    .await
    .expect("timeout still yields the final answer");

    // One initial fetch, 24 scheduled retries and one final attempt.
    assert_eq!(calls.load(Ordering::SeqCst), 26);
    assert_eq!(progress.load(Ordering::SeqCst), 24);
    assert_eq!(polled.attempts, 24);
    assert!(polled.timed_out);
    assert_eq!(polled.warning.as_deref(), Some(TIMEOUT_WARNING));
    assert_eq!(polled.payload, json!({"status": "loading"}));
}

#[tokio::test]
async fn final_attempt_answer_is_kept() {
    let mut script: Vec<Result<Value, ApiError>> = vec![Ok(json!({"status": "loading"})); 4];
    script.push(Ok(json!([{"calendar": "Clown"}])));
    let (calls, fetch) = scripted(script);

    let polled = fetch_with_polling(fetch, &fast(3), &CancellationToken::new(), |_| {})
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 5);
    assert!(polled.timed_out);
    assert_eq!(polled.payload, json!([{"calendar": "Clown"}]));
}

#[tokio::test]
async fn transport_error_aborts_without_retry() {
    let (calls, fetch) = scripted(vec![
        Ok(json!({"status": "loading"})),
        Err(ApiError::new(FailureKind::Network, "connection refused")),
        Ok(json!([])),
    ]);

    let err = fetch_with_polling(fetch, &fast(24), &CancellationToken::new(), |_| {})
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::Network);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn cancellation_stops_a_pending_wait() {
    let (calls, fetch) = scripted(vec![Ok(json!({"status": "loading"}))]);
    let cancel = CancellationToken::new();
    let settings = PollSettings {
        interval: Duration::from_secs(60),
        max_attempts: 24,
    };

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let err = tokio::time::timeout(
        Duration::from_secs(5),
        fetch_with_polling(fetch, &settings, &cancel, |_| {}),
    )
    .await
    .expect("cancellation is prompt")
    .unwrap_err();

    assert_eq!(err.kind, FailureKind::Cancelled);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn first_ready_answer_needs_no_retry() {
    let (calls, fetch) = scripted(vec![Ok(json!([]))]);
    let polled = fetch_with_polling(fetch, &fast(24), &CancellationToken::new(), |_| {})
        .await
        .unwrap();
    assert_eq!(polled.attempts, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
