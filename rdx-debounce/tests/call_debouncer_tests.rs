use debounce::prelude::*;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::yield_now;
use tokio::time::{advance, Instant};

type CallLog<A> = Arc<Mutex<Vec<(Duration, A)>>>;

/// Returns a callback that records each invocation with its offset from `start`.
fn recording<A: Send + 'static>(start: Instant) -> (CallLog<A>, impl Fn(A) + Send + Sync + 'static) {
    let log: CallLog<A> = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    (log, move |args| sink.lock().push((start.elapsed(), args)))
}

async fn step(ms: u64) {
    advance(Duration::from_millis(ms)).await;
    yield_now().await;
}

#[tokio::test(start_paused = true)]
async fn test_burst_fires_once_with_last_arguments() {
    // Arrange
    let start = Instant::now();
    let (log, callback) = recording::<&'static str>(start);
    let debounced = debounce(callback, Duration::from_millis(100));

    // Act
    debounced.call("A");
    step(30).await;
    debounced.call("B");
    step(30).await;
    debounced.call("C");
    step(99).await;

    // Assert
    assert!(log.lock().is_empty(), "fired before the quiet period ended");
    step(2).await;
    let calls = log.lock().clone();
    assert_eq!(calls.len(), 1);
    let (at, args) = calls[0];
    assert_eq!(args, "C");
    assert!(at >= Duration::from_millis(160) && at <= Duration::from_millis(161), "fired at {at:?}");
    assert!(!debounced.is_pending());
}

#[tokio::test(start_paused = true)]
async fn test_separate_bursts_fire_separately() {
    // Arrange
    let (log, callback) = recording::<u32>(Instant::now());
    let debounced = debounce(callback, Duration::from_millis(50));

    // Act
    debounced.call(1);
    step(60).await;
    debounced.call(2);
    step(60).await;

    // Assert
    let args: Vec<u32> = log.lock().iter().map(|(_, a)| *a).collect();
    assert_eq!(args, vec![1, 2]);
}

#[tokio::test(start_paused = true)]
async fn test_wrappers_from_the_same_callback_are_isolated() {
    // Arrange
    let (log, callback) = recording::<&'static str>(Instant::now());
    let callback = Arc::new(callback);
    let (left_cb, right_cb) = (callback.clone(), callback.clone());
    let left = debounce(move |a| left_cb(a), Duration::from_millis(100));
    let right = debounce(move |a| right_cb(a), Duration::from_millis(100));

    // Act
    left.call("left");
    step(50).await;
    right.call("right");
    step(51).await;

    // Assert: `right` did not reset `left`.
    assert_eq!(log.lock().iter().map(|(_, a)| *a).collect::<Vec<_>>(), vec!["left"]);
    assert!(right.is_pending());

    step(50).await;
    assert_eq!(
        log.lock().iter().map(|(_, a)| *a).collect::<Vec<_>>(),
        vec!["left", "right"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_clones_share_one_pending_call() {
    // Arrange
    let (log, callback) = recording::<u8>(Instant::now());
    let original = debounce(callback, Duration::from_millis(40));
    let clone = original.clone();

    // Act
    original.call(1);
    step(20).await;
    clone.call(2);
    step(41).await;

    // Assert
    assert_eq!(log.lock().iter().map(|(_, a)| *a).collect::<Vec<_>>(), vec![2]);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_the_wrapper_cancels_the_pending_call() {
    // Arrange
    let (log, callback) = recording::<()>(Instant::now());
    let debounced = debounce(callback, Duration::from_millis(10));
    debounced.call(());

    // Act
    drop(debounced);
    step(100).await;

    // Assert
    assert!(log.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_discards_the_pending_call() {
    // Arrange
    let (log, callback) = recording::<i32>(Instant::now());
    let debounced = debounce(callback, Duration::from_millis(10));
    debounced.call(7);

    // Act
    let was_pending = debounced.cancel();
    step(50).await;

    // Assert
    assert!(was_pending);
    assert!(!debounced.is_pending());
    assert!(log.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_zero_delay_fires_on_the_next_turn() {
    // Arrange
    let (log, callback) = recording::<&'static str>(Instant::now());
    let debounced = debounce(callback, Duration::ZERO);

    // Act
    debounced.call("now");
    step(1).await;

    // Assert
    assert_eq!(log.lock().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_into_fn_keeps_debouncing() {
    // Arrange
    let (log, callback) = recording::<(String, usize)>(Instant::now());
    let resize = debounce(callback, Duration::from_millis(25)).into_fn();

    // Act
    for width in [800, 900, 1024] {
        resize(("window".to_string(), width));
        step(5).await;
    }
    step(30).await;

    // Assert
    let calls = log.lock().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1, ("window".to_string(), 1024));
}

#[tokio::test(start_paused = true)]
async fn test_callback_may_call_back_into_the_debouncer() {
    // Arrange
    let fired = Arc::new(Mutex::new(Vec::new()));
    let slot: Arc<Mutex<Option<CallDebouncer<u32>>>> = Arc::new(Mutex::new(None));
    let (sink, handle) = (fired.clone(), slot.clone());
    let debounced = debounce(
        move |n: u32| {
            sink.lock().push(n);
            if n < 3 {
                if let Some(again) = handle.lock().as_ref() {
                    again.call(n + 1);
                }
            }
        },
        Duration::from_millis(10),
    );
    *slot.lock() = Some(debounced.clone());

    // Act
    debounced.call(1);
    for _ in 0..4 {
        step(11).await;
    }

    // Assert
    assert_eq!(*fired.lock(), vec![1, 2, 3]);
    slot.lock().take();
}
