use crate::session::ReconnectPolicy;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::time::{advance, sleep};

const DELAY: Duration = Duration::from_millis(1000);

fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

fn bump(count: &Arc<AtomicUsize>) -> impl Future<Output = ()> + Send + 'static {
    let count = Arc::clone(count);
    async move {
        count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Let spawned tasks run after a clock change.
async fn settle() {
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
}

/// **VALUE**: The timer fires after the fixed delay and not before.
#[tokio::test(start_paused = true)]
async fn given_scheduled_retry_when_delay_elapses_then_fires_once() {
    // GIVEN: A scheduled retry
    let fired = counter();
    let mut policy = ReconnectPolicy::new(DELAY);
    assert!(policy.schedule(bump(&fired)));

    // WHEN: Time advances to just before, then past, the delay
    advance(DELAY - Duration::from_millis(1)).await;
    settle().await;
    assert_eq!(fired.load(Ordering::SeqCst), 0, "fired early");

    advance(Duration::from_millis(1)).await;
    settle().await;

    // THEN: It fired exactly once
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

/// **VALUE**: Several failures in a row arm a single timer.
///
/// **WHY THIS MATTERS**: A close followed by an error on the same connection reports
/// two failures. Two timers would open two competing transports.
///
/// **BUG THIS CATCHES**: Would catch `schedule` spawning unconditionally.
#[tokio::test(start_paused = true)]
async fn given_pending_timer_when_scheduled_again_then_second_request_is_ignored() {
    let fired = counter();
    let mut policy = ReconnectPolicy::new(DELAY);

    assert!(policy.schedule(bump(&fired)));
    assert!(!policy.schedule(bump(&fired)));
    assert!(!policy.schedule(bump(&fired)));

    sleep(DELAY * 3).await;
    settle().await;

    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(policy.is_pending(), "still outstanding until fired() is called");
}

#[tokio::test(start_paused = true)]
async fn given_fired_timer_when_scheduled_again_then_new_timer_is_armed() {
    let fired = counter();
    let mut policy = ReconnectPolicy::new(DELAY);
    policy.schedule(bump(&fired));
    sleep(DELAY).await;
    settle().await;

    policy.fired();
    assert!(!policy.is_pending());
    assert!(policy.schedule(bump(&fired)));
    sleep(DELAY).await;
    settle().await;

    assert_eq!(fired.load(Ordering::SeqCst), 2);
}

/// **VALUE**: A cancelled timer never fires.
///
/// **BUG THIS CATCHES**: Would catch shutdown forgetting the timer, which reconnects to
/// a native process that is already gone.
#[tokio::test(start_paused = true)]
async fn given_pending_timer_when_cancelled_then_never_fires() {
    let fired = counter();
    let mut policy = ReconnectPolicy::new(DELAY);
    policy.schedule(bump(&fired));

    policy.cancel();
    sleep(DELAY * 2).await;
    settle().await;

    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert!(!policy.is_pending());
}

#[test]
fn given_policy_when_created_then_reports_its_delay() {
    let policy = ReconnectPolicy::new(Duration::from_millis(250));

    assert_eq!(policy.delay(), Duration::from_millis(250));
    assert!(!policy.is_pending());
}
