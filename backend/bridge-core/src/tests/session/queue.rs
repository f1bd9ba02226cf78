use crate::error::CallError;
use crate::session::{OfflineQueue, QueuedCall};

use serde_json::{Value, json};
use tokio::sync::oneshot;

fn call(method: &str) -> (QueuedCall, oneshot::Receiver<Result<Value, CallError>>) {
    let (reply, rx) = oneshot::channel();
    let call = QueuedCall {
        method: method.to_string(),
        payload: json!({ "m": method }),
        reply,
    };
    (call, rx)
}

fn methods(calls: &[QueuedCall]) -> Vec<&str> {
    calls.iter().map(|c| c.method.as_str()).collect()
}

/// **VALUE**: Calls come out in the order they went in.
///
/// **WHY THIS MATTERS**: Callers rely on ordering, e.g. `writeFile` followed by
/// `appendFile` issued while the native side is still starting.
#[test]
fn given_enqueued_calls_when_drained_then_fifo_order() {
    let mut queue = OfflineQueue::new();
    for method in ["a", "b", "c"] {
        queue.enqueue(call(method).0);
    }

    let drained = queue.drain();

    assert_eq!(methods(&drained), vec!["a", "b", "c"]);
    assert!(queue.is_empty());
}

/// **VALUE**: A requeued call goes back to the head.
///
/// **BUG THIS CATCHES**: Would catch a failed write being appended at the tail, which
/// reorders it behind calls issued later.
#[test]
fn given_requeued_call_when_drained_then_it_comes_first() {
    let mut queue = OfflineQueue::new();
    queue.enqueue(call("b").0);
    queue.enqueue(call("c").0);

    queue.requeue(call("a").0);

    assert_eq!(methods(&queue.drain()), vec!["a", "b", "c"]);
}

/// **VALUE**: Each call is flushed once; a second drain finds nothing.
#[test]
fn given_drained_queue_when_drained_again_then_empty() {
    let mut queue = OfflineQueue::new();
    queue.enqueue(call("a").0);

    assert_eq!(queue.drain().len(), 1);
    assert!(queue.drain().is_empty());
    assert_eq!(queue.len(), 0);
}

#[tokio::test]
async fn given_queued_calls_when_discarded_then_callers_see_session_closed() {
    let mut queue = OfflineQueue::new();
    let (first, rx_first) = call("a");
    let (second, rx_second) = call("b");
    queue.enqueue(first);
    queue.enqueue(second);

    let discarded = queue.discard("shutting down");

    assert_eq!(discarded, 2);
    assert!(queue.is_empty());
    assert!(rx_first.await.unwrap().unwrap_err().is_session_closed());
    assert!(rx_second.await.unwrap().unwrap_err().is_session_closed());
}
