use crate::error::CallError;
use crate::session::{CallRegistry, Settlement};
use crate::wire::ResponseFrame;

use std::collections::HashSet;

use serde_json::{Value, json};
use tokio::sync::oneshot;

type Receiver = oneshot::Receiver<Result<Value, CallError>>;

fn register(registry: &mut CallRegistry, method: &str) -> (String, Receiver) {
    let (reply, rx) = oneshot::channel();
    let id = registry.register(method.to_string(), reply);
    (id, rx)
}

fn frame(id: &str, data: Value) -> ResponseFrame {
    ResponseFrame {
        id: id.to_string(),
        data,
    }
}

/// **VALUE**: Every in-flight call gets a distinct id.
///
/// **BUG THIS CATCHES**: Would catch a counter reset or a constant id, which would let
/// one response settle another call.
#[test]
fn given_many_registrations_when_ids_compared_then_all_unique() {
    let mut registry = CallRegistry::new();
    let mut receivers = Vec::new();
    let mut ids = HashSet::new();

    for _ in 0..500 {
        let (id, rx) = register(&mut registry, "storage.getKeys");
        receivers.push(rx);
        assert!(ids.insert(id), "duplicate id issued");
    }

    assert_eq!(registry.len(), 500);
}

#[tokio::test]
async fn given_success_response_when_settled_then_caller_receives_value() {
    // GIVEN: A pending call
    let mut registry = CallRegistry::new();
    let (id, rx) = register(&mut registry, "window.getTitle");

    // WHEN: Its response arrives
    let settlement = registry.settle(frame(&id, json!({ "success": true, "returnValue": "T" })));

    // THEN: The caller gets the return value and the call is gone
    assert_eq!(settlement, Settlement::Resolved);
    assert_eq!(rx.await.unwrap().unwrap(), json!("T"));
    assert!(!registry.contains(&id));
}

#[tokio::test]
async fn given_error_response_when_settled_then_caller_receives_native_error() {
    let mut registry = CallRegistry::new();
    let (id, rx) = register(&mut registry, "filesystem.readFile");

    let settlement = registry.settle(frame(
        &id,
        json!({ "success": false, "error": { "code": "NE_FS_FILRDER", "message": "nope" } }),
    ));

    assert_eq!(settlement, Settlement::Rejected { invalid_token: false });
    let error = rx.await.unwrap().unwrap_err();
    assert_eq!(error.code(), Some("NE_FS_FILRDER"));
}

/// **VALUE**: An invalid-token rejection is reported to the session.
///
/// **WHY THIS MATTERS**: The session drops its cached credentials on this signal; without
/// it every later call keeps failing with the stale token.
#[tokio::test]
async fn given_invalid_token_response_when_settled_then_settlement_flags_it() {
    let mut registry = CallRegistry::new();
    let (id, rx) = register(&mut registry, "app.getConfig");

    let settlement = registry.settle(frame(
        &id,
        json!({ "error": { "code": "NE_RT_INVTOKN", "message": "Invalid or expired NL_TOKEN value from client" } }),
    ));

    assert_eq!(settlement, Settlement::Rejected { invalid_token: true });
    assert!(rx.await.unwrap().unwrap_err().is_invalid_token());
}

#[tokio::test]
async fn given_malformed_response_when_settled_then_caller_receives_malformed_error() {
    let mut registry = CallRegistry::new();
    let (id, rx) = register(&mut registry, "os.getEnvs");

    registry.settle(frame(&id, json!({ "returnValue": 1 })));

    assert!(matches!(
        rx.await.unwrap(),
        Err(CallError::MalformedResponse { .. })
    ));
}

/// **VALUE**: A duplicate response is dropped; the call settles exactly once.
///
/// **BUG THIS CATCHES**: Would catch a lookup that reads instead of removing, letting a
/// replayed frame try to complete an already-completed call.
#[tokio::test]
async fn given_settled_call_when_same_id_arrives_again_then_unmatched() {
    let mut registry = CallRegistry::new();
    let (id, rx) = register(&mut registry, "window.isVisible");
    registry.settle(frame(&id, json!({ "success": true, "returnValue": true })));

    let second = registry.settle(frame(&id, json!({ "success": true, "returnValue": false })));

    assert_eq!(second, Settlement::Unmatched);
    assert_eq!(rx.await.unwrap().unwrap(), json!(true));
}

#[test]
fn given_unknown_id_when_settled_then_unmatched_and_registry_untouched() {
    let mut registry = CallRegistry::new();
    let (_id, _rx) = register(&mut registry, "window.show");

    let settlement = registry.settle(frame("not-a-real-id", json!({ "success": true })));

    assert_eq!(settlement, Settlement::Unmatched);
    assert_eq!(registry.len(), 1);
}

/// **VALUE**: A caller that gave up does not break settlement.
#[test]
fn given_dropped_receiver_when_settled_then_call_is_still_removed() {
    let mut registry = CallRegistry::new();
    let (id, rx) = register(&mut registry, "window.hide");
    drop(rx);

    let settlement = registry.settle(frame(&id, json!({ "success": true })));

    assert_eq!(settlement, Settlement::Resolved);
    assert_eq!(registry.len(), 0);
}

#[tokio::test]
async fn given_pending_calls_when_rejected_all_then_each_caller_sees_session_closed() {
    let mut registry = CallRegistry::new();
    let (_a, rx_a) = register(&mut registry, "a.one");
    let (_b, rx_b) = register(&mut registry, "b.two");

    let rejected = registry.reject_all("shutting down");

    assert_eq!(rejected, 2);
    assert_eq!(registry.len(), 0);
    assert!(rx_a.await.unwrap().unwrap_err().is_session_closed());
    assert!(rx_b.await.unwrap().unwrap_err().is_session_closed());
}

#[test]
fn given_pending_call_when_taken_then_it_is_not_settled() {
    let mut registry = CallRegistry::new();
    let (id, mut rx) = register(&mut registry, "storage.setData");

    let pending = registry.take(&id).expect("call should be pending");

    assert_eq!(pending.method, "storage.setData");
    assert!(rx.try_recv().is_err(), "taking must not settle");
    assert!(registry.take(&id).is_none());
}
