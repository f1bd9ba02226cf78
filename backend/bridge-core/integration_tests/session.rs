use crate::helpers::{
    MockNative, TEST_ACCESS_TOKEN, TEST_CONNECT_TOKEN, TEST_TIMEOUT, auth_path, reserve_port,
    test_config, wait_for_state, write_credentials,
};

use bridge_core::{AuthFile, CallError, ConnectionState, NativeEvent, spawn_session};

use std::collections::BTreeMap;
use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::time::{sleep, timeout};

/// **VALUE**: A call made before the native process is up waits, then resolves.
///
/// **WHY THIS MATTERS**: Apps issue calls on startup, racing the native process that
/// writes the credential file. Those calls must neither fail nor be lost.
///
/// **BUG THIS CATCHES**: Would catch rejecting calls while disconnected, or forgetting
/// to flush the offline queue on open.
#[tokio::test]
async fn given_credentials_absent_when_call_issued_then_resolves_after_native_starts() {
    // GIVEN: A session with no credential file yet
    let dir = TempDir::new().unwrap();
    let auth = auth_path(dir.path());
    let client = spawn_session(test_config(&auth), Arc::new(AuthFile::new(&auth)));

    // WHEN: A call is issued, then the native side comes up
    let pending = tokio::spawn({
        let client = client.clone();
        async move { client.call("app.getConfig", Value::Null).await }
    });
    sleep(Duration::from_millis(150)).await;
    assert!(!pending.is_finished(), "call must wait for the transport");

    let mut native = MockNative::start().await;
    write_credentials(&auth, native.port(), TEST_ACCESS_TOKEN);

    let request = native.next_request().await;
    assert_eq!(request["method"], "app.getConfig");
    native
        .respond_success(&request, json!({ "theme": "dark" }))
        .await;

    // THEN: The original call resolves with the return value
    let result = timeout(TEST_TIMEOUT, pending).await.unwrap().unwrap();
    assert_eq!(result.unwrap(), json!({ "theme": "dark" }));

    client.shutdown().await;
}

/// **VALUE**: Calls queued while offline are sent in issue order and each settles once.
#[tokio::test]
async fn given_calls_queued_before_open_when_flushed_then_sent_in_order() {
    // GIVEN: Three calls issued one after another before credentials exist
    let dir = TempDir::new().unwrap();
    let auth = auth_path(dir.path());
    let client = spawn_session(test_config(&auth), Arc::new(AuthFile::new(&auth)));

    let mut calls = Vec::new();
    for index in 0..3 {
        let client = client.clone();
        calls.push(tokio::spawn(async move {
            client
                .call("storage.setData", json!({ "key": format!("k{index}") }))
                .await
        }));
        // Spawned tasks race to the command channel; space them out.
        sleep(Duration::from_millis(20)).await;
    }

    // WHEN: The native side starts and answers each request
    let mut native = MockNative::start().await;
    write_credentials(&auth, native.port(), TEST_ACCESS_TOKEN);

    let mut keys = Vec::new();
    for _ in 0..3 {
        let request = native.next_request().await;
        keys.push(request["data"]["key"].as_str().unwrap().to_string());
        native.respond_success(&request, request["data"]["key"].clone()).await;
    }

    // THEN: Order is preserved and every caller got its own answer
    assert_eq!(keys, vec!["k0", "k1", "k2"]);
    for (index, call) in calls.into_iter().enumerate() {
        let value = timeout(TEST_TIMEOUT, call).await.unwrap().unwrap().unwrap();
        assert_eq!(value, json!(format!("k{index}")));
    }

    client.shutdown().await;
}

#[tokio::test]
async fn given_running_native_when_connected_then_handshake_and_request_carry_tokens() {
    let dir = TempDir::new().unwrap();
    let auth = auth_path(dir.path());
    let mut native = MockNative::start().await;
    write_credentials(&auth, native.port(), TEST_ACCESS_TOKEN);
    let client = spawn_session(test_config(&auth), Arc::new(AuthFile::new(&auth)));

    let call = tokio::spawn({
        let client = client.clone();
        async move { client.call("window.setTitle", json!({ "title": "Hi" })).await }
    });
    let request = native.next_request().await;
    native.respond_success(&request, Value::Null).await;
    timeout(TEST_TIMEOUT, call).await.unwrap().unwrap().unwrap();

    let uris = native.connect_uris();
    assert_eq!(uris.len(), 1);
    assert!(uris[0].contains("extensionId=js.neutralino.devtools"), "{uris:?}");
    assert!(uris[0].contains(&format!("connectToken={TEST_CONNECT_TOKEN}")), "{uris:?}");

    assert_eq!(request["method"], "window.setTitle");
    assert_eq!(request["accessToken"], TEST_ACCESS_TOKEN);
    assert_eq!(request["data"], json!({ "title": "Hi" }));
    assert!(request["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert_eq!(client.state(), ConnectionState::Open);

    client.shutdown().await;
}

/// **VALUE**: A duplicated response does not disturb later calls.
///
/// **BUG THIS CATCHES**: Would catch a replayed frame settling whichever call is
/// pending next, or crashing the session.
#[tokio::test]
async fn given_duplicate_and_unknown_responses_when_received_then_ignored() {
    // GIVEN: A connected session with one answered call
    let dir = TempDir::new().unwrap();
    let auth = auth_path(dir.path());
    let mut native = MockNative::start().await;
    write_credentials(&auth, native.port(), TEST_ACCESS_TOKEN);
    let client = spawn_session(test_config(&auth), Arc::new(AuthFile::new(&auth)));

    let first = tokio::spawn({
        let client = client.clone();
        async move { client.call("window.getTitle", Value::Null).await }
    });
    let request = native.next_request().await;

    // WHEN: The same response arrives twice, plus one for an unknown id
    native.respond_success(&request, json!("first")).await;
    native.respond_success(&request, json!("second")).await;
    native
        .respond_success(&json!({ "id": "no-such-call" }), json!("stray"))
        .await;

    // THEN: The call saw only the first answer and the session keeps working
    let value = timeout(TEST_TIMEOUT, first).await.unwrap().unwrap().unwrap();
    assert_eq!(value, json!("first"));

    let next = tokio::spawn({
        let client = client.clone();
        async move { client.call("window.isVisible", Value::Null).await }
    });
    let request = native.next_request().await;
    native.respond_success(&request, json!(true)).await;
    assert_eq!(
        timeout(TEST_TIMEOUT, next).await.unwrap().unwrap().unwrap(),
        json!(true)
    );

    client.shutdown().await;
}

/// **VALUE**: After an invalid-token rejection the next call re-reads credentials.
///
/// **WHY THIS MATTERS**: The native process rotates its token when it restarts. Reusing
/// the cached token would fail every call until the whole app is restarted.
#[tokio::test]
async fn given_invalid_token_error_when_next_call_sent_then_credentials_are_reloaded() {
    // GIVEN: A session connected with an old token
    let dir = TempDir::new().unwrap();
    let auth = auth_path(dir.path());
    let mut native = MockNative::start().await;
    write_credentials(&auth, native.port(), "old-token");
    let client = spawn_session(test_config(&auth), Arc::new(AuthFile::new(&auth)));

    let rejected = tokio::spawn({
        let client = client.clone();
        async move { client.call("app.getConfig", Value::Null).await }
    });
    let request = native.next_request().await;
    assert_eq!(request["accessToken"], "old-token");

    // WHEN: The native side rejects the token and a new one is published
    write_credentials(&auth, native.port(), "new-token");
    native
        .respond_error(&request, "NE_RT_INVTOKN", "Invalid or expired NL_TOKEN value from client")
        .await;
    let error = timeout(TEST_TIMEOUT, rejected).await.unwrap().unwrap().unwrap_err();
    assert!(error.is_invalid_token(), "{error}");

    let retried = tokio::spawn({
        let client = client.clone();
        async move { client.call("app.getConfig", Value::Null).await }
    });

    // THEN: The next request carries the new token
    let request = native.next_request().await;
    assert_eq!(request["accessToken"], "new-token");
    native.respond_success(&request, json!({})).await;
    timeout(TEST_TIMEOUT, retried).await.unwrap().unwrap().unwrap();

    client.shutdown().await;
}

#[tokio::test]
async fn given_native_error_when_call_rejected_then_code_and_message_surface() {
    let dir = TempDir::new().unwrap();
    let auth = auth_path(dir.path());
    let mut native = MockNative::start().await;
    write_credentials(&auth, native.port(), TEST_ACCESS_TOKEN);
    let client = spawn_session(test_config(&auth), Arc::new(AuthFile::new(&auth)));

    let call = tokio::spawn({
        let client = client.clone();
        async move { client.call("filesystem.readFile", json!({ "path": "/nope" })).await }
    });
    let request = native.next_request().await;
    native
        .respond_error(&request, "NE_FS_FILRDER", "Unable to open file")
        .await;

    match timeout(TEST_TIMEOUT, call).await.unwrap().unwrap() {
        Err(CallError::Native { code, message, .. }) => {
            assert_eq!(code, "NE_FS_FILRDER");
            assert_eq!(message, "Unable to open file");
        }
        other => panic!("expected native error, got {other:?}"),
    }

    client.shutdown().await;
}

/// **VALUE**: When the native side drops the connection the session reconnects and
/// calls made in between are delivered afterwards.
#[tokio::test]
async fn given_connection_dropped_when_call_issued_then_delivered_after_reconnect() {
    // GIVEN: A connected session with a slow retry so the offline window is observable
    let dir = TempDir::new().unwrap();
    let auth = auth_path(dir.path());
    let mut native = MockNative::start().await;
    write_credentials(&auth, native.port(), TEST_ACCESS_TOKEN);
    let config = test_config(&auth).with_reconnect_delay(Duration::from_millis(400));
    let client = spawn_session(config, Arc::new(AuthFile::new(&auth)));
    wait_for_state(&client, ConnectionState::Open).await;

    // WHEN: The native side disconnects and a call is made while offline
    native.disconnect().await;
    wait_for_state(&client, ConnectionState::Disconnected).await;

    let call = tokio::spawn({
        let client = client.clone();
        async move { client.call("window.focus", Value::Null).await }
    });

    // THEN: The call goes out on the second connection and resolves
    let request = native.next_request().await;
    assert_eq!(request["method"], "window.focus");
    assert_eq!(native.connection_count(), 2);
    native.respond_success(&request, Value::Null).await;
    timeout(TEST_TIMEOUT, call).await.unwrap().unwrap().unwrap();

    client.shutdown().await;
}

/// **VALUE**: Repeated failures while the native side is unreachable never produce
/// parallel connection attempts.
///
/// **BUG THIS CATCHES**: Would catch each failure arming its own retry timer, which
/// shows up here as several connections once the native side starts listening.
#[tokio::test]
async fn given_unreachable_native_when_it_comes_up_then_exactly_one_connection_opens() {
    // GIVEN: Credentials pointing at a port nobody listens on
    let dir = TempDir::new().unwrap();
    let auth = auth_path(dir.path());
    let port = reserve_port().await;
    write_credentials(&auth, port, TEST_ACCESS_TOKEN);
    let client = spawn_session(test_config(&auth), Arc::new(AuthFile::new(&auth)));

    // WHEN: Several retries fail, then the native side starts on that port
    sleep(Duration::from_millis(300)).await;
    let native = MockNative::start_on(port).await;
    native.wait_for_connections(1).await;
    sleep(Duration::from_millis(300)).await;

    // THEN: One connection, and it stays the only one
    assert_eq!(native.connection_count(), 1);
    assert_eq!(client.state(), ConnectionState::Open);

    client.shutdown().await;
}

/// **VALUE**: `openedFile` binary chunks arrive at listeners as bytes.
#[tokio::test]
async fn given_opened_file_binary_event_when_pushed_then_listener_receives_bytes() {
    // GIVEN: A connected session with an openedFile listener
    let dir = TempDir::new().unwrap();
    let auth = auth_path(dir.path());
    let native = MockNative::start().await;
    write_credentials(&auth, native.port(), TEST_ACCESS_TOKEN);
    let client = spawn_session(test_config(&auth), Arc::new(AuthFile::new(&auth)));

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    client.on("openedFile", move |event: &NativeEvent| {
        let _ = tx.send(event.payload.as_bytes().map(<[u8]>::to_vec));
    });
    wait_for_state(&client, ConnectionState::Open).await;

    // WHEN: The native side pushes a base64 chunk of "PNG\0"
    native
        .push_event("openedFile", json!({ "id": 1, "action": "dataBinary", "data": "UE5HAA==" }))
        .await;

    // THEN: The listener sees the decoded bytes
    let bytes = timeout(TEST_TIMEOUT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(bytes, Some(b"PNG\0".to_vec()));

    client.shutdown().await;
}

/// **VALUE**: A panicking listener neither blocks other listeners nor kills the session.
///
/// **WHY THIS MATTERS**: Listeners run on the session task; an escaped panic there would
/// strand every pending and future call.
#[tokio::test]
async fn given_panicking_listener_when_event_pushed_then_session_keeps_working() {
    let dir = TempDir::new().unwrap();
    let auth = auth_path(dir.path());
    let mut native = MockNative::start().await;
    write_credentials(&auth, native.port(), TEST_ACCESS_TOKEN);
    let client = spawn_session(test_config(&auth), Arc::new(AuthFile::new(&auth)));

    let seen = Arc::new(Mutex::new(Vec::new()));
    client.on("windowClose", |_: &NativeEvent| panic!("listener bug"));
    client.on("windowClose", {
        let seen = Arc::clone(&seen);
        move |event: &NativeEvent| seen.lock().unwrap().push(event.name.clone())
    });
    wait_for_state(&client, ConnectionState::Open).await;

    native.push_event("windowClose", Value::Null).await;

    let call = tokio::spawn({
        let client = client.clone();
        async move { client.call("window.hide", Value::Null).await }
    });
    let request = native.next_request().await;
    native.respond_success(&request, Value::Null).await;
    timeout(TEST_TIMEOUT, call).await.unwrap().unwrap().unwrap();

    assert_eq!(*seen.lock().unwrap(), vec!["windowClose".to_string()]);

    client.shutdown().await;
}

/// **VALUE**: Shutdown settles everything: in-flight calls are rejected, the credential
/// file is removed, and no reconnection happens afterwards.
///
/// **BUG THIS CATCHES**: Would catch callers hanging forever after shutdown, a retry
/// timer surviving shutdown, or a stale credential file left for the next run.
#[tokio::test]
async fn given_inflight_call_when_shutdown_then_rejected_and_file_removed() {
    // GIVEN: A connected session with one unanswered call
    let dir = TempDir::new().unwrap();
    let auth = auth_path(dir.path());
    let mut native = MockNative::start().await;
    write_credentials(&auth, native.port(), TEST_ACCESS_TOKEN);
    let client = spawn_session(test_config(&auth), Arc::new(AuthFile::new(&auth)));

    let inflight = tokio::spawn({
        let client = client.clone();
        async move { client.call("os.showMessageBox", json!({ "title": "?" })).await }
    });
    native.next_request().await;

    // WHEN: The session shuts down
    client.shutdown().await;

    // THEN: The call is rejected, the file is gone, and nothing reconnects
    let error = timeout(TEST_TIMEOUT, inflight).await.unwrap().unwrap().unwrap_err();
    assert!(error.is_session_closed(), "{error}");
    assert!(!auth.exists(), "credential file should be removed");
    assert_eq!(client.state(), ConnectionState::Disconnected);

    sleep(Duration::from_millis(200)).await;
    assert_eq!(native.connection_count(), 1);

    let late = client.call("app.getConfig", Value::Null).await;
    assert!(late.unwrap_err().is_session_closed());

    client.shutdown().await;
}

#[tokio::test]
async fn given_queued_call_when_shutdown_then_rejected() {
    let dir = TempDir::new().unwrap();
    let auth = auth_path(dir.path());
    let client = spawn_session(test_config(&auth), Arc::new(AuthFile::new(&auth)));

    let queued = tokio::spawn({
        let client = client.clone();
        async move { client.call("app.getConfig", Value::Null).await }
    });
    sleep(Duration::from_millis(50)).await;
    client.shutdown().await;

    let error = timeout(TEST_TIMEOUT, queued).await.unwrap().unwrap().unwrap_err();
    assert!(error.is_session_closed(), "{error}");
}

#[derive(Debug, Deserialize, PartialEq)]
struct Size {
    width: u32,
    height: u32,
}

#[tokio::test]
async fn given_typed_call_when_resolved_then_value_is_deserialized() {
    let dir = TempDir::new().unwrap();
    let auth = auth_path(dir.path());
    let mut native = MockNative::start().await;
    write_credentials(&auth, native.port(), TEST_ACCESS_TOKEN);
    let client = spawn_session(test_config(&auth), Arc::new(AuthFile::new(&auth)));

    let call = tokio::spawn({
        let client = client.clone();
        async move { client.call_as::<Size>("window.getSize", Value::Null).await }
    });
    let request = native.next_request().await;
    native
        .respond_success(&request, json!({ "width": 800, "height": 600 }))
        .await;

    let size = timeout(TEST_TIMEOUT, call).await.unwrap().unwrap().unwrap();
    assert_eq!(size, Size { width: 800, height: 600 });

    client.shutdown().await;
}

/// **VALUE**: `window.setSize` keeps the fields the caller did not pass.
#[tokio::test]
async fn given_partial_size_when_set_size_called_then_current_size_is_merged() {
    // GIVEN: A window currently 800x600
    let dir = TempDir::new().unwrap();
    let auth = auth_path(dir.path());
    let mut native = MockNative::start().await;
    write_credentials(&auth, native.port(), TEST_ACCESS_TOKEN);
    let client = spawn_session(test_config(&auth), Arc::new(AuthFile::new(&auth)));

    // WHEN: Only the width is changed
    let call = tokio::spawn({
        let client = client.clone();
        async move { client.window().set_size(json!({ "width": 1024 })).await }
    });
    let get_size = native.next_request().await;
    assert_eq!(get_size["method"], "window.getSize");
    native
        .respond_success(&get_size, json!({ "width": 800, "height": 600 }))
        .await;

    // THEN: setSize carries the new width and the old height
    let set_size = native.next_request().await;
    assert_eq!(set_size["method"], "window.setSize");
    assert_eq!(set_size["data"], json!({ "width": 1024, "height": 600 }));
    native.respond_success(&set_size, Value::Null).await;
    timeout(TEST_TIMEOUT, call).await.unwrap().unwrap().unwrap();

    client.shutdown().await;
}

#[tokio::test]
async fn given_binary_file_when_read_then_base64_is_decoded() {
    let dir = TempDir::new().unwrap();
    let auth = auth_path(dir.path());
    let mut native = MockNative::start().await;
    write_credentials(&auth, native.port(), TEST_ACCESS_TOKEN);
    let client = spawn_session(test_config(&auth), Arc::new(AuthFile::new(&auth)));

    let call = tokio::spawn({
        let client = client.clone();
        async move { client.filesystem().read_binary_file("a.bin", Some(json!({ "size": 3 }))).await }
    });
    let request = native.next_request().await;
    assert_eq!(request["data"], json!({ "path": "a.bin", "size": 3 }));
    native.respond_success(&request, json!("AQID")).await;

    let bytes = timeout(TEST_TIMEOUT, call).await.unwrap().unwrap().unwrap();
    assert_eq!(bytes, vec![1, 2, 3]);

    client.shutdown().await;
}

#[tokio::test]
async fn given_child_window_when_created_then_exec_command_runs_in_background() {
    let dir = TempDir::new().unwrap();
    let auth = auth_path(dir.path());
    let mut native = MockNative::start().await;
    write_credentials(&auth, native.port(), TEST_ACCESS_TOKEN);
    let client = spawn_session(test_config(&auth), Arc::new(AuthFile::new(&auth)));

    let mut options = BTreeMap::new();
    options.insert("width".to_string(), json!(400));
    let call = tokio::spawn({
        let client = client.clone();
        async move { client.window().create("/child.html", &options).await }
    });

    let request = native.next_request().await;
    assert_eq!(request["method"], "os.execCommand");
    assert_eq!(request["data"]["background"], json!(true));
    assert_eq!(
        request["data"]["command"],
        json!("--url=/child.html --window-use-saved-state=false --window-width=400")
    );
    native.respond_success(&request, json!({ "pid": 77 })).await;
    timeout(TEST_TIMEOUT, call).await.unwrap().unwrap().unwrap();

    client.shutdown().await;
}

/// **VALUE**: Calls made while the native process is down go out on its next
/// connection, in the order they were issued, and each settles with its own answer.
///
/// **WHY THIS MATTERS**: A crashed native process closes nothing cleanly. Calls
/// issued during the gap must neither fail nor be reordered once it is back.
///
/// **BUG THIS CATCHES**: Would catch an abrupt socket loss (no close frame) leaving
/// the session believing it is still Open, or a reconnect that loses or reorders
/// the offline batch.
#[tokio::test]
async fn given_native_crashed_when_calls_issued_then_delivered_in_order_after_restart() {
    // GIVEN: A connected session
    let dir = TempDir::new().unwrap();
    let auth = auth_path(dir.path());
    let native = MockNative::start().await;
    let port = native.port();
    write_credentials(&auth, port, TEST_ACCESS_TOKEN);
    let client = spawn_session(test_config(&auth), Arc::new(AuthFile::new(&auth)));
    wait_for_state(&client, ConnectionState::Open).await;

    // WHEN: The native side dies without a close frame and three calls are made
    native.crash().await;
    wait_for_state(&client, ConnectionState::Disconnected).await;

    let batch = tokio::spawn({
        let client = client.clone();
        async move {
            tokio::join!(
                client.call("storage.setData", json!({ "key": "a" })),
                client.call("storage.setData", json!({ "key": "b" })),
                client.call("storage.setData", json!({ "key": "c" })),
            )
        }
    });
    sleep(Duration::from_millis(100)).await;
    assert!(!batch.is_finished(), "calls must wait for the native side");

    let mut restarted = MockNative::start_on(port).await;

    // THEN: One new connection carries all three, in issue order
    let mut keys = Vec::new();
    for answer in 1..=3 {
        let request = restarted.next_request().await;
        keys.push(request["data"]["key"].as_str().unwrap().to_string());
        restarted.respond_success(&request, json!(answer)).await;
    }
    assert_eq!(keys, ["a", "b", "c"]);
    assert_eq!(restarted.connection_count(), 1);

    // AND: Each call resolves with the answer to its own request
    let (a, b, c) = timeout(TEST_TIMEOUT, batch).await.unwrap().unwrap();
    assert_eq!(a.unwrap(), json!(1));
    assert_eq!(b.unwrap(), json!(2));
    assert_eq!(c.unwrap(), json!(3));
    assert!(restarted.no_request_within(Duration::from_millis(100)).await);

    client.shutdown().await;
}

/// **VALUE**: If the token was rejected and the credential file is gone when the
/// next call is made, that call waits and goes out on a new connection with the
/// token the native side publishes next.
///
/// **WHY THIS MATTERS**: A restarting native process deletes and rewrites its
/// credential file. A call landing in that window must not be sent unsigned,
/// rejected, or dropped.
///
/// **BUG THIS CATCHES**: Would catch the reload failure settling the call, or the
/// session keeping the old socket and never picking up the new token.
#[tokio::test]
async fn given_token_rejected_and_file_missing_when_call_issued_then_sent_with_new_token() {
    // GIVEN: A session whose token was just rejected
    let dir = TempDir::new().unwrap();
    let auth = auth_path(dir.path());
    let mut native = MockNative::start().await;
    write_credentials(&auth, native.port(), "old-token");
    let client = spawn_session(test_config(&auth), Arc::new(AuthFile::new(&auth)));

    let rejected = tokio::spawn({
        let client = client.clone();
        async move { client.call("app.getConfig", Value::Null).await }
    });
    let request = native.next_request().await;
    native
        .respond_error(&request, "NE_RT_INVTOKN", "Invalid or expired NL_TOKEN value from client")
        .await;
    let error = timeout(TEST_TIMEOUT, rejected).await.unwrap().unwrap().unwrap_err();
    assert!(error.is_invalid_token(), "{error}");

    // WHEN: The next call is made while the credential file is missing
    fs::remove_file(&auth).unwrap();
    let retried = tokio::spawn({
        let client = client.clone();
        async move { client.call("window.focus", Value::Null).await }
    });
    sleep(Duration::from_millis(150)).await;
    assert!(!retried.is_finished(), "call must wait for new credentials");

    write_credentials(&auth, native.port(), "new-token");

    // THEN: It arrives on a second connection, signed with the new token
    let request = native.next_request().await;
    assert_eq!(request["method"], "window.focus");
    assert_eq!(request["accessToken"], "new-token");
    assert_eq!(native.connection_count(), 2);

    native.respond_success(&request, Value::Null).await;
    timeout(TEST_TIMEOUT, retried).await.unwrap().unwrap().unwrap();

    client.shutdown().await;
}

/// **VALUE**: A call already written to a socket that is then lost stays pending
/// across the reconnect and is rejected only when the session shuts down.
///
/// **WHY THIS MATTERS**: The native side may have acted on the request before the
/// socket died, so it is not resent. The caller is still never left hanging past
/// shutdown.
///
/// **BUG THIS CATCHES**: Would catch in-flight calls being resent on the new
/// connection, or shutdown forgetting calls from an earlier connection.
#[tokio::test]
async fn given_call_in_flight_when_connection_lost_then_pending_until_shutdown() {
    // GIVEN: A call the native side received but never answered
    let dir = TempDir::new().unwrap();
    let auth = auth_path(dir.path());
    let mut native = MockNative::start().await;
    write_credentials(&auth, native.port(), TEST_ACCESS_TOKEN);
    let client = spawn_session(test_config(&auth), Arc::new(AuthFile::new(&auth)));

    let inflight = tokio::spawn({
        let client = client.clone();
        async move { client.call("os.showMessageBox", json!({ "title": "?" })).await }
    });
    native.next_request().await;

    // WHEN: The socket drops and the session reconnects
    native.drop_connection().await;
    native.wait_for_connections(2).await;
    wait_for_state(&client, ConnectionState::Open).await;

    // THEN: The call is neither resent nor settled
    assert!(native.no_request_within(Duration::from_millis(200)).await);
    assert!(!inflight.is_finished());

    // AND: Shutdown rejects it
    client.shutdown().await;
    let error = timeout(TEST_TIMEOUT, inflight).await.unwrap().unwrap().unwrap_err();
    assert!(error.is_session_closed(), "{error}");
}

#[tokio::test]
async fn given_custom_methods_when_listed_then_names_are_returned() {
    let dir = TempDir::new().unwrap();
    let auth = auth_path(dir.path());
    let mut native = MockNative::start().await;
    write_credentials(&auth, native.port(), TEST_ACCESS_TOKEN);
    let client = spawn_session(test_config(&auth), Arc::new(AuthFile::new(&auth)));

    let call = tokio::spawn({
        let client = client.clone();
        async move { client.custom().get_methods().await }
    });
    let request = native.next_request().await;
    assert_eq!(request["method"], "custom.getMethods");
    assert!(request.get("data").is_none(), "no payload expected: {request}");
    native
        .respond_success(&request, json!(["fetchRates", "printLabel"]))
        .await;

    let methods = timeout(TEST_TIMEOUT, call).await.unwrap().unwrap().unwrap();
    assert_eq!(methods, ["fetchRates", "printLabel"]);

    client.shutdown().await;
}
