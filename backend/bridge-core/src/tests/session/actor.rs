// Recovery paths of the session actor, driven directly so a broken write is
// deterministic instead of depending on socket timing.

use crate::auth::{AuthFile, CredentialSource, Credentials};
use crate::config::BridgeConfig;
use crate::error::CallError;
use crate::events::EventDispatcher;
use crate::session::transport::WsSink;
use crate::session::{ConnectionState, QueuedCall, SessionActor, spawn_session};

use common::RedactedToken;

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot::error::TryRecvError;
use tokio::sync::{mpsc, oneshot, watch};
use tokio_tungstenite::{WebSocketStream, accept_async, connect_async};

type ReplyRx = oneshot::Receiver<Result<Value, CallError>>;

struct FixedSource(Option<Credentials>);

impl CredentialSource for FixedSource {
    fn load(&self) -> Option<Credentials> {
        self.0.clone()
    }

    fn remove(&self) {}
}

fn credentials() -> Credentials {
    Credentials {
        port: 1,
        connect_token: RedactedToken::new("connect"),
        access_token: RedactedToken::new("access"),
    }
}

fn actor(source: Option<Credentials>) -> SessionActor {
    let (command_tx, _command_rx) = mpsc::channel(8);
    let (state_tx, _state_rx) = watch::channel(ConnectionState::Disconnected);
    let config = BridgeConfig::default().with_reconnect_delay(Duration::from_secs(60));

    SessionActor::new(
        config,
        Arc::new(FixedSource(source)),
        command_tx,
        state_tx,
        EventDispatcher::new(),
    )
}

fn queued(method: &str) -> (QueuedCall, ReplyRx) {
    let (reply, reply_rx) = oneshot::channel();
    let call = QueuedCall {
        method: method.to_string(),
        payload: json!({}),
        reply,
    };
    (call, reply_rx)
}

/// A client sink that has already sent its close frame, so every write fails.
async fn closed_sink() -> (WsSink, WebSocketStream<TcpStream>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let native = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        accept_async(stream).await.unwrap()
    });

    let (ws, _) = connect_async(format!("ws://127.0.0.1:{port}")).await.unwrap();
    let native_ws = native.await.unwrap();

    let (mut sink, _stream) = ws.split();
    sink.close().await.unwrap();
    (sink, native_ws)
}

fn drain_queue(actor: &mut SessionActor) -> Vec<QueuedCall> {
    actor.queue.drain()
}

/// **VALUE**: A write that fails mid-flush puts the whole batch back, in order,
/// and arms a reconnect.
///
/// **WHY THIS MATTERS**: Calls issued while offline are only flushed once per open.
/// If the socket dies during that flush, anything not requeued is lost for good,
/// and anything requeued out of order reaches the native side reordered.
///
/// **BUG THIS CATCHES**: Would catch the failed call being dropped or appended at
/// the back, the rest of the batch being written to a dead socket, or the session
/// staying Open with no retry.
#[tokio::test]
async fn given_broken_socket_when_flushing_then_batch_requeued_in_order_and_retry_armed() {
    // GIVEN: An Open session whose socket can no longer be written, three calls queued
    let mut actor = actor(Some(credentials()));
    actor.credentials = Some(credentials());
    let (sink, _native_ws) = closed_sink().await;
    actor.transport.attach(sink);
    actor.set_state(ConnectionState::Open);

    let mut replies = Vec::new();
    for method in ["first", "second", "third"] {
        let (call, reply_rx) = queued(method);
        actor.queue.enqueue(call);
        replies.push(reply_rx);
    }

    // WHEN: Flushing
    actor.flush().await;

    // THEN: Disconnected with a retry pending and nothing left in flight
    assert_eq!(actor.state(), ConnectionState::Disconnected);
    assert!(actor.reconnect.is_pending(), "a reconnect must be scheduled");
    assert_eq!(actor.registry.len(), 0);

    // AND: All three are queued again in issue order, none settled
    let requeued = drain_queue(&mut actor);
    let methods: Vec<&str> = requeued.iter().map(|call| call.method.as_str()).collect();
    assert_eq!(methods, ["first", "second", "third"]);
    for reply_rx in &mut replies {
        assert!(matches!(reply_rx.try_recv(), Err(TryRecvError::Empty)));
    }

    actor.reconnect.cancel();
}

/// **VALUE**: When credentials cannot be reloaded the call waits at the head of
/// the queue and the session reconnects.
///
/// **WHY THIS MATTERS**: After an invalid-token rejection the cached token is
/// dropped. If the file is being rewritten at that moment the reload finds
/// nothing, and the call must survive until the new token appears.
///
/// **BUG THIS CATCHES**: Would catch the call being sent without a token, rejected
/// outright, or queued behind calls issued after it.
#[tokio::test]
async fn given_no_credentials_on_reload_when_transmitting_then_call_requeued_first() {
    // GIVEN: An Open session whose credentials were cleared, one call already waiting
    let mut actor = actor(None);
    actor.set_state(ConnectionState::Open);
    let (waiting, mut waiting_rx) = queued("later");
    actor.queue.enqueue(waiting);

    // WHEN: Transmitting a call
    let (call, mut call_rx) = queued("window.focus");
    actor.transmit(call).await;

    // THEN: It goes back to the head of the queue, unsettled, and a retry is armed
    assert_eq!(actor.state(), ConnectionState::Disconnected);
    assert!(actor.reconnect.is_pending());
    assert_eq!(actor.registry.len(), 0);

    let requeued = drain_queue(&mut actor);
    let methods: Vec<&str> = requeued.iter().map(|call| call.method.as_str()).collect();
    assert_eq!(methods, ["window.focus", "later"]);
    assert!(matches!(call_rx.try_recv(), Err(TryRecvError::Empty)));
    assert!(matches!(waiting_rx.try_recv(), Err(TryRecvError::Empty)));

    actor.reconnect.cancel();
}

/// **VALUE**: A zero command capacity does not take the session down.
///
/// **BUG THIS CATCHES**: Would catch `spawn_session` handing 0 to tokio's bounded
/// channel, which panics.
#[tokio::test]
async fn given_zero_command_capacity_when_spawning_then_session_runs() {
    // GIVEN: A config asking for an unbuffered command channel
    let dir = TempDir::new().unwrap();
    let auth_path = dir.path().join("auth_info.json");
    let config = BridgeConfig {
        command_capacity: 0,
        ..BridgeConfig::default()
            .with_auth_file(&auth_path)
            .with_reconnect_delay(Duration::from_secs(60))
    };

    // WHEN: Spawning and shutting down
    let client = spawn_session(config, Arc::new(AuthFile::new(auth_path)));
    client.shutdown().await;

    // THEN: The session processed the shutdown
    assert_eq!(client.state(), ConnectionState::Disconnected);
    let late = client.call("app.getConfig", Value::Null).await;
    assert!(late.unwrap_err().is_session_closed());
}
