use crate::error::TransportError;
use crate::session::SessionCommand;
use crate::session::transport::{TransportEvent, run_connection};

use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::accept_async;
use url::Url;

const WAIT: Duration = Duration::from_secs(5);

/// **VALUE**: A socket that dies after the handshake is reported as a receive
/// failure of that attempt.
///
/// **WHY THIS MATTERS**: Connect failures and read failures mean different things
/// when reading the logs. One says the native side never came up, the other that
/// it went away.
///
/// **BUG THIS CATCHES**: Would catch read-loop errors being labelled as connect
/// errors, or the reader ending silently without telling the session.
#[tokio::test]
async fn given_native_drops_socket_without_close_when_reading_then_receive_failure_reported() {
    // GIVEN: A native side that completes the handshake, then drops the socket
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let native = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let ws = accept_async(stream).await.unwrap();
        drop(ws);
    });

    // WHEN: A connection attempt runs against it
    let (commands_tx, mut commands_rx) = mpsc::channel(8);
    let url = Url::parse(&format!("ws://127.0.0.1:{port}")).unwrap();
    let reader = tokio::spawn(run_connection(url, 7, commands_tx));

    // THEN: Opened, then a Receive failure, both tagged with the attempt
    let Some(SessionCommand::Transport {
        generation: 7,
        event: TransportEvent::Opened(_),
    }) = timeout(WAIT, commands_rx.recv()).await.unwrap()
    else {
        panic!("Expected Opened from attempt 7");
    };

    match timeout(WAIT, commands_rx.recv()).await.unwrap() {
        Some(SessionCommand::Transport {
            generation: 7,
            event: TransportEvent::Failed(error),
        }) => {
            assert!(matches!(error, TransportError::Receive { .. }), "{error}");
        }
        _ => panic!("Expected a Failed report from attempt 7"),
    }

    timeout(WAIT, reader).await.unwrap().unwrap();
    native.await.unwrap();
}
