//! Test helpers for bridge integration tests.
//!
//! [`MockNative`] plays the native process: a real WebSocket server on a
//! loopback port that records connections and requests and lets a test answer
//! them, push events, or drop the connection.

use bridge_core::{BridgeConfig, BridgeClient, ConnectionState};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex as AsyncMutex, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::{WebSocketStream, accept_hdr_async};

pub const TEST_CONNECT_TOKEN: &str = "connect-token-123";
pub const TEST_ACCESS_TOKEN: &str = "access-token-456";
pub const TEST_RECONNECT_DELAY: Duration = Duration::from_millis(50);
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

type ServerSink = SplitSink<WebSocketStream<TcpStream>, Message>;

/// Fake native process listening on `127.0.0.1:<port>`.
pub struct MockNative {
    port: u16,
    requests: mpsc::UnboundedReceiver<Value>,
    sink: Arc<AsyncMutex<Option<ServerSink>>>,
    connections: Arc<AtomicUsize>,
    uris: Arc<Mutex<Vec<String>>>,
    reader: Arc<Mutex<Option<JoinHandle<()>>>>,
    accept_task: JoinHandle<()>,
}

impl MockNative {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock native listener");
        Self::serve(listener)
    }

    /// Listen on a specific port, e.g. one reserved earlier with [`reserve_port`].
    pub async fn start_on(port: u16) -> Self {
        let listener = TcpListener::bind(("127.0.0.1", port))
            .await
            .expect("Failed to bind mock native listener on reserved port");
        Self::serve(listener)
    }

    fn serve(listener: TcpListener) -> Self {
        let port = listener.local_addr().expect("local addr").port();
        let (requests_tx, requests) = mpsc::unbounded_channel();
        let sink = Arc::new(AsyncMutex::new(None));
        let connections = Arc::new(AtomicUsize::new(0));
        let uris = Arc::new(Mutex::new(Vec::new()));
        let reader = Arc::new(Mutex::new(None));

        let accept_task = tokio::spawn({
            let sink = Arc::clone(&sink);
            let reader = Arc::clone(&reader);
            let connections = Arc::clone(&connections);
            let uris = Arc::clone(&uris);
            async move {
                while let Ok((stream, _)) = listener.accept().await {
                    let uris = Arc::clone(&uris);
                    let record_uri = move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                        uris.lock().unwrap().push(req.uri().to_string());
                        Ok(resp)
                    };
                    let Ok(ws) = accept_hdr_async(stream, record_uri).await else {
                        continue;
                    };
                    connections.fetch_add(1, Ordering::SeqCst);

                    let (write, mut read) = ws.split();
                    *sink.lock().await = Some(write);

                    let requests_tx = requests_tx.clone();
                    let read_task = tokio::spawn(async move {
                        while let Some(Ok(message)) = read.next().await {
                            if let Message::Text(text) = message {
                                let request: Value =
                                    serde_json::from_str(text.as_str()).expect("request is JSON");
                                let _ = requests_tx.send(request);
                            }
                        }
                    });
                    *reader.lock().unwrap() = Some(read_task);
                }
            }
        });

        Self {
            port,
            requests,
            sink,
            connections,
            uris,
            reader,
            accept_task,
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Request URIs of every accepted connection, oldest first.
    pub fn connect_uris(&self) -> Vec<String> {
        self.uris.lock().unwrap().clone()
    }

    pub async fn wait_for_connections(&self, count: usize) {
        timeout(TEST_TIMEOUT, async {
            while self.connection_count() < count {
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("Timed out waiting for the client to connect");
    }

    /// Next request frame the client sent.
    pub async fn next_request(&mut self) -> Value {
        timeout(TEST_TIMEOUT, self.requests.recv())
            .await
            .expect("Timed out waiting for a request")
            .expect("Request channel closed")
    }

    /// `true` if no request arrives within `wait`.
    pub async fn no_request_within(&mut self, wait: Duration) -> bool {
        timeout(wait, self.requests.recv()).await.is_err()
    }

    pub async fn send_text(&self, text: String) {
        let mut sink = self.sink.lock().await;
        let sink = sink.as_mut().expect("No client connected");
        sink.send(Message::Text(text.into()))
            .await
            .expect("Failed to send frame");
    }

    pub async fn respond(&self, request: &Value, data: Value) {
        let frame = json!({ "id": request["id"], "data": data });
        self.send_text(frame.to_string()).await;
    }

    pub async fn respond_success(&self, request: &Value, return_value: Value) {
        self.respond(request, json!({ "success": true, "returnValue": return_value }))
            .await;
    }

    pub async fn respond_error(&self, request: &Value, code: &str, message: &str) {
        self.respond(
            request,
            json!({ "success": false, "error": { "code": code, "message": message } }),
        )
        .await;
    }

    pub async fn push_event(&self, event: &str, data: Value) {
        self.send_text(json!({ "event": event, "data": data }).to_string())
            .await;
    }

    /// Close the current connection from the native side.
    pub async fn disconnect(&self) {
        if let Some(mut sink) = self.sink.lock().await.take() {
            let _ = sink.close().await;
        }
    }

    /// Drop the current socket without a close frame, as a crashed process would.
    pub async fn drop_connection(&self) {
        let read_task = self.reader.lock().unwrap().take();
        if let Some(read_task) = read_task {
            read_task.abort();
            let _ = read_task.await;
        }
        self.sink.lock().await.take();
    }

    /// Stop listening and drop the current socket without a close frame.
    ///
    /// The port is free again once this returns.
    pub async fn crash(mut self) {
        self.accept_task.abort();
        let _ = (&mut self.accept_task).await;
        self.drop_connection().await;
    }

    /// Stop accepting connections and drop the current one.
    pub async fn stop(self) {
        self.accept_task.abort();
        self.disconnect().await;
    }
}

/// Bind and release a loopback port so a later listener can take it.
pub async fn reserve_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to reserve port");
    listener.local_addr().expect("local addr").port()
}

/// Write a credential file the way the native process does.
pub fn write_credentials(path: &Path, port: u16, access_token: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create auth dir");
    }
    let contents = json!({
        "nlPort": port,
        "nlConnectToken": TEST_CONNECT_TOKEN,
        "nlToken": access_token,
    });
    fs::write(path, contents.to_string()).expect("Failed to write credentials");
}

pub fn auth_path(dir: &Path) -> PathBuf {
    dir.join(".tmp").join("auth_info.json")
}

pub fn test_config(auth_file: &Path) -> BridgeConfig {
    BridgeConfig::default()
        .with_auth_file(auth_file)
        .with_reconnect_delay(TEST_RECONNECT_DELAY)
}

pub async fn wait_for_state(client: &BridgeClient, state: ConnectionState) {
    timeout(TEST_TIMEOUT, client.wait_for_state(state))
        .await
        .expect("Timed out waiting for connection state");
}
