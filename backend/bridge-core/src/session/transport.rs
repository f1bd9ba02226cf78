//! The WebSocket connection to the native process.
//!
//! One connection attempt runs as a background task that reports back to the
//! session through its command channel. Every attempt gets a generation number;
//! the session ignores reports from attempts it has already abandoned, so at
//! most one connection is ever live.

use crate::error::TransportError;
use crate::session::SessionCommand;

use common::ErrorLocation;

use std::panic::Location;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use log::{debug, trace, warn};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

pub(crate) type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// What a connection task reports.
pub(crate) enum TransportEvent {
    Opened(WsSink),
    Frame(String),
    Closed,
    Failed(TransportError),
}

#[derive(Default)]
pub(crate) struct Transport {
    generation: u64,
    sink: Option<WsSink>,
    task: Option<JoinHandle<()>>,
}

impl Transport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Abandon any current connection and start a new attempt.
    pub(crate) fn open(&mut self, url: Url, commands: mpsc::Sender<SessionCommand>) -> u64 {
        self.abandon();
        self.generation += 1;

        let generation = self.generation;
        debug!(
            "Opening transport #{generation} to {}",
            url.origin().ascii_serialization()
        );
        self.task = Some(tokio::spawn(run_connection(url, generation, commands)));
        generation
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Adopt the write half of the current attempt once it has connected.
    pub(crate) fn attach(&mut self, sink: WsSink) {
        self.sink = Some(sink);
    }

    pub(crate) async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        let sink = self.sink.as_mut().ok_or_else(TransportError::not_connected)?;
        sink.send(Message::Text(text.into())).await?;
        Ok(())
    }

    /// Drop the connection without a close handshake.
    pub(crate) fn abandon(&mut self) {
        self.sink = None;
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Close the connection with a close frame, then stop the reader.
    pub(crate) async fn close(&mut self) {
        if let Some(mut sink) = self.sink.take() {
            if let Err(e) = sink.close().await {
                debug!("Transport close handshake failed: {e}");
            }
        }
        self.abandon();
        // Late reports from the closed attempt must not look current.
        self.generation += 1;
    }
}

pub(crate) async fn run_connection(url: Url, generation: u64, commands: mpsc::Sender<SessionCommand>) {
    let report = |event| SessionCommand::Transport { generation, event };

    let ws_stream = match connect_async(url.as_str()).await {
        Ok((ws_stream, _response)) => ws_stream,
        Err(e) => {
            let error = TransportError::Connect {
                message: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            };
            let _ = commands.send(report(TransportEvent::Failed(error))).await;
            return;
        }
    };

    let (sink, mut stream) = ws_stream.split();
    if commands.send(report(TransportEvent::Opened(sink))).await.is_err() {
        return;
    }

    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Text(text)) => {
                let frame = TransportEvent::Frame(text.as_str().to_owned());
                if commands.send(report(frame)).await.is_err() {
                    return;
                }
            }
            Ok(Message::Close(frame)) => {
                trace!("Native side closed transport #{generation}: {frame:?}");
                break;
            }
            Ok(Message::Binary(_)) => warn!("Ignoring binary frame on transport #{generation}"),
            Ok(_) => {}
            Err(e) => {
                let error = TransportError::Receive {
                    message: e.to_string(),
                    location: ErrorLocation::from(Location::caller()),
                };
                let _ = commands.send(report(TransportEvent::Failed(error))).await;
                return;
            }
        }
    }

    let _ = commands.send(report(TransportEvent::Closed)).await;
}
