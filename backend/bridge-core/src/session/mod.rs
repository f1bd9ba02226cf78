//! Bridge session: one connection to one native process.
//!
//! A session is an actor. [`spawn_session`] starts a task that exclusively owns
//! the credentials, the connection state, the pending-call registry, the
//! offline queue and the retry timer, and returns a cloneable [`BridgeClient`]
//! that talks to it over a command channel.
//!
//! # Open sequence
//!
//! 1. Load credentials (absent: schedule a retry)
//! 2. Open the WebSocket (failure: schedule a retry)
//! 3. On open, flush the offline queue in order
//!
//! Calls made while the transport is not open wait in the offline queue; the
//! caller's future is settled by whichever attempt eventually transmits them.
//!
//! # Shutdown
//!
//! [`BridgeClient::shutdown`] cancels the retry timer, closes the transport,
//! removes the credential file, and rejects every pending and queued call with
//! [`CallError::SessionClosed`]. Calls made afterwards are rejected the same way.

mod connection_state;
mod queue;
mod reconnect;
mod registry;
pub(crate) mod transport;

pub use connection_state::ConnectionState;

pub(crate) use queue::{OfflineQueue, QueuedCall};
pub(crate) use reconnect::ReconnectPolicy;
pub(crate) use registry::{CallRegistry, Reply, Settlement};
pub(crate) use transport::{Transport, TransportEvent};

use crate::auth::{CredentialSource, Credentials};
use crate::config::BridgeConfig;
use crate::error::CallError;
use crate::events::{EventDispatcher, ListenerId, NativeEvent};
use crate::wire::{InboundFrame, RequestFrame};

use std::sync::Arc;

use log::{debug, error, info, trace, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot, watch};

const SHUTDOWN_REASON: &str = "was not settled before the session shut down";

// tokio's bounded channel panics on zero capacity
const MIN_COMMAND_CAPACITY: usize = 1;

/// Messages processed by the session actor, strictly in arrival order.
pub(crate) enum SessionCommand {
    Call {
        method: String,
        payload: Value,
        reply: Reply,
    },
    Transport {
        generation: u64,
        event: TransportEvent,
    },
    Retry,
    Shutdown {
        done: oneshot::Sender<()>,
    },
}

/// Handle to a running session.
///
/// Cloning is cheap; all clones drive the same session. Dropping every clone
/// does **not** stop the session, call [`BridgeClient::shutdown`] for that.
#[derive(Clone)]
pub struct BridgeClient {
    command_tx: mpsc::Sender<SessionCommand>,
    state_rx: watch::Receiver<ConnectionState>,
    events: EventDispatcher,
}

/// Start a session and begin connecting immediately.
///
/// Must be called from within a tokio runtime.
pub fn spawn_session(config: BridgeConfig, credentials: Arc<dyn CredentialSource>) -> BridgeClient {
    let (command_tx, command_rx) = mpsc::channel(config.command_capacity.max(MIN_COMMAND_CAPACITY));
    let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
    let events = EventDispatcher::new();

    let actor = SessionActor::new(
        config,
        credentials,
        command_tx.clone(),
        state_tx,
        events.clone(),
    );

    tokio::spawn(actor.run(command_rx));
    info!("Bridge session started");

    BridgeClient {
        command_tx,
        state_rx,
        events,
    }
}

impl BridgeClient {
    /// Invoke a native method and wait for its result.
    ///
    /// There is no timeout: the future stays pending until the native side
    /// answers or the session shuts down.
    pub async fn call(&self, method: &str, payload: Value) -> Result<Value, CallError> {
        let (reply, response) = oneshot::channel();

        self.command_tx
            .send(SessionCommand::Call {
                method: method.to_string(),
                payload,
                reply,
            })
            .await
            .map_err(|_| CallError::session_closed(format!("{method} issued after shutdown")))?;

        response
            .await
            .map_err(|_| CallError::session_closed(format!("{method} {SHUTDOWN_REASON}")))?
    }

    /// [`BridgeClient::call`] with the result decoded into `T`.
    pub async fn call_as<T: DeserializeOwned>(
        &self,
        method: &str,
        payload: Value,
    ) -> Result<T, CallError> {
        let value = self.call(method, payload).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Wait until the session reaches `target`.
    ///
    /// Returns `false` if the session stopped first.
    pub async fn wait_for_state(&self, target: ConnectionState) -> bool {
        let mut state_rx = self.state_rx.clone();
        let reached = state_rx.wait_for(|state| *state == target).await.is_ok();
        reached
    }

    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    pub fn on<F>(&self, name: &str, listener: F) -> ListenerId
    where
        F: Fn(&NativeEvent) + Send + Sync + 'static,
    {
        self.events.on(name, listener)
    }

    pub fn off(&self, name: &str, id: ListenerId) -> bool {
        self.events.off(name, id)
    }

    /// Tear the session down. Safe to call more than once.
    pub async fn shutdown(&self) {
        let (done, finished) = oneshot::channel();
        if self
            .command_tx
            .send(SessionCommand::Shutdown { done })
            .await
            .is_err()
        {
            trace!("Shutdown requested for a session that already stopped");
            return;
        }
        let _ = finished.await;
    }
}

pub(crate) struct SessionActor {
    config: BridgeConfig,
    source: Arc<dyn CredentialSource>,
    pub(crate) credentials: Option<Credentials>,
    state_tx: watch::Sender<ConnectionState>,
    command_tx: mpsc::Sender<SessionCommand>,
    pub(crate) registry: CallRegistry,
    pub(crate) queue: OfflineQueue,
    pub(crate) reconnect: ReconnectPolicy,
    pub(crate) transport: Transport,
    events: EventDispatcher,
}

impl SessionActor {
    pub(crate) fn new(
        config: BridgeConfig,
        source: Arc<dyn CredentialSource>,
        command_tx: mpsc::Sender<SessionCommand>,
        state_tx: watch::Sender<ConnectionState>,
        events: EventDispatcher,
    ) -> Self {
        Self {
            reconnect: ReconnectPolicy::new(config.reconnect_delay),
            config,
            source,
            credentials: None,
            state_tx,
            command_tx,
            registry: CallRegistry::new(),
            queue: OfflineQueue::new(),
            transport: Transport::new(),
            events,
        }
    }

    async fn run(mut self, mut command_rx: mpsc::Receiver<SessionCommand>) {
        self.open();

        while let Some(command) = command_rx.recv().await {
            match command {
                SessionCommand::Call {
                    method,
                    payload,
                    reply,
                } => {
                    let call = QueuedCall {
                        method,
                        payload,
                        reply,
                    };
                    if self.state().is_open() {
                        self.transmit(call).await;
                    } else {
                        debug!("Transport {}, queueing {}", self.state(), call.method);
                        self.queue.enqueue(call);
                    }
                }
                SessionCommand::Transport { generation, event } => {
                    if self.transport.is_current(generation) {
                        self.on_transport_event(event).await;
                    } else {
                        trace!("Ignoring event from abandoned transport #{generation}");
                    }
                }
                SessionCommand::Retry => {
                    self.reconnect.fired();
                    self.open();
                }
                SessionCommand::Shutdown { done } => {
                    self.shutdown().await;
                    let _ = done.send(());
                    break;
                }
            }
        }

        // Commands still buffered hold reply senders; dropping them settles
        // those callers with SessionClosed.
        command_rx.close();
        info!("Bridge session stopped");
    }

    pub(crate) fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    pub(crate) fn set_state(&self, state: ConnectionState) {
        let previous = self.state_tx.send_replace(state);
        if previous != state {
            debug!("Connection state: {previous} -> {state}");
        }
    }

    /// Load credentials and start a connection attempt.
    fn open(&mut self) {
        if matches!(
            self.state(),
            ConnectionState::Open | ConnectionState::Connecting | ConnectionState::Closing
        ) {
            return;
        }

        let Some(credentials) = self.source.load() else {
            debug!("Credentials not available yet");
            self.set_state(ConnectionState::Disconnected);
            self.schedule_retry();
            return;
        };

        let url = match credentials.endpoint(&self.config.extension_id) {
            Ok(url) => url,
            Err(e) => {
                warn!("Cannot build transport endpoint: {e}");
                self.set_state(ConnectionState::Disconnected);
                self.schedule_retry();
                return;
            }
        };

        self.credentials = Some(credentials);
        self.set_state(ConnectionState::Connecting);
        self.transport.open(url, self.command_tx.clone());
    }

    fn schedule_retry(&mut self) {
        let commands = self.command_tx.clone();
        self.reconnect.schedule(async move {
            let _ = commands.send(SessionCommand::Retry).await;
        });
    }

    async fn on_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Opened(sink) => {
                self.transport.attach(sink);
                self.set_state(ConnectionState::Open);
                info!("Connected with the native application");
                self.flush().await;
            }
            TransportEvent::Frame(raw) => self.on_frame(&raw),
            TransportEvent::Closed => {
                info!("Connection closed");
                self.lose_transport();
            }
            TransportEvent::Failed(e) => {
                debug!("Transport failed: {e}");
                self.lose_transport();
            }
        }
    }

    /// Forget the current connection and retry the whole open sequence later.
    fn lose_transport(&mut self) {
        self.transport.abandon();
        self.set_state(ConnectionState::Disconnected);
        if self.reconnect.is_pending() {
            return;
        }
        info!("Reconnecting in {:?}", self.reconnect.delay());
        self.schedule_retry();
    }

    fn on_frame(&mut self, raw: &str) {
        let frame = match InboundFrame::parse(raw) {
            Ok(frame) => frame,
            Err(e) => {
                trace!("Dropping unparseable frame: {e}");
                return;
            }
        };

        match frame {
            InboundFrame::Response(response) => {
                if let Settlement::Rejected {
                    invalid_token: true,
                } = self.registry.settle(response)
                {
                    warn!("Native side rejected the access token, credentials will be reloaded");
                    self.credentials = None;
                }
            }
            InboundFrame::Event(event) => {
                self.events.dispatch(&event.event, event.data);
            }
        }
    }

    /// Drain the offline queue into the open transport, oldest first.
    pub(crate) async fn flush(&mut self) {
        if self.queue.is_empty() {
            return;
        }

        let queued = self.queue.drain();
        debug!("Flushing {} queued call(s)", queued.len());

        let mut calls = queued.into_iter();
        while let Some(call) = calls.next() {
            if !self.state().is_open() {
                // Lost the transport mid-flush; keep the rest in order for the next open.
                self.queue.enqueue(call);
                calls.for_each(|rest| self.queue.enqueue(rest));
                break;
            }
            self.transmit(call).await;
        }
    }

    /// Register a call and write it to the open transport.
    pub(crate) async fn transmit(&mut self, call: QueuedCall) {
        if self.credentials.is_none() {
            self.credentials = self.source.load();
        }

        let Some(access_token) = self
            .credentials
            .as_ref()
            .map(|c| c.access_token.as_str().to_owned())
        else {
            debug!("No valid credentials for {}, reconnecting", call.method);
            self.queue.requeue(call);
            self.lose_transport();
            return;
        };

        let QueuedCall {
            method,
            payload,
            reply,
        } = call;

        let id = self.registry.register(method.clone(), reply);
        let frame = RequestFrame {
            id: &id,
            method: &method,
            data: &payload,
            access_token: &access_token,
        };

        let text = match frame.to_json() {
            Ok(text) => text,
            Err(e) => {
                if let Some(pending) = self.registry.take(&id) {
                    let _ = pending.reply.send(Err(e));
                }
                return;
            }
        };

        trace!("Sending {method} as {id}");
        if let Err(e) = self.transport.send_text(text).await {
            warn!("Failed to send {method}: {e}");
            if let Some(pending) = self.registry.take(&id) {
                self.queue.requeue(QueuedCall {
                    method: pending.method,
                    payload,
                    reply: pending.reply,
                });
            }
            self.lose_transport();
        }
    }

    async fn shutdown(&mut self) {
        self.set_state(ConnectionState::Closing);
        self.reconnect.cancel();
        self.transport.close().await;
        self.source.remove();
        self.credentials = None;

        let pending = self.registry.reject_all(SHUTDOWN_REASON);
        let queued = self.queue.discard(SHUTDOWN_REASON);
        if pending + queued > 0 {
            warn!("Shutdown rejected {pending} pending and {queued} queued call(s)");
        }

        self.set_state(ConnectionState::Disconnected);
        if self.registry.len() + self.queue.len() > 0 {
            error!("Calls left behind after shutdown");
        }
    }
}
