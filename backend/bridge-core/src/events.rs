//! Routing of server-pushed events to registered listeners.
//!
//! Listeners run synchronously on the session task that received the frame,
//! in registration order. A panicking listener is contained so the remaining
//! listeners for the same event still run.

use crate::wire::decode_binary;

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{error, trace, warn};
use serde_json::{Map, Value};

/// Event whose `dataBinary` chunks carry base64 file contents.
pub const OPENED_FILE_EVENT: &str = "openedFile";

const BINARY_ACTION: &str = "dataBinary";
const ACTION_FIELD: &str = "action";
const DATA_FIELD: &str = "data";

/// Payload handed to listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    Json(Value),
    /// Binary chunk: the remaining fields of the event object plus the decoded bytes.
    Binary {
        meta: Map<String, Value>,
        bytes: Vec<u8>,
    },
}

impl EventPayload {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            EventPayload::Json(value) => Some(value),
            EventPayload::Binary { .. } => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            EventPayload::Binary { bytes, .. } => Some(bytes),
            EventPayload::Json(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NativeEvent {
    pub name: String,
    pub payload: EventPayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&NativeEvent) + Send + Sync>;

/// Listener table shared by every clone of a session's client.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    listeners: Arc<Mutex<HashMap<String, Vec<(ListenerId, Listener)>>>>,
    next_id: Arc<AtomicU64>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `name`. Returns a handle for [`EventDispatcher::off`].
    pub fn on<F>(&self, name: &str, listener: F) -> ListenerId
    where
        F: Fn(&NativeEvent) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.table()
            .entry(name.to_string())
            .or_default()
            .push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered for `name`.
    pub fn off(&self, name: &str, id: ListenerId) -> bool {
        let mut table = self.table();
        let Some(entries) = table.get_mut(name) else {
            return false;
        };

        let before = entries.len();
        entries.retain(|(existing, _)| *existing != id);
        let removed = entries.len() != before;

        if entries.is_empty() {
            table.remove(name);
        }
        removed
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.table().get(name).map_or(0, Vec::len)
    }

    /// Deliver an event to every listener registered for `name`.
    ///
    /// Returns how many listeners completed without panicking.
    pub fn dispatch(&self, name: &str, data: Value) -> usize {
        // Snapshot so listeners may call on/off without deadlocking.
        let listeners: Vec<Listener> = match self.table().get(name) {
            Some(entries) => entries.iter().map(|(_, l)| Arc::clone(l)).collect(),
            None => {
                trace!("No listeners for event '{name}'");
                return 0;
            }
        };

        let event = NativeEvent {
            name: name.to_string(),
            payload: decode_payload(name, data),
        };

        let mut completed = 0;
        for listener in listeners {
            match catch_unwind(AssertUnwindSafe(|| listener(&event))) {
                Ok(()) => completed += 1,
                Err(_) => error!("Listener for event '{name}' panicked"),
            }
        }
        completed
    }

    fn table(&self) -> MutexGuard<'_, HashMap<String, Vec<(ListenerId, Listener)>>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Turn wire data into a listener payload, decoding base64 file chunks.
pub fn decode_payload(name: &str, data: Value) -> EventPayload {
    if name != OPENED_FILE_EVENT {
        return EventPayload::Json(data);
    }

    let mut meta = match data {
        Value::Object(meta) => meta,
        other => return EventPayload::Json(other),
    };

    let is_binary = meta.get(ACTION_FIELD).and_then(Value::as_str) == Some(BINARY_ACTION);
    let encoded = match meta.get(DATA_FIELD) {
        Some(Value::String(encoded)) if is_binary => encoded.clone(),
        _ => return EventPayload::Json(Value::Object(meta)),
    };

    match decode_binary(&encoded) {
        Ok(bytes) => {
            meta.remove(DATA_FIELD);
            EventPayload::Binary { meta, bytes }
        }
        Err(e) => {
            warn!("Undecodable binary chunk in '{name}' event: {e}");
            EventPayload::Json(Value::Object(meta))
        }
    }
}
