//! Calls issued while the transport is not open.

use crate::error::CallError;
use crate::session::registry::Reply;

use std::collections::VecDeque;

use serde_json::Value;

pub(crate) struct QueuedCall {
    pub(crate) method: String,
    pub(crate) payload: Value,
    pub(crate) reply: Reply,
}

/// FIFO buffer flushed once per transport-open transition.
#[derive(Default)]
pub(crate) struct OfflineQueue {
    calls: VecDeque<QueuedCall>,
}

impl OfflineQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn enqueue(&mut self, call: QueuedCall) {
        self.calls.push_back(call);
    }

    /// Put a call back at the head, ahead of everything still waiting.
    pub(crate) fn requeue(&mut self, call: QueuedCall) {
        self.calls.push_front(call);
    }

    /// Take every queued call, oldest first.
    pub(crate) fn drain(&mut self) -> Vec<QueuedCall> {
        self.calls.drain(..).collect()
    }

    /// Reject and drop every queued call. Returns how many were discarded.
    pub(crate) fn discard(&mut self, reason: &str) -> usize {
        let count = self.calls.len();
        for call in self.calls.drain(..) {
            let _ = call
                .reply
                .send(Err(CallError::session_closed(format!("{} {reason}", call.method))));
        }
        count
    }

    pub(crate) fn len(&self) -> usize {
        self.calls.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}
