//! Correlation of outbound requests with their responses.

use crate::error::CallError;
use crate::wire::{ResponseFrame, ResponseOutcome};

use std::collections::HashMap;

use log::{debug, trace};
use serde_json::Value;
use tokio::sync::oneshot;
use uuid::Uuid;

pub(crate) type Reply = oneshot::Sender<Result<Value, CallError>>;

/// A request written to the transport and awaiting its response.
pub(crate) struct PendingCall {
    pub(crate) method: String,
    pub(crate) reply: Reply,
}

/// What a response frame did to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Settlement {
    Resolved,
    Rejected { invalid_token: bool },
    Unmatched,
}

#[derive(Default)]
pub(crate) struct CallRegistry {
    pending: HashMap<String, PendingCall>,
}

impl CallRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record a call and return its fresh correlation id.
    pub(crate) fn register(&mut self, method: String, reply: Reply) -> String {
        let mut id = Uuid::new_v4().to_string();
        while self.pending.contains_key(&id) {
            id = Uuid::new_v4().to_string();
        }

        trace!("Registered call {id} ({method})");
        self.pending.insert(id.clone(), PendingCall { method, reply });
        id
    }

    /// Remove a call without settling it.
    pub(crate) fn take(&mut self, id: &str) -> Option<PendingCall> {
        self.pending.remove(id)
    }

    /// Settle the call matching `frame.id`, exactly once.
    pub(crate) fn settle(&mut self, frame: ResponseFrame) -> Settlement {
        let Some(call) = self.pending.remove(&frame.id) else {
            trace!("Dropping response for unknown call {}", frame.id);
            return Settlement::Unmatched;
        };

        let (result, settlement) = match frame.outcome() {
            ResponseOutcome::Success(value) => (Ok(value), Settlement::Resolved),
            ResponseOutcome::Failure(error) => {
                let invalid_token = error.is_invalid_token();
                debug!("{} rejected: {} {}", call.method, error.code, error.message);
                (
                    Err(CallError::native(error)),
                    Settlement::Rejected { invalid_token },
                )
            }
            ResponseOutcome::Malformed(data) => (
                Err(CallError::malformed_response(format!(
                    "{} response has neither success nor error: {data}",
                    call.method
                ))),
                Settlement::Rejected {
                    invalid_token: false,
                },
            ),
        };

        // The caller may have stopped waiting; that is not our concern.
        let _ = call.reply.send(result);
        settlement
    }

    /// Reject every pending call. Returns how many were rejected.
    pub(crate) fn reject_all(&mut self, reason: &str) -> usize {
        let count = self.pending.len();
        for (_, call) in self.pending.drain() {
            let _ = call
                .reply
                .send(Err(CallError::session_closed(format!("{} {reason}", call.method))));
        }
        count
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, id: &str) -> bool {
        self.pending.contains_key(id)
    }
}
