use crate::error::CallError;
use crate::session::BridgeClient;

use serde_json::{Value, json};

/// `events.*`: events sent to every connected client of the app.
pub struct Events<'a> {
    pub(super) client: &'a BridgeClient,
}

impl Events<'_> {
    pub async fn broadcast(&self, event: &str, data: Value) -> Result<Value, CallError> {
        self.client
            .call("events.broadcast", json!({ "event": event, "data": data }))
            .await
    }
}

/// `extensions.*`: events sent to extensions only.
pub struct Extensions<'a> {
    pub(super) client: &'a BridgeClient,
}

impl Extensions<'_> {
    pub async fn broadcast(&self, event: &str, data: Value) -> Result<Value, CallError> {
        self.client
            .call("extensions.broadcast", json!({ "event": event, "data": data }))
            .await
    }

    pub async fn get_stats(&self) -> Result<Value, CallError> {
        self.client.call("extensions.getStats", Value::Null).await
    }
}
