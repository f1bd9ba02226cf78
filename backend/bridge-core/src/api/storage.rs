use crate::error::CallError;
use crate::session::BridgeClient;

use serde_json::{Value, json};

/// `storage.*`: the native key-value store. Values are opaque strings.
pub struct Storage<'a> {
    pub(super) client: &'a BridgeClient,
}

impl Storage<'_> {
    pub async fn set_data(&self, key: &str, data: &str) -> Result<Value, CallError> {
        self.client
            .call("storage.setData", json!({ "key": key, "data": data }))
            .await
    }

    pub async fn get_data(&self, key: &str) -> Result<String, CallError> {
        self.client
            .call_as("storage.getData", json!({ "key": key }))
            .await
    }

    pub async fn get_keys(&self) -> Result<Vec<String>, CallError> {
        self.client.call_as("storage.getKeys", Value::Null).await
    }
}
