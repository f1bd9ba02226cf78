use crate::error::CallError;
use crate::session::BridgeClient;

use serde_json::{Value, json};

/// `app.*`: the native application itself.
pub struct App<'a> {
    pub(super) client: &'a BridgeClient,
}

impl App<'_> {
    /// Ask the native application to quit with `code` (0 when `None`).
    pub async fn exit(&self, code: Option<i32>) -> Result<Value, CallError> {
        self.client.call("app.exit", json!({ "code": code })).await
    }

    pub async fn kill_process(&self) -> Result<Value, CallError> {
        self.client.call("app.killProcess", Value::Null).await
    }

    pub async fn get_config(&self) -> Result<Value, CallError> {
        self.client.call("app.getConfig", Value::Null).await
    }

    pub async fn broadcast(&self, event: &str, data: Value) -> Result<Value, CallError> {
        self.client
            .call("app.broadcast", json!({ "event": event, "data": data }))
            .await
    }

    pub async fn read_process_input(&self, read_all: bool) -> Result<String, CallError> {
        self.client
            .call_as("app.readProcessInput", json!({ "readAll": read_all }))
            .await
    }

    pub async fn write_process_output(&self, data: &str) -> Result<Value, CallError> {
        self.client
            .call("app.writeProcessOutput", json!({ "data": data }))
            .await
    }

    pub async fn write_process_error(&self, data: &str) -> Result<Value, CallError> {
        self.client
            .call("app.writeProcessError", json!({ "data": data }))
            .await
    }
}
