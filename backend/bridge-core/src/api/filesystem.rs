use crate::api::merge_options;
use crate::error::CallError;
use crate::session::BridgeClient;
use crate::wire::{decode_binary, encode_binary};

use serde_json::{Value, json};

/// `filesystem.*`
///
/// `options` arguments are merged into the request object as-is, so any
/// field the native side accepts (`pos`, `size`, `recursive`, ...) can be
/// passed through.
pub struct Filesystem<'a> {
    pub(super) client: &'a BridgeClient,
}

impl Filesystem<'_> {
    pub async fn create_directory(&self, path: &str) -> Result<Value, CallError> {
        self.client
            .call("filesystem.createDirectory", json!({ "path": path }))
            .await
    }

    pub async fn remove(&self, path: &str) -> Result<Value, CallError> {
        self.client
            .call("filesystem.remove", json!({ "path": path }))
            .await
    }

    pub async fn write_file(&self, path: &str, data: &str) -> Result<Value, CallError> {
        self.client
            .call("filesystem.writeFile", json!({ "path": path, "data": data }))
            .await
    }

    pub async fn append_file(&self, path: &str, data: &str) -> Result<Value, CallError> {
        self.client
            .call("filesystem.appendFile", json!({ "path": path, "data": data }))
            .await
    }

    pub async fn write_binary_file(&self, path: &str, data: &[u8]) -> Result<Value, CallError> {
        self.client
            .call(
                "filesystem.writeBinaryFile",
                json!({ "path": path, "data": encode_binary(data) }),
            )
            .await
    }

    pub async fn append_binary_file(&self, path: &str, data: &[u8]) -> Result<Value, CallError> {
        self.client
            .call(
                "filesystem.appendBinaryFile",
                json!({ "path": path, "data": encode_binary(data) }),
            )
            .await
    }

    pub async fn read_file(&self, path: &str, options: Option<Value>) -> Result<String, CallError> {
        let payload = merge_options(json!({ "path": path }), options);
        self.client.call_as("filesystem.readFile", payload).await
    }

    pub async fn read_binary_file(
        &self,
        path: &str,
        options: Option<Value>,
    ) -> Result<Vec<u8>, CallError> {
        let payload = merge_options(json!({ "path": path }), options);
        let encoded: String = self
            .client
            .call_as("filesystem.readBinaryFile", payload)
            .await?;
        Ok(decode_binary(&encoded)?)
    }

    pub async fn read_directory(
        &self,
        path: &str,
        options: Option<Value>,
    ) -> Result<Vec<Value>, CallError> {
        let payload = merge_options(json!({ "path": path }), options);
        self.client.call_as("filesystem.readDirectory", payload).await
    }

    pub async fn copy(&self, source: &str, destination: &str) -> Result<Value, CallError> {
        self.client
            .call(
                "filesystem.copy",
                json!({ "source": source, "destination": destination }),
            )
            .await
    }

    /// `filesystem.move`.
    pub async fn move_path(&self, source: &str, destination: &str) -> Result<Value, CallError> {
        self.client
            .call(
                "filesystem.move",
                json!({ "source": source, "destination": destination }),
            )
            .await
    }

    pub async fn get_stats(&self, path: &str) -> Result<Value, CallError> {
        self.client
            .call("filesystem.getStats", json!({ "path": path }))
            .await
    }

    /// Open a file for streaming reads. Chunks arrive as `openedFile` events.
    pub async fn open_file(&self, path: &str) -> Result<i64, CallError> {
        self.client
            .call_as("filesystem.openFile", json!({ "path": path }))
            .await
    }

    pub async fn update_opened_file(
        &self,
        id: i64,
        event: &str,
        data: Value,
    ) -> Result<Value, CallError> {
        self.client
            .call(
                "filesystem.updateOpenedFile",
                json!({ "id": id, "event": event, "data": data }),
            )
            .await
    }

    pub async fn get_opened_file_info(&self, id: i64) -> Result<Value, CallError> {
        self.client
            .call("filesystem.getOpenedFileInfo", json!({ "id": id }))
            .await
    }

    pub async fn create_watcher(&self, path: &str) -> Result<i64, CallError> {
        self.client
            .call_as("filesystem.createWatcher", json!({ "path": path }))
            .await
    }

    pub async fn remove_watcher(&self, id: i64) -> Result<Value, CallError> {
        self.client
            .call("filesystem.removeWatcher", json!({ "id": id }))
            .await
    }

    pub async fn get_watchers(&self) -> Result<Vec<Value>, CallError> {
        self.client.call_as("filesystem.getWatchers", Value::Null).await
    }
}
