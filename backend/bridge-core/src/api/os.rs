use crate::api::merge_options;
use crate::error::CallError;
use crate::session::BridgeClient;

use serde_json::{Value, json};

/// `os.*`
pub struct Os<'a> {
    pub(super) client: &'a BridgeClient,
}

impl Os<'_> {
    /// Run a shell command. `options` may set `background`, `stdIn` or `cwd`.
    pub async fn exec_command(
        &self,
        command: &str,
        options: Option<Value>,
    ) -> Result<Value, CallError> {
        let payload = merge_options(json!({ "command": command }), options);
        self.client.call("os.execCommand", payload).await
    }

    /// Start a long-running process. Its output arrives as `spawnedProcess` events.
    pub async fn spawn_process(&self, command: &str, cwd: Option<&str>) -> Result<Value, CallError> {
        self.client
            .call("os.spawnProcess", json!({ "command": command, "cwd": cwd }))
            .await
    }

    pub async fn update_spawned_process(
        &self,
        id: i64,
        event: &str,
        data: Value,
    ) -> Result<Value, CallError> {
        self.client
            .call(
                "os.updateSpawnedProcess",
                json!({ "id": id, "event": event, "data": data }),
            )
            .await
    }

    pub async fn get_spawned_processes(&self) -> Result<Vec<Value>, CallError> {
        self.client
            .call_as("os.getSpawnedProcesses", Value::Null)
            .await
    }

    pub async fn get_env(&self, key: &str) -> Result<String, CallError> {
        self.client.call_as("os.getEnv", json!({ "key": key })).await
    }

    pub async fn get_envs(&self) -> Result<Value, CallError> {
        self.client.call("os.getEnvs", Value::Null).await
    }

    pub async fn show_open_dialog(
        &self,
        title: &str,
        options: Option<Value>,
    ) -> Result<Vec<String>, CallError> {
        let payload = merge_options(json!({ "title": title }), options);
        self.client.call_as("os.showOpenDialog", payload).await
    }

    pub async fn show_folder_dialog(
        &self,
        title: &str,
        options: Option<Value>,
    ) -> Result<String, CallError> {
        let payload = merge_options(json!({ "title": title }), options);
        self.client.call_as("os.showFolderDialog", payload).await
    }

    pub async fn show_save_dialog(
        &self,
        title: &str,
        options: Option<Value>,
    ) -> Result<String, CallError> {
        let payload = merge_options(json!({ "title": title }), options);
        self.client.call_as("os.showSaveDialog", payload).await
    }

    pub async fn show_notification(
        &self,
        title: &str,
        content: &str,
        icon: Option<&str>,
    ) -> Result<Value, CallError> {
        self.client
            .call(
                "os.showNotification",
                json!({ "title": title, "content": content, "icon": icon }),
            )
            .await
    }

    /// Returns the button the user picked, e.g. `"YES"`.
    pub async fn show_message_box(
        &self,
        title: &str,
        content: &str,
        choice: Option<&str>,
        icon: Option<&str>,
    ) -> Result<String, CallError> {
        self.client
            .call_as(
                "os.showMessageBox",
                json!({ "title": title, "content": content, "choice": choice, "icon": icon }),
            )
            .await
    }

    pub async fn set_tray(&self, options: Value) -> Result<Value, CallError> {
        self.client.call("os.setTray", options).await
    }

    /// Open a URL with the default handler.
    pub async fn open(&self, url: &str) -> Result<Value, CallError> {
        self.client.call("os.open", json!({ "url": url })).await
    }

    pub async fn get_path(&self, name: &str) -> Result<String, CallError> {
        self.client.call_as("os.getPath", json!({ "name": name })).await
    }
}
