use crate::api::merge_options;
use crate::error::CallError;
use crate::lifecycle::args::window_command;
use crate::session::BridgeClient;

use std::collections::BTreeMap;

use serde_json::{Value, json};

/// `window.*`: the native window hosting the app.
pub struct Window<'a> {
    pub(super) client: &'a BridgeClient,
}

impl Window<'_> {
    pub async fn set_title(&self, title: &str) -> Result<Value, CallError> {
        self.client
            .call("window.setTitle", json!({ "title": title }))
            .await
    }

    pub async fn get_title(&self) -> Result<String, CallError> {
        self.client.call_as("window.getTitle", Value::Null).await
    }

    pub async fn maximize(&self) -> Result<Value, CallError> {
        self.client.call("window.maximize", Value::Null).await
    }

    pub async fn unmaximize(&self) -> Result<Value, CallError> {
        self.client.call("window.unmaximize", Value::Null).await
    }

    pub async fn is_maximized(&self) -> Result<bool, CallError> {
        self.client.call_as("window.isMaximized", Value::Null).await
    }

    pub async fn minimize(&self) -> Result<Value, CallError> {
        self.client.call("window.minimize", Value::Null).await
    }

    pub async fn set_full_screen(&self) -> Result<Value, CallError> {
        self.client.call("window.setFullScreen", Value::Null).await
    }

    pub async fn exit_full_screen(&self) -> Result<Value, CallError> {
        self.client.call("window.exitFullScreen", Value::Null).await
    }

    pub async fn is_full_screen(&self) -> Result<bool, CallError> {
        self.client.call_as("window.isFullScreen", Value::Null).await
    }

    pub async fn show(&self) -> Result<Value, CallError> {
        self.client.call("window.show", Value::Null).await
    }

    pub async fn hide(&self) -> Result<Value, CallError> {
        self.client.call("window.hide", Value::Null).await
    }

    pub async fn is_visible(&self) -> Result<bool, CallError> {
        self.client.call_as("window.isVisible", Value::Null).await
    }

    pub async fn focus(&self) -> Result<Value, CallError> {
        self.client.call("window.focus", Value::Null).await
    }

    pub async fn set_icon(&self, icon: &str) -> Result<Value, CallError> {
        self.client
            .call("window.setIcon", json!({ "icon": icon }))
            .await
    }

    pub async fn move_to(&self, x: i32, y: i32) -> Result<Value, CallError> {
        self.client
            .call("window.move", json!({ "x": x, "y": y }))
            .await
    }

    pub async fn center(&self) -> Result<Value, CallError> {
        self.client.call("window.center", Value::Null).await
    }

    /// Resize the window.
    ///
    /// Fields missing from `options` keep their current values: the current
    /// size is fetched first and `options` is laid over it.
    pub async fn set_size(&self, options: Value) -> Result<Value, CallError> {
        let current = self.get_size().await?;
        let merged = merge_options(current, Some(options));
        self.client.call("window.setSize", merged).await
    }

    pub async fn get_size(&self) -> Result<Value, CallError> {
        self.client.call("window.getSize", Value::Null).await
    }

    pub async fn get_position(&self) -> Result<Value, CallError> {
        self.client.call("window.getPosition", Value::Null).await
    }

    pub async fn set_always_on_top(&self, on_top: bool) -> Result<Value, CallError> {
        self.client
            .call("window.setAlwaysOnTop", json!({ "onTop": on_top }))
            .await
    }

    /// Open a child window through `os.execCommand`.
    ///
    /// `options` map to `--window-*` flags like the main window's; child
    /// windows never restore saved state.
    pub async fn create(
        &self,
        url: &str,
        options: &BTreeMap<String, Value>,
    ) -> Result<Value, CallError> {
        let command = window_command(url, options);
        self.client
            .os()
            .exec_command(&command, Some(json!({ "background": true })))
            .await
    }
}
