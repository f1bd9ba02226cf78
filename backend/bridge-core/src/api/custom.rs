use crate::error::CallError;
use crate::session::BridgeClient;

use serde_json::Value;

/// `custom.*`: methods added to the native binary by the app itself.
pub struct Custom<'a> {
    pub(super) client: &'a BridgeClient,
}

impl Custom<'_> {
    /// Names of the custom methods the native binary was built with.
    pub async fn get_methods(&self) -> Result<Vec<String>, CallError> {
        self.client.call_as("custom.getMethods", Value::Null).await
    }
}
