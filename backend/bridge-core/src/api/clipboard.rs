use crate::error::CallError;
use crate::session::BridgeClient;
use crate::wire::{decode_binary, encode_binary};

use serde_json::{Map, Value, json};

const IMAGE_DATA_FIELD: &str = "data";

/// Image read from or written to the clipboard.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardImage {
    /// Geometry and pixel format fields, as the native side reports them.
    pub meta: Map<String, Value>,
    pub data: Vec<u8>,
}

/// `clipboard.*`
pub struct Clipboard<'a> {
    pub(super) client: &'a BridgeClient,
}

impl Clipboard<'_> {
    pub async fn get_format(&self) -> Result<String, CallError> {
        self.client.call_as("clipboard.getFormat", Value::Null).await
    }

    pub async fn read_text(&self) -> Result<String, CallError> {
        self.client.call_as("clipboard.readText", Value::Null).await
    }

    pub async fn write_text(&self, data: &str) -> Result<Value, CallError> {
        self.client
            .call("clipboard.writeText", json!({ "data": data }))
            .await
    }

    /// `None` when the clipboard holds no image.
    pub async fn read_image(&self) -> Result<Option<ClipboardImage>, CallError> {
        let mut meta = match self.client.call("clipboard.readImage", Value::Null).await? {
            Value::Object(meta) => meta,
            Value::Null => return Ok(None),
            other => {
                return Err(CallError::decode(format!(
                    "clipboard image is not an object: {other}"
                )));
            }
        };

        let data = match meta.remove(IMAGE_DATA_FIELD) {
            Some(Value::String(encoded)) => decode_binary(&encoded)?,
            _ => Vec::new(),
        };
        Ok(Some(ClipboardImage { meta, data }))
    }

    pub async fn write_image(&self, image: &ClipboardImage) -> Result<Value, CallError> {
        let mut props = image.meta.clone();
        props.insert(
            IMAGE_DATA_FIELD.to_string(),
            Value::String(encode_binary(&image.data)),
        );
        self.client
            .call("clipboard.writeImage", Value::Object(props))
            .await
    }

    pub async fn clear(&self) -> Result<Value, CallError> {
        self.client.call("clipboard.clear", Value::Null).await
    }
}
