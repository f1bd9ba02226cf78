//! JSON frames exchanged with the native process.
//!
//! Outbound: `{id, method, data, accessToken}`.
//! Inbound: either a response `{id, data: {success, error?, returnValue?}}` or
//! an unsolicited event `{event, data}`. Binary blobs travel as base64 text in
//! both directions.

use crate::error::{CallError, NativeError};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const RETURN_VALUE_FIELD: &str = "returnValue";
const SUCCESS_FIELD: &str = "success";
const ERROR_FIELD: &str = "error";

/// Request written to the transport for one call.
#[derive(Debug, Serialize)]
pub struct RequestFrame<'a> {
    pub id: &'a str,
    pub method: &'a str,
    #[serde(skip_serializing_if = "is_absent")]
    pub data: &'a Value,
    #[serde(rename = "accessToken")]
    pub access_token: &'a str,
}

fn is_absent(data: &&Value) -> bool {
    data.is_null()
}

impl RequestFrame<'_> {
    pub fn to_json(&self) -> Result<String, CallError> {
        serde_json::to_string(self).map_err(|e| CallError::encode(format!("request frame: {e}")))
    }
}

/// Reply to an earlier request, correlated by `id`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseFrame {
    pub id: String,
    #[serde(default)]
    pub data: Value,
}

/// Server-pushed message with no correlation id.
#[derive(Debug, Clone, Deserialize)]
pub struct EventFrame {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

/// Anything the native side can send us.
///
/// Responses are tried first, so a frame carrying an `id` is always treated as
/// a response even if it also names an event.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InboundFrame {
    Response(ResponseFrame),
    Event(EventFrame),
}

impl InboundFrame {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// How a response settles its call.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseOutcome {
    Success(Value),
    Failure(NativeError),
    Malformed(Value),
}

impl ResponseFrame {
    /// Classify the response payload.
    ///
    /// An `error` object wins over `success`. A successful response yields its
    /// `returnValue` when present, otherwise the whole `data` object.
    pub fn outcome(self) -> ResponseOutcome {
        if let Some(error) = self.data.get(ERROR_FIELD).filter(|e| !e.is_null()) {
            let native = serde_json::from_value::<NativeError>(error.clone()).unwrap_or_else(|_| {
                NativeError {
                    code: String::new(),
                    message: error.to_string(),
                }
            });
            return ResponseOutcome::Failure(native);
        }

        let succeeded = self
            .data
            .get(SUCCESS_FIELD)
            .and_then(Value::as_bool)
            .unwrap_or(false);

        if !succeeded {
            return ResponseOutcome::Malformed(self.data);
        }

        match self.data {
            Value::Object(mut map) if map.contains_key(RETURN_VALUE_FIELD) => {
                ResponseOutcome::Success(map.remove(RETURN_VALUE_FIELD).unwrap_or(Value::Null))
            }
            data => ResponseOutcome::Success(data),
        }
    }
}

pub fn encode_binary(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

pub fn decode_binary(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    BASE64.decode(text)
}
