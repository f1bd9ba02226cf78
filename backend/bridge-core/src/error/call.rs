//! Errors surfaced to RPC callers.
//!
//! Transport trouble never shows up here: it is absorbed by the reconnection
//! policy and the call simply waits in the offline queue. What a caller can
//! see is a rejection from the native side, a session that was shut down
//! underneath it, or a payload that could not be encoded or decoded.

use common::ErrorLocation;

use std::panic::Location;

use serde::Deserialize;
use thiserror::Error as ThisError;

/// Error code the native side returns when a request carried a stale access token.
pub const INVALID_TOKEN_CODE: &str = "NE_RT_INVTOKN";

/// Error object carried in a failed response frame: `data.error`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NativeError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl NativeError {
    pub fn is_invalid_token(&self) -> bool {
        self.code == INVALID_TOKEN_CODE
    }
}

#[derive(Debug, ThisError)]
pub enum CallError {
    #[error("Native Error: {code}: {message} {location}")]
    Native {
        code: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Malformed Response Error: {message} {location}")]
    MalformedResponse {
        message: String,
        location: ErrorLocation,
    },

    #[error("Session Closed Error: {message} {location}")]
    SessionClosed {
        message: String,
        location: ErrorLocation,
    },

    #[error("Encode Error: {message} {location}")]
    Encode {
        message: String,
        location: ErrorLocation,
    },

    #[error("Decode Error: {message} {location}")]
    Decode {
        message: String,
        location: ErrorLocation,
    },
}

impl CallError {
    #[track_caller]
    pub fn native(error: NativeError) -> Self {
        CallError::Native {
            code: error.code,
            message: error.message,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn malformed_response(message: impl Into<String>) -> Self {
        CallError::MalformedResponse {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn session_closed(message: impl Into<String>) -> Self {
        CallError::SessionClosed {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn encode(message: impl Into<String>) -> Self {
        CallError::Encode {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn decode(message: impl Into<String>) -> Self {
        CallError::Decode {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Native error code, if the native side rejected the call.
    pub fn code(&self) -> Option<&str> {
        match self {
            CallError::Native { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn is_invalid_token(&self) -> bool {
        self.code() == Some(INVALID_TOKEN_CODE)
    }

    pub fn is_session_closed(&self) -> bool {
        matches!(self, CallError::SessionClosed { .. })
    }
}

impl From<serde_json::Error> for CallError {
    #[track_caller]
    fn from(error: serde_json::Error) -> Self {
        CallError::Decode {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<base64::DecodeError> for CallError {
    #[track_caller]
    fn from(error: base64::DecodeError) -> Self {
        CallError::Decode {
            message: format!("invalid base64 payload: {error}"),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
