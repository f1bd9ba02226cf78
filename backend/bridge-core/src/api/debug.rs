use crate::error::CallError;
use crate::session::BridgeClient;

use std::fmt::{self, Display};

use serde_json::{Value, json};

/// Severity understood by the native log writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    #[default]
    Info,
    Warning,
    Error,
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// `debug.*`
pub struct DebugLog<'a> {
    pub(super) client: &'a BridgeClient,
}

impl DebugLog<'_> {
    /// Write `message` to the native application's log.
    pub async fn log(&self, message: &str, level: LogLevel) -> Result<Value, CallError> {
        self.client
            .call(
                "debug.log",
                json!({ "message": message, "type": level.to_string() }),
            )
            .await
    }
}
