pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod session;
pub mod wire;

#[cfg(test)]
mod tests;

pub use auth::{AuthFile, CredentialSource, Credentials};
pub use config::{BridgeConfig, RunnerConfig};
pub use error::{CallError, CoreError};
pub use events::{EventDispatcher, EventPayload, ListenerId, NativeEvent};
pub use lifecycle::{LaunchSpec, LifecycleController, NativeApp, NativeExit};
pub use session::{BridgeClient, ConnectionState, spawn_session};

pub const NATIVE_HOST: &str = "127.0.0.1";
pub const NATIVE_WS_BASE_URL: &str = const_format::concatcp!("ws://", NATIVE_HOST);
pub const DEV_EXTENSION_ID: &str = "js.neutralino.devtools";
pub const DEFAULT_AUTH_FILE: &str = ".tmp/auth_info.json";
