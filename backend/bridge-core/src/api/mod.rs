//! Typed wrappers over the native API domains.
//!
//! Every method is a single [`BridgeClient::call`]; none of them add retries,
//! timeouts or caching. Binary data is base64 on the wire and `Vec<u8>` here.
//!
//! ```no_run
//! # async fn demo(client: bridge_core::BridgeClient) -> Result<(), bridge_core::CallError> {
//! client.window().set_title("Hello").await?;
//! let bytes = client.filesystem().read_binary_file("data.bin", None).await?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod clipboard;
pub mod computer;
pub mod custom;
pub mod debug;
pub mod events;
pub mod filesystem;
pub mod os;
pub mod storage;
pub mod window;

pub use app::App;
pub use clipboard::{Clipboard, ClipboardImage};
pub use computer::Computer;
pub use custom::Custom;
pub use debug::{DebugLog, LogLevel};
pub use events::{Events, Extensions};
pub use filesystem::Filesystem;
pub use os::Os;
pub use storage::Storage;
pub use window::Window;

use crate::session::BridgeClient;

use serde_json::Value;

impl BridgeClient {
    pub fn app(&self) -> App<'_> {
        App { client: self }
    }

    pub fn clipboard(&self) -> Clipboard<'_> {
        Clipboard { client: self }
    }

    pub fn computer(&self) -> Computer<'_> {
        Computer { client: self }
    }

    pub fn custom(&self) -> Custom<'_> {
        Custom { client: self }
    }

    pub fn debug(&self) -> DebugLog<'_> {
        DebugLog { client: self }
    }

    pub fn native_events(&self) -> Events<'_> {
        Events { client: self }
    }

    pub fn extensions(&self) -> Extensions<'_> {
        Extensions { client: self }
    }

    pub fn filesystem(&self) -> Filesystem<'_> {
        Filesystem { client: self }
    }

    pub fn os(&self) -> Os<'_> {
        Os { client: self }
    }

    pub fn storage(&self) -> Storage<'_> {
        Storage { client: self }
    }

    pub fn window(&self) -> Window<'_> {
        Window { client: self }
    }
}

/// Overlay the fields of `extra` onto `base`. Fields in `extra` win.
///
/// A null `base` is replaced by `extra`; any other non-object pairing leaves
/// `base` unchanged.
pub(crate) fn merge_options(base: Value, extra: Option<Value>) -> Value {
    match (base, extra) {
        (Value::Object(mut fields), Some(Value::Object(overrides))) => {
            fields.extend(overrides);
            Value::Object(fields)
        }
        (Value::Null, Some(extra)) => extra,
        (base, _) => base,
    }
}
