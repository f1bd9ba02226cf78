pub mod call;
pub mod config;
pub mod launch;
pub mod transport;

pub use call::{CallError, INVALID_TOKEN_CODE, NativeError};
pub use config::ConfigError;
pub use launch::LaunchError;
pub use transport::TransportError;

use thiserror::Error;

/// Errors a caller of the library can receive.
///
/// [`TransportError`] is not part of it: transport failures stay inside the
/// session, which logs them and reconnects.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Call(#[from] CallError),

    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
