//! Shared building blocks for the neubridge workspace.
//!
//! - [`ErrorLocation`]: call-site capture attached to every error variant
//! - [`RedactedToken`]: secret string that never reaches logs or JSON
//!
//! Both `bridge-core` and the `neurun` runner depend on this crate; it has no
//! knowledge of the wire protocol or the native process.

pub mod error;
pub mod redacted_token;

pub use error::error_location::ErrorLocation;
pub use error::redact_error::RedactError;
pub use redacted_token::RedactedToken;
