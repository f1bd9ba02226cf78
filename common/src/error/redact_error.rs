use crate::ErrorLocation;

use thiserror::Error as ThisError;

/// Refusals from [`crate::RedactedToken`].
#[derive(Debug, ThisError)]
pub enum RedactError {
    /// A token was about to be written into a serialized document.
    #[error("Refused To Serialize Secret: {message} {location}")]
    SerializeRefused {
        message: String,
        location: ErrorLocation,
    },
}
