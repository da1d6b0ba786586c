use std::result::Result as StdResult;

use thiserror::Error;

use crate::wizard::StepId;

/// Message shown when a collaborator fails without telling us why.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Contract violations raised by the wizard controller.
///
/// Field validation failures are never reported through this type; they travel
/// as [`crate::wizard::ValidationResult`] values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("Fragment for `{found}` submitted while the wizard is at `{expected}`")]
    FragmentMismatch { expected: StepId, found: StepId },
    #[error("Step `{0}` is not part of this wizard")]
    UnknownStep(StepId),
    #[error("Submission ticket {0} does not match the submission in flight")]
    StaleTicket(uuid::Uuid),
    #[error("Wizard is not accepting input: {0}")]
    NotAccepting(String),
}

/// Failures while loading an existing record for edit mode.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HydrationError {
    #[error("{0}")]
    Fetch(String),
    #[error("Record {0} was not returned by the server")]
    Missing(String),
    #[error(transparent)]
    Incompatible(#[from] WizardError),
}

impl HydrationError {
    /// Text the surrounding page shows next to its "back to listing" action.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Failures produced by the HTTP client wrapper.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(String),
    #[error("Session expired. Please sign in again.")]
    Unauthorized,
    #[error("Unexpected response: {0}")]
    Decode(String),
    #[error("{0}")]
    Rejected(String),
}

impl ApiError {
    /// Message surfaced verbatim to the user.
    ///
    /// Envelope rejections already carry the server text. Undecodable bodies
    /// and blank rejections fall back to the generic message.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Rejected(message) if message.trim().is_empty() => {
                GENERIC_ERROR_MESSAGE.to_string()
            }
            ApiError::Decode(_) => GENERIC_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<ApiError> for HydrationError {
    fn from(err: ApiError) -> Self {
        HydrationError::Fetch(err.user_message())
    }
}

/// Errors raised by on-disk persistence (configuration and session files).
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = StdResult<T, StorageError>;
