use thiserror::Error;

use crate::api::ApiError;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Keychain unavailable: {0}")]
    Keyring(#[from] keyring::Error),
}

#[derive(Error, Debug)]
pub enum SessionError {
    /// The server rejected the credentials or could not be reached.
    /// The session is unchanged and the caller may retry.
    #[error("Authentication failed: {0}")]
    Authentication(#[source] ApiError),

    /// The session store was requested outside an active session scope.
    #[error("Session store accessed outside an active session scope")]
    ContextMisuse,
}

impl SessionError {
    /// True when the server explicitly rejected the email/password pair
    pub fn is_invalid_credentials(&self) -> bool {
        matches!(self, SessionError::Authentication(ApiError::InvalidCredentials))
    }
}
