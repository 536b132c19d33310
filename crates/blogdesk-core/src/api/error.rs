use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Unauthorized - token may be expired or revoked")]
    Unauthorized,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// Map a failed login response. The auth endpoint answers bad credentials
    /// with 401 or 403 depending on the security filter that rejects them.
    pub fn from_login_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            400 | 401 | 403 => ApiError::InvalidCredentials,
            _ => Self::from_status(status, body),
        }
    }
}
