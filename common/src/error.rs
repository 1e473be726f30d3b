use thiserror::Error;

/// Message shown when a request could not reach the backend
pub const NETWORK_ERROR_MESSAGE: &str = "Network error, please try again.";
/// Message shown when an authenticated call was rejected and the session was dropped
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";
/// Message shown when an operation requires a session but none exists
pub const LOGIN_REQUIRED_MESSAGE: &str = "Please log in to continue.";

/// Failed check of user provided form input. The message is meant to be shown to the user as is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// Name of the form field that failed validation
    field: &'static str,
    /// User facing description of the problem
    message: String,
}

impl ValidationError {
    /// Create a new [ValidationError] for the `field` with the user facing `message`
    pub fn new<S: Into<String>>(field: &'static str, message: S) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    /// Name of the field that failed validation
    pub const fn field(&self) -> &'static str {
        self.field
    }

    /// User facing message
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// All possible error types that may occur during portal client operations
#[derive(Error, Debug)]
pub enum RpError {
    #[error("Invalid form input\n{0}")]
    Validation(#[from] ValidationError),
    #[error("API error, status {status}\n{message}")]
    Api { status: u16, message: String },
    #[error("Request was not authorized\n{0}")]
    Unauthorized(String),
    #[error("Network error\n{0}")]
    Network(String),
    #[error("JSON error\n{0}")]
    Json(#[from] serde_json::Error),
    #[error("Unexpected response body\n{0}")]
    UnexpectedBody(String),
    #[error("Storage error\n{0}")]
    Storage(String),
    #[error("No active session")]
    MissingSession,
    #[error("Element binding error\n{0}")]
    Binding(String),
    #[error("Generic error\n{0}")]
    Generic(String),
}

impl RpError {
    /// Text shown to the user when this error ends an operation. Errors that carry no message a
    /// user could act upon are replaced by the `fallback` message of the operation.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation(error) => error.message().to_owned(),
            Self::Api { message, .. } if !message.trim().is_empty() => message.clone(),
            Self::Unauthorized(_) => SESSION_EXPIRED_MESSAGE.to_owned(),
            Self::Network(_) => NETWORK_ERROR_MESSAGE.to_owned(),
            Self::MissingSession => LOGIN_REQUIRED_MESSAGE.to_owned(),
            _ => fallback.to_owned(),
        }
    }

    /// True if this error was caused by the backend rejecting the session token
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

impl From<&str> for RpError {
    fn from(value: &str) -> Self {
        Self::Generic(value.to_owned())
    }
}

impl From<String> for RpError {
    fn from(value: String) -> Self {
        Self::Generic(value)
    }
}

/// Generic [Result][std::result::Result] type where the error is always [RpError]
pub type RpResult<T> = std::result::Result<T, RpError>;
