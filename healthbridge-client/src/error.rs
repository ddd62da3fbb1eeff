use thiserror::Error;

/// Every failure the client surfaces. `Display` is always the single
/// human-readable message shown next to the form that triggered it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// The service answered with a non-success status.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The request never produced a response (connection refused, timeout, ...).
    #[error("{0}")]
    Transport(String),

    /// A success response whose body could not be decoded.
    #[error("{0}")]
    Decode(String),

    /// Rejected locally before any request was issued.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Config(String),
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// The single string message carried by this error.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// HTTP status for errors that came back from a service.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
