// File: src/error.rs
// Purpose: Error types for the outbound client and form lifecycle

use thiserror::Error;

/// Failure of the outbound registration call
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response (DNS, connect, timeout, ...)
    #[error("{0}")]
    Transport(String),

    /// The server answered with a non-success status
    #[error("Request failed with status code {status}")]
    Status {
        status: u16,
        /// `message` field of a JSON error body, when present
        message: Option<String>,
    },

    /// A success response whose body had no usable `message`
    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl ClientError {
    /// Message supplied by the server in a structured error body
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Transport-level description, independent of any response body
    pub fn description(&self) -> String {
        self.to_string()
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

/// Rejected form lifecycle operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("submit is disabled until every field is valid")]
    SubmitDisabled,

    #[error("a submission is already in flight")]
    SubmissionInFlight,

    #[error("unknown field: {0}")]
    UnknownField(String),
}
