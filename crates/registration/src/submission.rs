// File: src/submission.rs
// Purpose: Outbound registration call and its two outcome branches

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::{MessageSource, SubmissionConfig};
use crate::error::ClientError;
use crate::form::FormValues;

/// The single banner shown above the form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Success(String),
    Failure(String),
}

impl SubmissionStatus {
    pub fn message(&self) -> Option<&str> {
        match self {
            SubmissionStatus::Idle => None,
            SubmissionStatus::Success(message) | SubmissionStatus::Failure(message) => {
                Some(message.as_str())
            }
        }
    }

    pub fn success_message(&self) -> Option<&str> {
        match self {
            SubmissionStatus::Success(message) => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn failure_message(&self) -> Option<&str> {
        match self {
            SubmissionStatus::Failure(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

/// Result of one submission, already reduced to the text to display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Accepted(String),
    Rejected(String),
}

impl SubmissionOutcome {
    /// Reduce a client result to banner text
    pub fn from_result(
        result: Result<RegistrationResponse, ClientError>,
        source: MessageSource,
    ) -> Self {
        match result {
            Ok(response) => SubmissionOutcome::Accepted(response.message),
            Err(err) => SubmissionOutcome::Rejected(resolve_failure_message(&err, source)),
        }
    }
}

/// Pick the failure text according to the configured source
pub fn resolve_failure_message(err: &ClientError, source: MessageSource) -> String {
    match source {
        MessageSource::Server => err
            .server_message()
            .map(str::to_string)
            .unwrap_or_else(|| err.description()),
        MessageSource::Transport => err.description(),
    }
}

/// Success body of the registration endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Sends form values to the registration endpoint
#[async_trait]
pub trait RegistrationClient: Send + Sync {
    async fn register(&self, values: &FormValues) -> Result<RegistrationResponse, ClientError>;
}

/// `RegistrationClient` over HTTP
#[derive(Debug, Clone)]
pub struct HttpRegistrationClient {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpRegistrationClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ClientError> {
        Self::build(endpoint.into(), None)
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        Self::build(endpoint.into(), Some(timeout))
    }

    pub fn from_config(config: &SubmissionConfig) -> Result<Self, ClientError> {
        Self::build(config.endpoint.clone(), config.timeout())
    }

    fn build(endpoint: String, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Transport(format!("Failed to create client: {}", e)))?;

        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RegistrationClient for HttpRegistrationClient {
    async fn register(&self, values: &FormValues) -> Result<RegistrationResponse, ClientError> {
        let response = self.client.post(&self.endpoint).json(values).send().await?;
        let status = response.status();

        if !status.is_success() {
            // Error bodies are optional; anything unparseable counts as absent
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message);
            warn!(status = status.as_u16(), ?message, "registration rejected");
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: RegistrationResponse = response.json().await?;
        info!(status = status.as_u16(), "registration accepted");
        Ok(body)
    }
}
