// File: src/config.rs
// Purpose: Configuration parsing from registration.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://webapis.bloomtechdev.com/registration";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub submission: SubmissionConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Forms untouched for this long are unmounted
    #[serde(default = "default_form_idle_secs")]
    pub form_idle_secs: u64,
}

/// Outbound registration call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionConfig {
    /// Target URL for the POST
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// What happens to the values after a failed submission
    #[serde(default)]
    pub on_failure: FailurePolicy,

    /// Where the failure banner text comes from
    #[serde(default)]
    pub error_message_source: MessageSource,

    /// Request timeout; the transport default applies when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Form values after a failed submission
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Leave the values untouched so the user can retry
    #[default]
    Preserve,
    /// Reset to defaults regardless of the outcome
    Reset,
}

/// Source of the failure message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSource {
    /// `message` from the server's error body, else the transport description
    #[default]
    Server,
    /// Always the transport-level description
    Transport,
}

/// The two submission choices the form state needs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmitPolicy {
    pub on_failure: FailurePolicy,
    pub message_source: MessageSource,
}

fn default_port() -> u16 {
    3000
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_form_idle_secs() -> u64 {
    30 * 60
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            form_idle_secs: default_form_idle_secs(),
        }
    }
}

impl ServerConfig {
    pub fn form_idle(&self) -> Duration {
        Duration::from_secs(self.form_idle_secs)
    }
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            on_failure: FailurePolicy::default(),
            error_message_source: MessageSource::default(),
            timeout_secs: None,
        }
    }
}

impl SubmissionConfig {
    pub fn policy(&self) -> SubmitPolicy {
        SubmitPolicy {
            on_failure: self.on_failure,
            message_source: self.error_message_source,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Missing file means defaults
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Load configuration from default path (./registration.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("registration.toml")
    }

    /// Apply `REGISTRATION_ENDPOINT` / `REGISTRATION_PORT` style overrides
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup("REGISTRATION_ENDPOINT") {
            self.submission.endpoint = endpoint;
        }
        if let Some(port) = lookup("REGISTRATION_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("Invalid REGISTRATION_PORT: {}", port))?;
        }
        Ok(self)
    }
}
