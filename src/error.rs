//! Error types and handling for the `LocalCast` service

use std::time::Duration;

use thiserror::Error;

/// Main error type for the `LocalCast` service
#[derive(Error, Debug)]
pub enum PodcastError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Upstream data provider errors (transport, status, payload)
    #[error("Upstream error from {provider}: {message}")]
    Upstream { provider: String, message: String },

    /// Language-model completion errors
    #[error("Completion error: {message}")]
    Completion { message: String },

    /// Text-to-speech errors
    #[error("Synthesis error: {message}")]
    Synthesis { message: String },

    /// The pipeline did not finish within the request deadline
    #[error("Podcast generation timed out after {seconds:.1}s")]
    Timeout { seconds: f64 },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl PodcastError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new upstream error for the named provider
    pub fn upstream<P: Into<String>, S: Into<String>>(provider: P, message: S) -> Self {
        Self::Upstream {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a new completion error
    pub fn completion<S: Into<String>>(message: S) -> Self {
        Self::Completion {
            message: message.into(),
        }
    }

    /// Create a new synthesis error
    pub fn synthesis<S: Into<String>>(message: S) -> Self {
        Self::Synthesis {
            message: message.into(),
        }
    }

    /// Create a new timeout error for the elapsed deadline
    pub fn timeout(deadline: Duration) -> Self {
        Self::Timeout {
            seconds: deadline.as_secs_f64(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Whether the error was caused by the caller rather than the service
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, PodcastError::Validation { .. })
    }

    /// Whether the error means the request ran out of time
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, PodcastError::Timeout { .. })
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            PodcastError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            PodcastError::Upstream { .. } => {
                "Unable to reach one of the local data services.".to_string()
            }
            PodcastError::Completion { .. } => {
                "The script writer is unavailable right now. Please try again later.".to_string()
            }
            PodcastError::Synthesis { .. } => {
                "Unable to turn the script into audio. Please try again later.".to_string()
            }
            PodcastError::Timeout { .. } => {
                "Generating the podcast took too long. Please try again later.".to_string()
            }
            PodcastError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            PodcastError::Io { .. } => "File operation failed.".to_string(),
        }
    }
}
