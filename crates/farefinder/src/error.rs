//! Error types for farefinder.
//!
//! This module defines all error types used throughout the farefinder crate,
//! providing detailed context for debugging and user-friendly error messages.

use thiserror::Error;

/// Message shown when a search is submitted with required fields missing.
pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all required fields.";

/// The main error type for farefinder operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Form Errors ===
    /// A form value was rejected.
    #[error("{message}")]
    Validation {
        /// User-facing description of the problem.
        message: String,
    },

    /// An airport token did not have the `<entityId>, <skyId>` shape.
    #[error("invalid airport token '{token}': expected \"<entityId>, <skyId>\"")]
    InvalidAirportToken {
        /// The rejected token.
        token: String,
    },

    // === Flow Errors ===
    /// An action was attempted in a state that does not allow it.
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        /// The attempted action.
        action: &'static str,
        /// The state the flow was in.
        state: &'static str,
    },

    /// A selection index did not refer to a displayed itinerary.
    #[error("selection {index} is out of range ({len} itineraries shown)")]
    SelectionOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of itineraries in the displayed list.
        len: usize,
    },

    // === API Errors ===
    /// No API key was configured.
    #[error("API key not configured. Set FAREFINDER_API_KEY or add `key` under [api] in the config file")]
    MissingApiKey,

    /// The HTTP request itself failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with an error.
    #[error("{provider} API error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Api {
        /// Which endpoint answered.
        provider: &'static str,
        /// HTTP status code, if the failure came with one.
        status: Option<u16>,
        /// Description returned by the provider.
        message: String,
    },

    /// The provider response did not have the expected shape.
    #[error("malformed {provider} response: {message}")]
    MalformedResponse {
        /// Which endpoint answered.
        provider: &'static str,
        /// What was missing or wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },
}

/// A specialized Result type for farefinder operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// The validation error raised when a required search field is unset.
    #[must_use]
    pub fn missing_fields() -> Self {
        Self::validation(MISSING_FIELDS_MESSAGE)
    }

    /// Create a malformed response error.
    #[must_use]
    pub fn malformed(provider: &'static str, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            provider,
            message: message.into(),
        }
    }

    /// Create an API error.
    #[must_use]
    pub fn api(provider: &'static str, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Api {
            provider,
            status,
            message: message.into(),
        }
    }

    /// Check if this error is a form validation failure.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if the provider answered with something we could not read.
    #[must_use]
    pub fn is_malformed_response(&self) -> bool {
        matches!(self, Self::MalformedResponse { .. })
    }
}
