//! Directory error types.
//!
//! Error definitions for the guest directory client and its orchestrators,
//! with caller-correctable / terminal classification.

use thiserror::Error;

/// Error that can occur while provisioning or resetting guest identities.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// A required input field was empty or missing.
    ///
    /// Surfaced before any remote call is attempted.
    #[error("missing required field: {field}")]
    MissingInput { field: &'static str },

    /// No account exists for the given email.
    ///
    /// Terminal outcome for password reset; never produced by provisioning.
    #[error("no account found for email: {email}")]
    NotFound { email: String },

    /// The directory reported the email as taken, but no matching account
    /// could be resolved by any lookup strategy.
    #[error("account for {email} exists but could not be resolved")]
    Unresolvable { email: String },

    /// The directory returned a non-success response.
    #[error("directory API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure reaching the directory.
    #[error("directory request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The directory returned a response body we could not decode.
    #[error("failed to parse directory response: {0}")]
    Parse(String),

    /// The client was constructed with invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DirectoryError {
    /// True if the caller can correct this error by fixing the request.
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(self, DirectoryError::MissingInput { .. })
    }

    /// True if this is the reset-only "no such account" outcome.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, DirectoryError::NotFound { .. })
    }

    /// Get an error code for classification in logs and transport mapping.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            DirectoryError::MissingInput { .. } => "MISSING_INPUT",
            DirectoryError::NotFound { .. } => "NOT_FOUND",
            DirectoryError::Unresolvable { .. } => "UNRESOLVABLE",
            DirectoryError::Api { .. } => "API_ERROR",
            DirectoryError::Network(_) => "NETWORK_ERROR",
            DirectoryError::Parse(_) => "PARSE_ERROR",
            DirectoryError::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }
}

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;
