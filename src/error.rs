//! Error types for wizard submission.
//!
//! Validation failures are ordinary values ([`ValidationReport`]); they only
//! become errors when a session refuses to submit because of them.

use thiserror::Error;

use crate::validation::ValidationReport;

/// Failures surfaced by a [`crate::wizard::ConferenceGateway`]
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SubmissionError {
    /// Request never reached the server (connection, timeout)
    #[error("network error: {0}")]
    Network(String),

    /// Server answered with a non-success status
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("conference '{0}' not found")]
    NotFound(String),

    /// Server-side validation rejected the payload
    #[error("submission rejected: {0}")]
    Rejected(ValidationReport),
}

impl SubmissionError {
    /// Whether the same request may succeed if retried unchanged
    pub fn is_retryable(&self) -> bool {
        match self {
            SubmissionError::Network(_) => true,
            SubmissionError::Server { status, .. } => *status >= 500,
            SubmissionError::NotFound(_) | SubmissionError::Rejected(_) => false,
        }
    }
}

/// Errors from [`crate::wizard::WizardSession`] operations.
///
/// Every variant leaves the wizard state as it was before the call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SessionError {
    #[error("validation failed: {0}")]
    Validation(ValidationReport),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error("no ticket with key '{0}'")]
    UnknownTicket(String),

    #[error("ticket sale window is not configured")]
    MissingSaleWindow,
}

impl From<ValidationReport> for SessionError {
    fn from(report: ValidationReport) -> Self {
        SessionError::Validation(report)
    }
}
