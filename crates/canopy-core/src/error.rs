//! Error types for selection and submission.

use crate::types::Slot;

/// Message shown when submit is attempted without both images.
pub const VALIDATION_MESSAGE: &str = "Please upload both \"Before\" and \"After\" images.";

/// Message shown when the service fails without a usable explanation.
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred during analysis. Check backend logs.";

/// Failure to allocate a preview handle for a selected file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("could not create preview: {0}")]
pub struct PreviewError(pub String);

/// Reasons a file selection is rejected.
///
/// A rejected selection never changes what the slot holds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// The file is not a JPEG or PNG image.
    #[error("Unsupported file type: {name} (expected JPEG or PNG)")]
    Unsupported {
        /// Filename as reported by the picker.
        name: String,
    },

    /// The file has no contents.
    #[error("File is empty: {name}")]
    Empty {
        /// Filename as reported by the picker.
        name: String,
    },

    /// The preview handle could not be created.
    #[error(transparent)]
    Preview(#[from] PreviewError),
}

/// A transport-level failure: no HTTP response was received.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Reasons a submission attempt ends in the failed state.
///
/// `Display` is the user-visible message; only the latest one is shown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    /// Submit was attempted without both slots filled. No request is made.
    #[error("{}", VALIDATION_MESSAGE)]
    Validation {
        /// Slots that were empty at the time of the attempt.
        missing: Vec<Slot>,
    },

    /// A request is already in flight.
    #[error("An analysis is already in progress.")]
    Busy,

    /// The service answered with an error status.
    #[error("{}", .detail.as_deref().unwrap_or(GENERIC_FAILURE_MESSAGE))]
    Service {
        /// HTTP status code.
        status: u16,
        /// The response body's `detail` string, if any.
        detail: Option<String>,
    },

    /// The request never produced a response.
    #[error("{}", GENERIC_FAILURE_MESSAGE)]
    Transport(#[source] TransportError),

    /// The service answered with a success status but an unreadable body.
    #[error("{}", GENERIC_FAILURE_MESSAGE)]
    MalformedResponse {
        /// HTTP status code.
        status: u16,
        /// Decoder error text.
        reason: String,
    },
}

impl SubmissionError {
    /// Short machine-friendly name of the error category, for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::Busy => "busy",
            Self::Service { .. } => "service",
            Self::Transport(_) => "transport",
            Self::MalformedResponse { .. } => "malformed_response",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_fixed() {
        let err = SubmissionError::Validation {
            missing: vec![Slot::After],
        };
        assert_eq!(
            err.to_string(),
            "Please upload both \"Before\" and \"After\" images."
        );
    }

    #[test]
    fn service_detail_is_shown_verbatim() {
        let err = SubmissionError::Service {
            status: 500,
            detail: Some("unsupported image size".into()),
        };
        assert_eq!(err.to_string(), "unsupported image size");
    }

    #[test]
    fn service_without_detail_falls_back_to_generic() {
        let err = SubmissionError::Service {
            status: 502,
            detail: None,
        };
        assert_eq!(err.to_string(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn transport_error_hides_low_level_text() {
        let err = SubmissionError::Transport(TransportError("TypeError: Failed to fetch".into()));
        assert_eq!(err.to_string(), GENERIC_FAILURE_MESSAGE);
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("TypeError: Failed to fetch"));
    }

    #[test]
    fn selection_errors_name_the_file() {
        let err = SelectionError::Unsupported {
            name: "forest.gif".into(),
        };
        assert!(err.to_string().contains("forest.gif"));
    }
}
