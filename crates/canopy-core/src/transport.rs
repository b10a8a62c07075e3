//! Request/response contract with the analysis service.
//!
//! The request is a multipart form with one part per [`Slot`]. How it
//! travels is up to the [`AnalysisTransport`] implementation; the core
//! only sees the status code and body text that come back.

use std::rc::Rc;

use crate::error::{SubmissionError, TransportError};
use crate::selection::{PreviewHandles, SelectionManager};
use crate::types::{AnalysisResult, ImageMediaType, Slot};

/// One file part of the multipart request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    /// Multipart field identifier.
    pub field: &'static str,
    /// Filename reported in the part's `Content-Disposition`.
    pub file_name: String,
    /// Part content type.
    pub media_type: ImageMediaType,
    /// Raw file bytes.
    pub bytes: Rc<[u8]>,
}

/// A fully built analysis request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    parts: Vec<FormPart>,
}

impl AnalysisRequest {
    /// Build the request from a complete selection.
    ///
    /// Returns the missing slots if either slot is empty.
    pub(crate) fn from_selection<P: PreviewHandles>(
        selection: &SelectionManager<P>,
    ) -> Result<Self, Vec<Slot>> {
        let missing = selection.missing();
        if !missing.is_empty() {
            return Err(missing);
        }
        let parts = Slot::ALL
            .into_iter()
            .filter_map(|slot| {
                selection.get(slot).map(|sel| FormPart {
                    field: slot.form_field(),
                    file_name: sel.file().name().to_owned(),
                    media_type: sel.file().media_type(),
                    bytes: sel.file().shared_bytes(),
                })
            })
            .collect();
        Ok(Self { parts })
    }

    /// The form parts in submission order.
    #[must_use]
    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    /// Look up a part by its field identifier.
    #[must_use]
    pub fn part(&self, field: &str) -> Option<&FormPart> {
        self.parts.iter().find(|p| p.field == field)
    }
}

/// What came back from the service, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl TransportResponse {
    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Sends an [`AnalysisRequest`] to the analysis endpoint.
#[allow(async_fn_in_trait)] // single-threaded WASM; callers never need Send futures
pub trait AnalysisTransport {
    /// Issue a single `POST` carrying `request` as `multipart/form-data`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] only when no HTTP response was received.
    /// Error statuses are returned as `Ok` and interpreted by the caller.
    async fn send(&self, request: &AnalysisRequest) -> Result<TransportResponse, TransportError>;
}

/// Interpret a transport outcome as an analysis result or a submission error.
///
/// # Errors
///
/// - [`SubmissionError::Transport`] if no response was received.
/// - [`SubmissionError::Service`] for non-2xx statuses, carrying the body's
///   non-empty `detail` string when there is one.
/// - [`SubmissionError::MalformedResponse`] for a 2xx body that is not an
///   analysis result object.
pub fn decode_outcome(
    outcome: Result<TransportResponse, TransportError>,
) -> Result<AnalysisResult, SubmissionError> {
    let response = outcome.map_err(SubmissionError::Transport)?;
    if response.is_success() {
        serde_json::from_str::<AnalysisResult>(&response.body).map_err(|e| {
            SubmissionError::MalformedResponse {
                status: response.status,
                reason: e.to_string(),
            }
        })
    } else {
        Err(SubmissionError::Service {
            status: response.status,
            detail: error_detail(&response.body),
        })
    }
}

/// Extract a non-empty string `detail` field from an error body.
fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::GENERIC_FAILURE_MESSAGE;

    fn response(status: u16, body: &str) -> Result<TransportResponse, TransportError> {
        Ok(TransportResponse {
            status,
            body: body.to_owned(),
        })
    }

    #[test]
    fn success_body_decodes() {
        let result = decode_outcome(response(200, r#"{"alignment_message": "ok"}"#)).unwrap();
        assert_eq!(result.alignment_message.as_deref(), Some("ok"));
    }

    #[test]
    fn success_with_non_object_body_is_malformed() {
        for body in ["", "null", "[1]", "<html>"] {
            let err = decode_outcome(response(200, body)).unwrap_err();
            assert!(
                matches!(err, SubmissionError::MalformedResponse { status: 200, .. }),
                "body {body:?} gave {err:?}"
            );
            assert_eq!(err.to_string(), GENERIC_FAILURE_MESSAGE);
        }
    }

    #[test]
    fn error_status_uses_detail() {
        let err = decode_outcome(response(500, r#"{"detail": "unsupported image size"}"#))
            .unwrap_err();
        assert_eq!(err.to_string(), "unsupported image size");
    }

    #[test]
    fn error_status_without_usable_detail_is_generic() {
        for body in [
            "",
            "Internal Server Error",
            r#"{"detail": ""}"#,
            r#"{"detail": [{"loc": ["body"], "msg": "field required"}]}"#,
            r#"{"error": "nope"}"#,
        ] {
            let err = decode_outcome(response(422, body)).unwrap_err();
            assert!(matches!(
                err,
                SubmissionError::Service {
                    status: 422,
                    detail: None
                }
            ));
            assert_eq!(err.to_string(), GENERIC_FAILURE_MESSAGE, "body {body:?}");
        }
    }

    #[test]
    fn transport_failure_maps_to_transport_error() {
        let err = decode_outcome(Err(TransportError("connection refused".into()))).unwrap_err();
        assert!(matches!(err, SubmissionError::Transport(_)));
    }

    #[test]
    fn success_range_is_2xx() {
        let ok = |status| TransportResponse {
            status,
            body: String::new(),
        };
        assert!(ok(200).is_success());
        assert!(ok(204).is_success());
        assert!(!ok(199).is_success());
        assert!(!ok(300).is_success());
        assert!(!ok(404).is_success());
    }
}
