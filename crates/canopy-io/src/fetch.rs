//! `fetch`-based transport for the analysis request.
//!
//! [`FetchTransport`] builds a `FormData` body from the request parts
//! and `POST`s it with `window.fetch`. The browser chooses the multipart
//! boundary, so no `Content-Type` header is set by hand.
//!
//! All functions in this module require a browser environment
//! (`wasm32-unknown-unknown` target).

use canopy_core::{
    AnalysisRequest, AnalysisTransport, ClientConfig, TransportError, TransportResponse,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

use crate::blob::{self, BlobError};

/// Errors raised while issuing the request.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// A browser API call returned an error, or `fetch` rejected.
    #[error("browser API error: {0}")]
    JsError(String),

    /// A request part could not be turned into a Blob.
    #[error(transparent)]
    Blob(#[from] BlobError),
}

impl From<JsValue> for FetchError {
    fn from(value: JsValue) -> Self {
        // `fetch` rejects with a `TypeError`; its string form is the
        // useful part.
        let text = value
            .dyn_ref::<js_sys::Error>()
            .map_or_else(|| format!("{value:?}"), |e| String::from(e.to_string()));
        Self::JsError(text)
    }
}

/// Sends analysis requests with the browser's `fetch`.
#[derive(Debug, Clone)]
pub struct FetchTransport {
    endpoint: String,
}

impl FetchTransport {
    /// Create a transport for the configured endpoint.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
        }
    }

    /// The endpoint requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[allow(clippy::future_not_send)] // WASM is single-threaded; Send is not needed
    async fn post(&self, request: &AnalysisRequest) -> Result<TransportResponse, FetchError> {
        let form = web_sys::FormData::new()?;
        for part in request.parts() {
            let blob = blob::bytes_to_blob(&part.bytes, part.media_type.mime())?;
            form.append_with_blob_and_filename(part.field, &blob, &part.file_name)?;
        }

        let init = web_sys::RequestInit::new();
        init.set_method("POST");
        init.set_body(&form);

        let window =
            web_sys::window().ok_or_else(|| FetchError::JsError("no global window".into()))?;

        // Await the response headers; this yields to the browser event loop.
        let response: web_sys::Response =
            JsFuture::from(window.fetch_with_str_and_init(&self.endpoint, &init))
                .await?
                .dyn_into()?;
        let status = response.status();

        // A body that cannot be read as text is treated as empty; the
        // status alone still decides success or failure.
        let body = match response.text() {
            Ok(promise) => JsFuture::from(promise)
                .await
                .ok()
                .and_then(|v| v.as_string())
                .unwrap_or_default(),
            Err(_) => String::new(),
        };

        Ok(TransportResponse { status, body })
    }
}

impl AnalysisTransport for FetchTransport {
    async fn send(&self, request: &AnalysisRequest) -> Result<TransportResponse, TransportError> {
        let started = web_time::Instant::now();
        let outcome = self.post(request).await;
        let elapsed_ms = started.elapsed().as_millis();

        match outcome {
            Ok(response) => {
                tracing::info!(
                    endpoint = %self.endpoint,
                    status = response.status,
                    bytes = response.body.len(),
                    elapsed_ms,
                    "analysis response received"
                );
                Ok(response)
            }
            Err(e) => {
                tracing::warn!(endpoint = %self.endpoint, error = %e, elapsed_ms, "analysis request failed");
                Err(TransportError(e.to_string()))
            }
        }
    }
}
