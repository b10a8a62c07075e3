//! canopy-core: Before/after submission workflow (sans-IO).
//!
//! Tracks the two selected images and their previews, gates and tracks
//! the analysis request, and turns the service's result into
//! display-ready sections:
//!
//! selection -> submission (begin -> transport -> finish) -> presentation
//!
//! This crate has **no I/O dependencies**. Preview handles come from a
//! [`PreviewHandles`] implementation and the network round trip from an
//! [`AnalysisTransport`]; the browser versions of both live in
//! `canopy-io`.

pub mod config;
pub mod error;
pub mod observe;
pub mod present;
pub mod selection;
pub mod submission;
pub mod transport;
pub mod types;
pub mod workflow;

pub use config::ClientConfig;
pub use error::{PreviewError, SelectionError, SubmissionError, TransportError};
pub use observe::{Change, SubscriptionId};
pub use present::{Presentation, StatsView, Tone};
pub use selection::{ImageSelection, PreviewHandle, PreviewHandles, SelectionManager};
pub use submission::{PendingSubmission, SubmissionController, SubmissionState};
pub use transport::{AnalysisRequest, AnalysisTransport, FormPart, TransportResponse};
pub use types::{AnalysisResult, ImageFile, ImageMediaType, Slot, Stats};
pub use workflow::Workflow;
