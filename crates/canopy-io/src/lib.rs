//! canopy-io: Browser I/O and Dioxus component library.
//!
//! Mints and revokes Blob URLs for selection previews, sends the
//! analysis request with `fetch`, and provides the UI components for
//! the canopy web application.

pub mod blob;
pub mod components;
pub mod fetch;
pub mod preview;

pub use components::{PickedFile, ResultsPanel, SlotPicker, StatsPanel};
pub use fetch::{FetchError, FetchTransport};
pub use preview::BlobUrlPreviews;
