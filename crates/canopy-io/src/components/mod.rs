//! Dioxus UI components for canopy.
//!
//! Provides the per-slot image picker with preview, the analysis results
//! panel, and the forest cover statistics block.

mod results;
mod stats;
mod upload;

pub use results::ResultsPanel;
pub use stats::StatsPanel;
pub use upload::{PickedFile, SlotPicker};
