//! Analysis results panel.

use std::rc::Rc;

use canopy_core::AnalysisResult;
use canopy_core::present::{Figure, FigureSize, Presentation};
use dioxus::prelude::*;

use super::StatsPanel;

/// Props for the [`ResultsPanel`] component.
#[derive(Props, Clone)]
pub struct ResultsPanelProps {
    /// The analysis result to display.
    /// Wrapped in `Rc` so re-renders do not copy the embedded images.
    result: Rc<AnalysisResult>,
}

impl PartialEq for ResultsPanelProps {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.result, &other.result)
    }
}

/// Renders every section the result provides; absent fields produce no
/// section at all.
#[component]
pub fn ResultsPanel(props: ResultsPanelProps) -> Element {
    let view = Presentation::new(&props.result);

    rsx! {
        div { class: "results",
            h2 { "Analysis Results" }

            if let Some(note) = view.alignment_note {
                p {
                    strong { "Alignment Note: " }
                    "{note}"
                }
            }

            if !view.processed.is_empty() {
                div { class: "image-grid",
                    for fig in view.processed.iter() {
                        {render_figure(fig)}
                    }
                }
            }

            if !view.masks.is_empty() {
                div { class: "image-grid",
                    for fig in view.masks.iter() {
                        {render_figure(fig)}
                    }
                }
            }

            if let Some(ref fig) = view.change {
                {render_figure(fig)}
            }

            if let Some(ref stats) = view.stats {
                StatsPanel { stats: stats.clone() }
            }
        }
    }
}

/// Render a single titled result image.
fn render_figure(fig: &Figure<'_>) -> Element {
    let (wrapper, image) = match fig.size {
        FigureSize::Standard => ("figure", "result-image"),
        FigureSize::Large => ("figure figure-large", "result-image-large"),
    };
    let title = fig.title;
    let alt = fig.alt;
    let src = fig.src;

    rsx! {
        div { class: "{wrapper}",
            h4 { "{title}" }
            img { src: "{src}", alt: "{alt}", class: "{image}" }
        }
    }
}
