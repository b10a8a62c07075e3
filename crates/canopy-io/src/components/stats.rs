//! Forest cover statistics block.

use canopy_core::present::{CoverLine, MISSING_VALUE};
use canopy_core::{StatsView, Tone};
use dioxus::prelude::*;

/// Props for the [`StatsPanel`] component.
#[derive(Props, Clone, PartialEq)]
pub struct StatsPanelProps {
    /// Pre-formatted statistics.
    stats: StatsView,
}

/// Before/after cover, the net-change narrative, and the loss/gain
/// breakdown. The breakdown is shown whatever the net-change band.
#[component]
pub fn StatsPanel(props: StatsPanelProps) -> Element {
    let StatsView {
        before,
        after,
        net,
        lost,
        gained,
    } = props.stats;

    let net_class = match net.tone {
        Tone::Positive => "net-change net-positive",
        Tone::Negative => "net-change net-negative",
        Tone::Neutral => "net-change net-neutral",
    };
    let net_text = net.text;

    rsx! {
        div { class: "stats",
            h3 { "Forest Cover Statistics:" }
            {cover_line("Before Image:", &before, "forest pixels", "")}
            {cover_line("After Image:", &after, "forest pixels", "")}

            p { class: "{net_class}", "{net_text}" }

            h3 { "Change Details:" }
            {cover_line("Area Lost (Deforestation):", &lost, "pixels", " of total area")}
            {cover_line("Area Gained (Reforestation):", &gained, "pixels", " of total area")}
        }
    }
}

fn cover_line(heading: &str, line: &CoverLine, unit: &str, suffix: &str) -> Element {
    let pixels = &line.pixels;
    let percentage = if line.percentage == MISSING_VALUE {
        line.percentage.clone()
    } else {
        format!("{}%", line.percentage)
    };
    rsx! {
        p {
            strong { "{heading} " }
            "{pixels} {unit} ({percentage}{suffix})"
        }
    }
}
