//! Result presenter: display-ready sections derived from an [`AnalysisResult`].
//!
//! Every section is independently optional. A field that is absent from
//! the response yields no section at all rather than an empty one.

use crate::types::{AnalysisResult, Stats};

/// Alignment message the service sends when no alignment was needed.
pub const SAME_DIMENSIONS_MESSAGE: &str = "Images have the same dimensions.";

/// Net changes within this many percentage points of zero are reported
/// as "no significant change".
pub const NET_CHANGE_DEAD_ZONE: f64 = 0.01;

/// Placeholder for a statistic the service did not provide.
pub const MISSING_VALUE: &str = "n/a";

/// Visual weight of a result image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FigureSize {
    /// Shown side by side with its pair.
    Standard,
    /// Shown alone at full width.
    Large,
}

/// A titled result image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Figure<'a> {
    /// Heading above the image.
    pub title: &'static str,
    /// Alternate text.
    pub alt: &'static str,
    /// Displayable image reference.
    pub src: &'a str,
    /// Visual weight.
    pub size: FigureSize,
}

/// Styling band for the net-change narrative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Forest cover increased.
    Positive,
    /// Forest cover decreased.
    Negative,
    /// No significant change.
    Neutral,
}

/// Net-change narrative line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetChange {
    /// Styling band.
    pub tone: Tone,
    /// Sentence to display.
    pub text: String,
}

/// A pixel count with its share of the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverLine {
    /// Grouped pixel count, e.g. `"120,000"`.
    pub pixels: String,
    /// Percentage to two decimals, without the `%` sign.
    pub percentage: String,
}

/// Display-ready forest cover statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsView {
    /// Forest cover of the before image.
    pub before: CoverLine,
    /// Forest cover of the after image.
    pub after: CoverLine,
    /// Net change narrative.
    pub net: NetChange,
    /// Area lost (deforestation).
    pub lost: CoverLine,
    /// Area gained (reforestation).
    pub gained: CoverLine,
}

/// Everything the results area shows for one analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation<'a> {
    /// Non-trivial alignment adjustment note.
    pub alignment_note: Option<&'a str>,
    /// Processed before/after images (zero, one, or two).
    pub processed: Vec<Figure<'a>>,
    /// Forest masks (zero, one, or two).
    pub masks: Vec<Figure<'a>>,
    /// Change visualization.
    pub change: Option<Figure<'a>>,
    /// Statistics block.
    pub stats: Option<StatsView>,
}

impl<'a> Presentation<'a> {
    /// Derive the presentation for `result`.
    #[must_use]
    pub fn new(result: &'a AnalysisResult) -> Self {
        let alignment_note = result
            .alignment_message
            .as_deref()
            .filter(|m| !m.is_empty() && *m != SAME_DIMENSIONS_MESSAGE);

        let processed = [
            figure(
                result.processed_image_before.as_deref(),
                "Processed Before Image",
                "Processed Before",
                FigureSize::Standard,
            ),
            figure(
                result.processed_image_after.as_deref(),
                "Processed After Image",
                "Processed After",
                FigureSize::Standard,
            ),
        ]
        .into_iter()
        .flatten()
        .collect();

        let masks = [
            figure(
                result.mask_before.as_deref(),
                "Forest Mask (Before)",
                "Forest Mask Before",
                FigureSize::Standard,
            ),
            figure(
                result.mask_after.as_deref(),
                "Forest Mask (After)",
                "Forest Mask After",
                FigureSize::Standard,
            ),
        ]
        .into_iter()
        .flatten()
        .collect();

        let change = figure(
            result.change_visualization.as_deref(),
            "Change Visualization (Red: Loss, Green: Gain)",
            "Change Visualization",
            FigureSize::Large,
        );

        Self {
            alignment_note,
            processed,
            masks,
            change,
            stats: result.stats.as_ref().map(StatsView::new),
        }
    }

    /// Returns `true` if no section would be rendered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alignment_note.is_none()
            && self.processed.is_empty()
            && self.masks.is_empty()
            && self.change.is_none()
            && self.stats.is_none()
    }
}

fn figure<'a>(
    src: Option<&'a str>,
    title: &'static str,
    alt: &'static str,
    size: FigureSize,
) -> Option<Figure<'a>> {
    src.filter(|s| !s.is_empty()).map(|src| Figure {
        title,
        alt,
        src,
        size,
    })
}

impl StatsView {
    /// Format `stats` for display. Missing numbers render as [`MISSING_VALUE`].
    #[must_use]
    pub fn new(stats: &Stats) -> Self {
        Self {
            before: CoverLine::new(stats.forest_pixels_before, stats.percentage_before),
            after: CoverLine::new(stats.forest_pixels_after, stats.percentage_after),
            net: NetChange::classify(stats.change_percentage),
            lost: CoverLine::new(stats.pixels_lost, stats.percentage_loss),
            gained: CoverLine::new(stats.pixels_gained, stats.percentage_gain),
        }
    }
}

impl CoverLine {
    fn new(pixels: Option<u64>, percentage: Option<f64>) -> Self {
        Self {
            pixels: pixels.map_or_else(|| MISSING_VALUE.to_owned(), group_thousands),
            percentage: percentage.map_or_else(|| MISSING_VALUE.to_owned(), percent),
        }
    }
}

impl NetChange {
    /// Classify a net change in percentage points.
    ///
    /// A missing or non-numeric value is neutral.
    #[must_use]
    pub fn classify(change: Option<f64>) -> Self {
        match change {
            Some(c) if c > NET_CHANGE_DEAD_ZONE => Self {
                tone: Tone::Positive,
                text: format!("Forest cover increased by {}%.", percent(c)),
            },
            Some(c) if c < -NET_CHANGE_DEAD_ZONE => Self {
                tone: Tone::Negative,
                text: format!("Forest cover decreased by {}%.", percent(c.abs())),
            },
            _ => Self {
                tone: Tone::Neutral,
                text: "No significant net change in forest cover detected.".to_owned(),
            },
        }
    }
}

/// Format a count with comma-grouped thousands: `1234567` → `"1,234,567"`.
#[must_use]
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format a percentage to two decimal places (no `%` sign).
///
/// Halfway cases round away from zero, so `12.125` renders as `"12.13"`.
/// Non-finite values render as [`MISSING_VALUE`].
#[must_use]
pub fn percent(value: f64) -> String {
    if !value.is_finite() {
        return MISSING_VALUE.to_owned();
    }
    // `{:.2}` alone rounds exact ties to even.
    let rounded = (value * 100.0).round() / 100.0;
    let out = format!("{rounded:.2}");
    // Tiny negatives round to "-0.00".
    if out == "-0.00" { "0.00".to_owned() } else { out }
}
