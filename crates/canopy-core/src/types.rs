//! Shared types for the canopy before/after workflow.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Deserializer, Serialize};

/// One of the two designated image roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    /// The earlier image of the pair.
    Before,
    /// The later image of the pair.
    After,
}

impl Slot {
    /// Both slots in submission order.
    pub const ALL: [Self; 2] = [Self::Before, Self::After];

    /// Display label for the slot.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Before => "Before",
            Self::After => "After",
        }
    }

    /// Multipart field identifier the analysis service expects for this slot.
    #[must_use]
    pub const fn form_field(self) -> &'static str {
        match self {
            Self::Before => "before_image_file",
            Self::After => "after_image_file",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Image media types accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageMediaType {
    /// `image/jpeg`
    Jpeg,
    /// `image/png`
    Png,
}

impl ImageMediaType {
    /// The MIME type string.
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// Parse a declared MIME type. Parameters (`;charset=...`) and case are ignored.
    #[must_use]
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        if essence.eq_ignore_ascii_case("image/jpeg") || essence.eq_ignore_ascii_case("image/jpg") {
            Some(Self::Jpeg)
        } else if essence.eq_ignore_ascii_case("image/png") {
            Some(Self::Png)
        } else {
            None
        }
    }

    /// Classify a file by content, falling back to its declared MIME type
    /// when the content is not recognized as any image format.
    #[must_use]
    pub fn classify(bytes: &[u8], declared: Option<&str>) -> Option<Self> {
        match image::guess_format(bytes) {
            Ok(image::ImageFormat::Jpeg) => Some(Self::Jpeg),
            Ok(image::ImageFormat::Png) => Some(Self::Png),
            // Recognized as some other image format: the declared type
            // cannot override what the bytes say.
            Ok(_) => None,
            Err(_) => declared.and_then(Self::from_mime),
        }
    }
}

impl fmt::Display for ImageMediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// A user-selected image file.
///
/// Bytes are shared so that building a request does not copy the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    name: String,
    media_type: ImageMediaType,
    bytes: Rc<[u8]>,
}

impl ImageFile {
    /// Create a file from already-classified parts.
    #[must_use]
    pub fn new(name: impl Into<String>, media_type: ImageMediaType, bytes: Rc<[u8]>) -> Self {
        Self {
            name: name.into(),
            media_type,
            bytes,
        }
    }

    /// Original filename as reported by the picker.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Detected media type.
    #[must_use]
    pub const fn media_type(&self) -> ImageMediaType {
        self.media_type
    }

    /// Raw file contents.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared handle to the raw file contents.
    #[must_use]
    pub fn shared_bytes(&self) -> Rc<[u8]> {
        Rc::clone(&self.bytes)
    }

    /// Size of the file in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the file has no contents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Structured payload returned by the analysis service.
///
/// Every field is optional and decodes leniently: a field that is absent,
/// `null`, or of the wrong type becomes `None`, and the other sections of
/// the response still render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResult {
    /// Service status line (e.g. `"Analysis successful"`).
    #[serde(deserialize_with = "lenient_text")]
    pub message: Option<String>,
    /// Short description of which alignment path the service took.
    #[serde(deserialize_with = "lenient_text")]
    pub alignment_status: Option<String>,
    /// Human-readable note about how the two images were aligned.
    #[serde(deserialize_with = "lenient_text")]
    pub alignment_message: Option<String>,
    /// Displayable reference (data URI) to the aligned before image.
    #[serde(deserialize_with = "lenient_text")]
    pub processed_image_before: Option<String>,
    /// Displayable reference to the aligned after image.
    #[serde(deserialize_with = "lenient_text")]
    pub processed_image_after: Option<String>,
    /// Forest mask of the before image.
    #[serde(deserialize_with = "lenient_text")]
    pub mask_before: Option<String>,
    /// Forest mask of the after image.
    #[serde(deserialize_with = "lenient_text")]
    pub mask_after: Option<String>,
    /// After image with loss painted red and gain painted green.
    #[serde(deserialize_with = "lenient_text")]
    pub change_visualization: Option<String>,
    /// Forest cover statistics. Anything other than a JSON object is
    /// treated as absent.
    #[serde(deserialize_with = "lenient_stats")]
    pub stats: Option<Stats>,
}

/// Forest cover statistics.
///
/// Numeric fields decode leniently: `null`, absent, or wrongly typed
/// values become `None` rather than rejecting the whole response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    /// Pixels in the aligned image pair.
    #[serde(deserialize_with = "lenient_count")]
    pub total_pixels: Option<u64>,
    /// Forest pixels in the before image.
    #[serde(deserialize_with = "lenient_count")]
    pub forest_pixels_before: Option<u64>,
    /// Forest pixels in the after image.
    #[serde(deserialize_with = "lenient_count")]
    pub forest_pixels_after: Option<u64>,
    /// Forest share of the before image, in percent.
    #[serde(deserialize_with = "lenient_float")]
    pub percentage_before: Option<f64>,
    /// Forest share of the after image, in percent.
    #[serde(deserialize_with = "lenient_float")]
    pub percentage_after: Option<f64>,
    /// Net change in forest cover, in percentage points (after minus before).
    #[serde(deserialize_with = "lenient_float")]
    pub change_percentage: Option<f64>,
    /// Pixels that were forest before and are not after.
    #[serde(deserialize_with = "lenient_count")]
    pub pixels_lost: Option<u64>,
    /// Lost pixels as a percentage of the total area.
    #[serde(deserialize_with = "lenient_float")]
    pub percentage_loss: Option<f64>,
    /// Pixels that are forest after and were not before.
    #[serde(deserialize_with = "lenient_count")]
    pub pixels_gained: Option<u64>,
    /// Gained pixels as a percentage of the total area.
    #[serde(deserialize_with = "lenient_float")]
    pub percentage_gain: Option<f64>,
}

/// Accept any JSON value and keep it only if it is a string.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    }))
}

/// Accept any JSON value and keep it only if it decodes as [`Stats`].
fn lenient_stats<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Stats>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .filter(serde_json::Value::is_object)
        .and_then(|v| Stats::deserialize(v).ok()))
}

/// Accept any JSON value and keep it only if it is a non-negative integer
/// (or a float with no fractional part, as some encoders emit `120000.0`).
fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| {
        v.as_u64().or_else(|| {
            v.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f <= 9.0e15)
                .map(|f| {
                    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    let n = f as u64;
                    n
                })
        })
    }))
}

/// Accept any JSON value and keep it only if it is a number.
fn lenient_float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()))
}
