//! Client configuration.

use serde::{Deserialize, Serialize};

/// Endpoint used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/api/analyze-forest";

/// Settings for talking to the analysis service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Absolute URL of the analysis endpoint.
    pub endpoint: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
        }
    }
}

impl ClientConfig {
    /// Use `endpoint` if it is set and non-blank, otherwise the default.
    #[must_use]
    pub fn with_endpoint_override(endpoint: Option<&str>) -> Self {
        endpoint
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map_or_else(Self::default, |e| Self {
                endpoint: e.to_owned(),
            })
    }
}
