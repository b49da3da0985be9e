//! Likely-source attribution from nearby active flares.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Source label derived from the number of active flares near a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LikelySource {
    /// At least one flare was detected within the search radius.
    ActiveFlares,
    /// No flare was detected; the source is undetermined.
    Undetermined,
}

/// Flare count around a site and the source label it implies.
///
/// Detecting flares (thermal anomaly imagery) is done by the caller; this type
/// only carries the count and its interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlareAttribution {
    pub flare_count: u32,
    pub source: LikelySource,
}

impl FlareAttribution {
    pub fn from_count(flare_count: u32) -> Self {
        let source = if flare_count > 0 {
            LikelySource::ActiveFlares
        } else {
            LikelySource::Undetermined
        };
        Self {
            flare_count,
            source,
        }
    }

    pub fn label(&self) -> &'static str {
        match self.source {
            LikelySource::ActiveFlares => "Active flares detected",
            LikelySource::Undetermined => "No flare detected",
        }
    }
}

impl fmt::Display for FlareAttribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} flares)", self.label(), self.flare_count)
    }
}
