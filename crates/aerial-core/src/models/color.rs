//! Dominant color and ink coverage records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::color::{Cmyk, Rgb, hex_to_rgb, rgb_to_cmyk};
use crate::error::ColorError;
use crate::ink::InkCoverage;

/// One dominant color of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorRecord {
    /// Lowercase `#rrggbb`.
    pub hex: String,

    pub rgb: Rgb,

    pub cmyk: Cmyk,

    /// Share of the page's pixels (0 - 100, two decimals).
    pub percentage: f64,
}

impl ColorRecord {
    /// Build a record from a hex token, deriving RGB and CMYK.
    pub fn from_hex(hex: &str, percentage: f64) -> Result<Self, ColorError> {
        let rgb = hex_to_rgb(hex)?;
        Ok(Self {
            hex: rgb.to_hex(),
            rgb,
            cmyk: rgb_to_cmyk(rgb),
            percentage,
        })
    }
}

/// Dominant colors of every page of an artifact, in page order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KmeansColors {
    /// Record identifier (`kc_` prefix).
    pub id: String,

    pub artifact_id: String,

    /// One list per page; each list is in descending prevalence.
    pub colors: Vec<Vec<ColorRecord>>,

    pub created_at: DateTime<Utc>,
}

/// Ink coverage of an artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CmykRecord {
    /// Record identifier (`cmyk_` prefix).
    pub id: String,

    pub artifact_id: String,

    pub info: InkCoverage,

    pub created_at: DateTime<Utc>,
}
