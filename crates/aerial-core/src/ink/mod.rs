//! CMYK ink coverage aggregation.
//!
//! Reduces the dominant colors of a page into how much of it is white, how
//! much is inked, and the average C/M/Y/K intensity across the inked part.

mod aggregate;

pub use aggregate::{
    channel_average, non_white_count, summarize_page, summarize_pages, total_cmyk, white_space,
};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ColorError;

/// Component-wise sum of the CMYK values of a page's swatches.
///
/// Serialized as `"c m y k"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CmykTotal {
    pub c: u32,
    pub m: u32,
    pub y: u32,
    pub k: u32,
}

impl CmykTotal {
    pub fn channels(&self) -> [u32; 4] {
        [self.c, self.m, self.y, self.k]
    }
}

impl fmt::Display for CmykTotal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.c, self.m, self.y, self.k)
    }
}

impl FromStr for CmykTotal {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ColorError::InvalidColorFormat(s.to_string());
        let parts = s
            .split_whitespace()
            .map(|p| p.parse::<u32>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;

        match parts.as_slice() {
            [c, m, y, k] => Ok(Self {
                c: *c,
                m: *m,
                y: *y,
                k: *k,
            }),
            _ => Err(invalid()),
        }
    }
}

impl From<CmykTotal> for String {
    fn from(total: CmykTotal) -> Self {
        total.to_string()
    }
}

impl TryFrom<String> for CmykTotal {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Average intensity of one channel, with the arithmetic that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelAverage {
    pub formula: String,
    pub value: f64,
}

/// Average intensity per channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CmykSummary {
    pub c: ChannelAverage,
    pub m: ChannelAverage,
    pub y: ChannelAverage,
    pub k: ChannelAverage,
}

impl CmykSummary {
    /// Channel values in C, M, Y, K order.
    pub fn values(&self) -> [f64; 4] {
        [self.c.value, self.m.value, self.y.value, self.k.value]
    }
}

/// Coverage of a single page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageCoverage {
    pub total: CmykTotal,
    pub white_space: f64,
    pub colored_space: f64,
    pub summary: CmykSummary,
}

/// Coverage of many pages, as parallel arrays indexed by page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InkCoverage {
    pub total: Vec<CmykTotal>,
    pub white_space: Vec<f64>,
    pub colored_space: Vec<f64>,
    pub summary: Vec<CmykSummary>,
}

impl InkCoverage {
    /// Number of pages covered.
    pub fn len(&self) -> usize {
        self.total.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total.is_empty()
    }

    /// Coverage of one page (0-indexed).
    pub fn page(&self, index: usize) -> Option<PageCoverage> {
        Some(PageCoverage {
            total: *self.total.get(index)?,
            white_space: *self.white_space.get(index)?,
            colored_space: *self.colored_space.get(index)?,
            summary: self.summary.get(index)?.clone(),
        })
    }

    /// Append a page.
    pub fn push(&mut self, page: PageCoverage) {
        self.total.push(page.total);
        self.white_space.push(page.white_space);
        self.colored_space.push(page.colored_space);
        self.summary.push(page.summary);
    }
}

impl FromIterator<PageCoverage> for InkCoverage {
    fn from_iter<I: IntoIterator<Item = PageCoverage>>(iter: I) -> Self {
        let mut coverage = InkCoverage::default();
        for page in iter {
            coverage.push(page);
        }
        coverage
    }
}

/// Round to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
