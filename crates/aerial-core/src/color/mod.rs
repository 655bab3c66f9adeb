//! Color representations and conversions.

mod convert;

pub use convert::{hex_to_cmyk, hex_to_rgb, normalize_hex, rgb_to_cmyk};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ColorError;

/// An 8-bit RGB color.
///
/// Serialized as `"r g b"`, the form stored in color records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as an array in R, G, B order.
    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Lowercase `#rrggbb` form.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = parse_components::<3>(s)?;
        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl From<Rgb> for String {
    fn from(rgb: Rgb) -> Self {
        rgb.to_string()
    }
}

impl TryFrom<String> for Rgb {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A CMYK color with integer percentages (0 - 100) per channel.
///
/// Serialized as `"c m y k"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Cmyk {
    pub c: u8,
    pub m: u8,
    pub y: u8,
    pub k: u8,
}

impl Cmyk {
    /// No ink at all. Pages' white swatches convert to this.
    pub const WHITE: Cmyk = Cmyk::new(0, 0, 0, 0);

    pub const fn new(c: u8, m: u8, y: u8, k: u8) -> Self {
        Self { c, m, y, k }
    }

    /// Channels as an array in C, M, Y, K order.
    pub fn channels(&self) -> [u8; 4] {
        [self.c, self.m, self.y, self.k]
    }

    /// Whether this color carries no ink.
    pub fn is_white(&self) -> bool {
        *self == Self::WHITE
    }
}

impl fmt::Display for Cmyk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.c, self.m, self.y, self.k)
    }
}

impl FromStr for Cmyk {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = parse_components::<4>(s)?;
        if parts.iter().any(|&p| p > 100) {
            return Err(ColorError::InvalidColorFormat(s.to_string()));
        }
        Ok(Self::new(parts[0], parts[1], parts[2], parts[3]))
    }
}

impl From<Cmyk> for String {
    fn from(cmyk: Cmyk) -> Self {
        cmyk.to_string()
    }
}

impl TryFrom<String> for Cmyk {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Parse exactly `N` whitespace-separated 8-bit components.
fn parse_components<const N: usize>(s: &str) -> Result<[u8; N], ColorError> {
    let invalid = || ColorError::InvalidColorFormat(s.to_string());
    let mut out = [0u8; N];
    let mut parts = s.split_whitespace();

    for slot in out.iter_mut() {
        *slot = parts.next().ok_or_else(invalid)?.parse().map_err(|_| invalid())?;
    }

    if parts.next().is_some() {
        return Err(invalid());
    }

    Ok(out)
}
