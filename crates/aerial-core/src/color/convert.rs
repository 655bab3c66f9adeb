//! Hex, RGB and CMYK conversions.

use super::{Cmyk, Rgb};
use crate::error::ColorError;

/// Parse a `#rrggbb` (or `rrggbb`) hex string into RGB.
///
/// Exactly six hex digits are accepted; anything else is an
/// [`ColorError::InvalidColorFormat`].
pub fn hex_to_rgb(hex: &str) -> Result<Rgb, ColorError> {
    let digits = hex.trim().strip_prefix('#').unwrap_or(hex.trim());

    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ColorError::InvalidColorFormat(hex.to_string()));
    }

    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .map_err(|_| ColorError::InvalidColorFormat(hex.to_string()))
    };

    Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
}

/// Convert RGB to CMYK integer percentages.
///
/// `k = 1 - max(r, g, b)` on normalized channels; pure black has no
/// chromatic component so `c = m = y = 0` there.
pub fn rgb_to_cmyk(rgb: Rgb) -> Cmyk {
    let [r, g, b] = rgb.channels().map(|ch| ch as f64 / 255.0);
    let k = 1.0 - r.max(g).max(b);

    if k >= 1.0 {
        return Cmyk::new(0, 0, 0, 100);
    }

    let chroma = |ch: f64| percent((1.0 - ch - k) / (1.0 - k));
    Cmyk::new(chroma(r), chroma(g), chroma(b), percent(k))
}

/// Convert a hex string straight to CMYK.
pub fn hex_to_cmyk(hex: &str) -> Result<Cmyk, ColorError> {
    hex_to_rgb(hex).map(rgb_to_cmyk)
}

/// Canonical lowercase `#rrggbb` form of a hex string.
pub fn normalize_hex(hex: &str) -> Result<String, ColorError> {
    hex_to_rgb(hex).map(|rgb| rgb.to_hex())
}

fn percent(value: f64) -> u8 {
    (value * 100.0).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#ff8000").unwrap(), Rgb::new(255, 128, 0));
        assert_eq!(hex_to_rgb("FF8000").unwrap(), Rgb::new(255, 128, 0));
        assert_eq!(hex_to_rgb("#000000").unwrap(), Rgb::new(0, 0, 0));
    }

    #[test]
    fn test_hex_to_rgb_rejects_malformed() {
        for bad in ["", "#", "#fff", "#ff80001", "#gg0000", "ff 800", "#ff800"] {
            assert!(
                matches!(hex_to_rgb(bad), Err(ColorError::InvalidColorFormat(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_pure_black() {
        assert_eq!(hex_to_cmyk("#000000").unwrap().to_string(), "0 0 0 100");
    }

    #[test]
    fn test_pure_white() {
        assert_eq!(hex_to_cmyk("#ffffff").unwrap().to_string(), "0 0 0 0");
    }

    #[test]
    fn test_primaries() {
        assert_eq!(hex_to_cmyk("#ff0000").unwrap(), Cmyk::new(0, 100, 100, 0));
        assert_eq!(hex_to_cmyk("#00ff00").unwrap(), Cmyk::new(100, 0, 100, 0));
        assert_eq!(hex_to_cmyk("#0000ff").unwrap(), Cmyk::new(100, 100, 0, 0));
    }

    #[test]
    fn test_mid_grey() {
        // 128/255 = 0.502 -> k = 0.498
        assert_eq!(hex_to_cmyk("#808080").unwrap(), Cmyk::new(0, 0, 0, 50));
    }

    #[test]
    fn test_near_white_has_no_ink() {
        assert!(hex_to_cmyk("#fefefe").unwrap().is_white());
    }

    #[test]
    fn test_round_trip_ranges() {
        for hex in ["#123456", "#abcdef", "#0f0f0f", "#c0ffee", "#7f3a99", "#010203"] {
            let rgb = hex_to_rgb(hex).unwrap();
            let cmyk = rgb_to_cmyk(rgb);

            assert!(cmyk.channels().iter().all(|&ch| ch <= 100));

            let max = *rgb.channels().iter().max().unwrap() as f64 / 255.0;
            let expected_k = ((1.0 - max) * 100.0).round() as u8;
            assert_eq!(cmyk.k, expected_k, "{hex}");

            assert_eq!(rgb.to_hex(), hex);
        }
    }

    #[test]
    fn test_normalize_hex() {
        assert_eq!(normalize_hex("ABCDEF").unwrap(), "#abcdef");
    }
}
