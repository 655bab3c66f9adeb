//! Parsing of `kmeans_colors --print --pct` output.

use super::Result;
use crate::error::KmeansError;
use crate::ink::round2;
use crate::models::color::ColorRecord;

/// Parse the two-line tool output into color records.
///
/// Percentages are fractions on the wire and are scaled to 0 - 100 with two
/// decimals. Lines after the second are ignored.
pub fn parse_output(stdout: &str) -> Result<Vec<ColorRecord>> {
    let mut lines = stdout.lines().map(str::trim);

    let colors_line = lines
        .next()
        .filter(|l| !l.is_empty())
        .ok_or_else(|| KmeansError::MalformedOutput("empty output".to_string()))?;
    let pct_line = lines
        .next()
        .filter(|l| !l.is_empty())
        .ok_or_else(|| KmeansError::MalformedOutput("missing percentage line".to_string()))?;

    let hexes: Vec<&str> = colors_line.split(',').map(str::trim).collect();
    let fractions = pct_line
        .split(',')
        .map(|p| {
            p.trim().parse::<f64>().map_err(|_| {
                KmeansError::MalformedOutput(format!("invalid percentage {:?}", p))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if hexes.len() != fractions.len() {
        return Err(KmeansError::MalformedOutput(format!(
            "{} colors but {} percentages",
            hexes.len(),
            fractions.len()
        )));
    }

    hexes
        .into_iter()
        .zip(fractions)
        .map(|(hex, fraction)| {
            ColorRecord::from_hex(hex, round2(fraction * 100.0)).map_err(KmeansError::from)
        })
        .collect()
}
