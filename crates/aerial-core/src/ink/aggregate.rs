//! Per-page reductions.

use super::{ChannelAverage, CmykSummary, CmykTotal, InkCoverage, PageCoverage, round2};
use crate::models::color::ColorRecord;

/// Sum the CMYK components of every swatch on the page.
///
/// This is a raw sum, not a weighted average; it only feeds
/// [`channel_average`].
pub fn total_cmyk(colors: &[ColorRecord]) -> CmykTotal {
    colors.iter().fold(CmykTotal::default(), |acc, color| {
        let [c, m, y, k] = color.cmyk.channels().map(u32::from);
        CmykTotal {
            c: acc.c + c,
            m: acc.m + m,
            y: acc.y + y,
            k: acc.k + k,
        }
    })
}

/// Percentage of the page taken by its no-ink swatch, 0 if there is none.
///
/// When several swatches convert to `0 0 0 0` the first (most prevalent)
/// one is used.
pub fn white_space(colors: &[ColorRecord]) -> f64 {
    colors
        .iter()
        .find(|color| color.cmyk.is_white())
        .map(|color| round2(color.percentage))
        .unwrap_or(0.0)
}

/// Number of swatches that carry ink.
pub fn non_white_count(colors: &[ColorRecord]) -> usize {
    colors.iter().filter(|color| !color.cmyk.is_white()).count()
}

/// Average of one channel over the inked swatches, scaled by the inked
/// fraction of the page.
///
/// A page without inked swatches averages to `0.0`.
pub fn channel_average(total: u32, count: usize, colored_space: f64) -> ChannelAverage {
    let formula = format!(
        "(({} / {}) / 100) * ({:.2} / 100) * 100",
        total, count, colored_space
    );

    let value = if count == 0 {
        0.0
    } else {
        let average = total as f64 / count as f64;
        round2((average / 100.0) * (colored_space / 100.0) * 100.0)
    };

    ChannelAverage {
        formula,
        value: if value.is_finite() { value } else { 0.0 },
    }
}

/// Coverage of a single page from its flat color list.
pub fn summarize_page(colors: &[ColorRecord]) -> PageCoverage {
    let total = total_cmyk(colors);
    let white_space = white_space(colors);
    let colored_space = round2(100.0 - white_space);
    let count = non_white_count(colors);

    let average = |channel: u32| channel_average(channel, count, colored_space);

    PageCoverage {
        total,
        white_space,
        colored_space,
        summary: CmykSummary {
            c: average(total.c),
            m: average(total.m),
            y: average(total.y),
            k: average(total.k),
        },
    }
}

/// Coverage of many color lists at once, one entry per list.
///
/// Lists are typically the pages of one document, but any grouping works,
/// e.g. one flattened list per document across a batch.
pub fn summarize_pages<P: AsRef<[ColorRecord]>>(pages: &[P]) -> InkCoverage {
    pages
        .iter()
        .map(|colors| summarize_page(colors.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Cmyk;
    use pretty_assertions::assert_eq;

    fn record(hex: &str, percentage: f64) -> ColorRecord {
        ColorRecord::from_hex(hex, percentage).unwrap()
    }

    #[test]
    fn test_total_is_component_sum() {
        let colors = vec![record("#ff0000", 40.0), record("#000000", 10.0), record("#ffffff", 50.0)];
        let total = total_cmyk(&colors);
        assert_eq!(total.to_string(), "0 100 100 100");
    }

    #[test]
    fn test_whitespace_detection() {
        let colors = vec![
            ColorRecord {
                hex: "#ffffff".to_string(),
                rgb: crate::color::Rgb::new(255, 255, 255),
                cmyk: Cmyk::WHITE,
                percentage: 37.50,
            },
            record("#336699", 62.50),
        ];

        let page = summarize_page(&colors);
        assert_eq!(page.white_space, 37.50);
        assert_eq!(page.colored_space, 62.50);
    }

    #[test]
    fn test_no_white_swatch() {
        let colors = vec![record("#ff0000", 70.0), record("#0000ff", 30.0)];
        let page = summarize_page(&colors);
        assert_eq!(page.white_space, 0.0);
        assert_eq!(page.colored_space, 100.0);
    }

    #[test]
    fn test_first_white_swatch_wins() {
        let colors = vec![record("#ffffff", 60.0), record("#ff0000", 30.0), record("#fefefe", 10.0)];
        assert_eq!(white_space(&colors), 60.0);
        assert_eq!(non_white_count(&colors), 1);
    }

    #[test]
    fn test_average_formula() {
        // red = 0 100 100 0, black = 0 0 0 100; two inked swatches, 50% colored
        let colors = vec![record("#ffffff", 50.0), record("#ff0000", 30.0), record("#000000", 20.0)];
        let page = summarize_page(&colors);

        assert_eq!(page.summary.m.value, 25.0);
        assert_eq!(page.summary.k.value, 25.0);
        assert_eq!(page.summary.c.value, 0.0);
        assert_eq!(page.summary.m.formula, "((100 / 2) / 100) * (50.00 / 100) * 100");
    }

    #[test]
    fn test_average_rounds_to_two_places() {
        let avg = channel_average(100, 3, 100.0);
        assert_eq!(avg.value, 33.33);
    }

    #[test]
    fn test_degenerate_empty_page() {
        let page = summarize_page(&[]);
        assert_eq!(page.total, CmykTotal::default());
        assert_eq!(page.summary.values(), [0.0; 4]);
        assert!(page.summary.values().iter().all(|v| !v.is_nan()));
    }

    #[test]
    fn test_degenerate_all_white_page() {
        let page = summarize_page(&[record("#ffffff", 100.0)]);
        assert_eq!(page.white_space, 100.0);
        assert_eq!(page.colored_space, 0.0);
        assert_eq!(page.summary.values(), [0.0; 4]);
        assert_eq!(page.summary.k.formula, "((0 / 0) / 100) * (0.00 / 100) * 100");
    }

    #[test]
    fn test_batch_form_is_parallel_arrays() {
        let pages = vec![
            vec![record("#ffffff", 80.0), record("#000000", 20.0)],
            vec![],
            vec![record("#00ff00", 100.0)],
        ];

        let coverage = summarize_pages(&pages);
        assert_eq!(coverage.len(), 3);
        assert_eq!(coverage.white_space, vec![80.0, 0.0, 0.0]);
        assert_eq!(coverage.colored_space, vec![20.0, 100.0, 100.0]);
        assert_eq!(coverage.summary[0].k.value, 20.0);
        assert_eq!(coverage.summary[1].values(), [0.0; 4]);
        assert_eq!(coverage.summary[2].c.value, 100.0);

        let second = coverage.page(1).unwrap();
        assert_eq!(second, summarize_page(&[]));
        assert!(coverage.page(3).is_none());
    }

    #[test]
    fn test_coverage_serializes_totals_as_strings() {
        let coverage = summarize_pages(&[vec![record("#000000", 100.0)]]);
        let json = serde_json::to_value(&coverage).unwrap();
        assert_eq!(json["total"][0], "0 0 0 100");
        assert_eq!(json["white_space"][0], 0.0);
        assert_eq!(json["summary"][0]["k"]["value"], 100.0);
    }
}
