//! Equal-width histogram of a column of values

use serde::Serialize;
use std::fmt::Write;

/// Default number of bins
pub const DEFAULT_BINS: usize = 20;

/// Histogram with `bins` equal-width bins spanning the data range
///
/// The last bin includes its right edge. When every value is equal the range
/// is widened to `value ± 0.5`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// `bins + 1` increasing bin edges
    pub edges: Vec<f64>,
    /// Count per bin
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin the finite values of `values`
    ///
    /// Returns `None` if there are no finite values or `bins` is zero.
    pub fn new(values: &[f64], bins: usize) -> Option<Self> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() || bins == 0 {
            return None;
        }

        let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();

        let mut counts = vec![0usize; bins];
        for v in finite {
            let bin = (((v - lo) / width) as usize).min(bins - 1);
            counts[bin] += 1;
        }

        Some(Self { edges, counts })
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Text bar chart, longest bar `width` characters
    pub fn render_text(&self, width: usize) -> String {
        let max = self.counts.iter().copied().max().unwrap_or(0).max(1);
        let mut out = String::new();
        for (i, &count) in self.counts.iter().enumerate() {
            let bar = count * width / max;
            let _ = writeln!(
                out,
                "{:>10.2} - {:<10.2} | {:<bar_width$} {}",
                self.edges[i],
                self.edges[i + 1],
                "#".repeat(bar),
                count,
                bar_width = width
            );
        }
        out
    }
}
