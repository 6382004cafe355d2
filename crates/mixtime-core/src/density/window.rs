//! Normalized Hann analysis window
//!
//! The window localizes the echo density statistics in time. Its weights sum
//! to 1 so that every windowed sum is a weighted average.

use crate::error::EstimateError;

/// Symmetric Hann window normalized to unit sum
///
/// # Example
/// ```
/// use mixtime_core::density::window::AnalysisWindow;
///
/// let window = AnalysisWindow::new(1024).unwrap();
/// let total: f64 = window.weights().iter().sum();
/// assert!((total - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisWindow {
    weights: Vec<f64>,
    half: usize,
}

impl AnalysisWindow {
    /// Build a window of `length` samples
    ///
    /// # Errors
    /// [`EstimateError::InvalidWindowLength`] if `length` is zero or odd.
    pub fn new(length: usize) -> Result<Self, EstimateError> {
        if length == 0 || length % 2 != 0 {
            return Err(EstimateError::InvalidWindowLength(length));
        }

        // Symmetric Hann: both end points are zero
        let denom = (length - 1) as f64;
        let raw: Vec<f64> = (0..length)
            .map(|k| 0.5 - 0.5 * (2.0 * std::f64::consts::PI * k as f64 / denom).cos())
            .collect();

        let sum: f64 = raw.iter().sum();
        let weights = raw.into_iter().map(|w| w / sum).collect();

        Ok(Self {
            weights,
            half: length / 2,
        })
    }

    /// Window length `N`
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Always false; a window has at least two weights
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// `N / 2`
    pub fn half(&self) -> usize {
        self.half
    }

    /// Normalized weights
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Select the local segment centered on `n` and its matching weights
    ///
    /// Three regimes, checked in this order:
    /// - `n <= N/2`: `signal[..n + N/2]`, window right-aligned (last weights)
    /// - `n < len - N/2`: `signal[n - N/2..n + N/2]`, full window
    /// - otherwise: `signal[n - N/2..]`, window left-aligned (first weights)
    ///
    /// The two returned slices always have the same length. Returns `None`
    /// if `n` is not an index into `signal`.
    pub fn segment<'a, 'w>(
        &'w self,
        signal: &'a [f32],
        n: usize,
    ) -> Option<(&'a [f32], &'w [f64])> {
        let half = self.half;
        let len = signal.len();
        if n >= len {
            return None;
        }

        let selected = if n <= half {
            let end = (n + half).min(len);
            let segment = &signal[..end];
            (segment, &self.weights[self.len() - segment.len()..])
        } else if n + half < len {
            (&signal[n - half..n + half], &self.weights[..])
        } else {
            let segment = &signal[n - half..];
            (segment, &self.weights[..segment.len()])
        };
        Some(selected)
    }
}
