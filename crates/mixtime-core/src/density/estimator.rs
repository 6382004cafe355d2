//! Mixing-time estimation from normalized echo density
//!
//! Implements the Abel/Huang criterion: the echo density at time `n` is the
//! window-weighted fraction of samples whose magnitude exceeds the local
//! windowed RMS, divided by the same fraction for a Gaussian process
//! (`erfc(1/√2)`). The mixing time is the first sample where that density
//! exceeds the mixing threshold after enough of the total energy has arrived.
//!
//! ## Sparse evaluation
//!
//! The density is computed exactly every `sparse_step` samples and linearly
//! interpolated in between, trading a little accuracy for roughly a
//! `sparse_step`-fold speedup over evaluating every sample.

use super::curve::EchoDensityCurve;
use super::energy::cumulative_energy_fraction;
use super::window::AnalysisWindow;
use crate::error::EstimateError;
use crate::{
    DEFAULT_ENERGY_THRESHOLD, DEFAULT_MIXING_THRESHOLD, DEFAULT_SPARSE_STEP,
    DEFAULT_WINDOW_LENGTH,
};

/// Message reported when no sample satisfies both detection criteria
pub const NOT_FOUND_DIAGNOSTIC: &str = "Mixing time not found within the given limits";

/// Message reported when a mixing time was detected
pub const FOUND_DIAGNOSTIC: &str = "found";

/// Expected weighted outlier fraction `P(|x| > σ)` of a Gaussian process
pub fn gaussian_outlier_fraction() -> f64 {
    libm::erfc(std::f64::consts::FRAC_1_SQRT_2)
}

/// Tunable constants of the detection policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatorConfig {
    /// Analysis window length `N` (positive, even)
    pub window_length: usize,
    /// Distance between exactly computed density nodes
    pub sparse_step: usize,
    /// Normalized density that must be strictly exceeded
    pub mixing_threshold: f64,
    /// Cumulative energy fraction that must be reached
    pub energy_threshold: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            window_length: DEFAULT_WINDOW_LENGTH,
            sparse_step: DEFAULT_SPARSE_STEP,
            mixing_threshold: DEFAULT_MIXING_THRESHOLD,
            energy_threshold: DEFAULT_ENERGY_THRESHOLD,
        }
    }
}

/// Outcome of the threshold search
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MixingOutcome {
    /// Both criteria hold from `index` on the first time
    Found {
        /// Sample index of the first crossing (before pre-delay subtraction)
        index: usize,
        /// `(index - pre_delay) / sample_rate` in milliseconds; may be negative
        mixing_time_ms: f64,
    },
    /// No sample satisfies both criteria
    NotFound,
}

/// Mixing time together with the curve that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct MixingTimeResult {
    pub outcome: MixingOutcome,
    pub curve: EchoDensityCurve,
    pub sample_rate: f64,
    pub pre_delay_samples: usize,
}

impl MixingTimeResult {
    /// Mixing time in milliseconds, or the sentinel 0.0 when not found
    ///
    /// Use [`Self::is_found`] to tell the sentinel from a genuine 0 ms result.
    pub fn mixing_time_ms(&self) -> f64 {
        match self.outcome {
            MixingOutcome::Found { mixing_time_ms, .. } => mixing_time_ms,
            MixingOutcome::NotFound => 0.0,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self.outcome, MixingOutcome::Found { .. })
    }

    /// Sample index of the threshold crossing
    pub fn crossing_index(&self) -> Option<usize> {
        match self.outcome {
            MixingOutcome::Found { index, .. } => Some(index),
            MixingOutcome::NotFound => None,
        }
    }

    /// Human readable description of the outcome
    pub fn diagnostic(&self) -> &'static str {
        if self.is_found() {
            FOUND_DIAGNOSTIC
        } else {
            NOT_FOUND_DIAGNOSTIC
        }
    }
}

/// Echo density / mixing-time estimator
///
/// Holds the validated configuration and the precomputed analysis window.
/// Immutable after construction, so one instance can be shared between
/// threads.
///
/// # Example
/// ```
/// use mixtime_core::{EchoDensityEstimator, NoiseGenerator};
///
/// let estimator = EchoDensityEstimator::default();
/// let signal = NoiseGenerator::new(7).silence_then_noise(1000, 4000);
/// let result = estimator.estimate(&signal, 48000.0, 0).unwrap();
/// assert_eq!(result.curve.len(), signal.len());
/// ```
#[derive(Debug, Clone)]
pub struct EchoDensityEstimator {
    config: EstimatorConfig,
    window: AnalysisWindow,
}

impl Default for EchoDensityEstimator {
    fn default() -> Self {
        Self {
            config: EstimatorConfig::default(),
            window: AnalysisWindow::new(DEFAULT_WINDOW_LENGTH)
                .unwrap_or_else(|_| unreachable!("default window length is even")),
        }
    }
}

impl EchoDensityEstimator {
    /// Create an estimator, validating the window length and sparse step
    pub fn new(config: EstimatorConfig) -> Result<Self, EstimateError> {
        if config.sparse_step == 0 {
            return Err(EstimateError::ZeroSparseStep);
        }
        let window = AnalysisWindow::new(config.window_length)?;
        Ok(Self { config, window })
    }

    /// Default policy with a custom window length
    pub fn with_window_length(window_length: usize) -> Result<Self, EstimateError> {
        Self::new(EstimatorConfig {
            window_length,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    pub fn window(&self) -> &AnalysisWindow {
        &self.window
    }

    /// Estimate the mixing time of `signal`
    ///
    /// # Arguments
    /// * `signal` - Impulse response samples
    /// * `sample_rate` - Sample rate in Hz
    /// * `pre_delay_samples` - Samples subtracted from the crossing index
    ///
    /// # Errors
    /// [`EstimateError`] if the sample rate is not positive and finite, the
    /// signal is shorter than the window, or a sample is NaN or infinite.
    pub fn estimate(
        &self,
        signal: &[f32],
        sample_rate: f64,
        pre_delay_samples: usize,
    ) -> Result<MixingTimeResult, EstimateError> {
        self.validate(signal, sample_rate)?;

        let curve = self.echo_density(signal);
        let energy = cumulative_energy_fraction(signal);

        let crossing = curve
            .values()
            .iter()
            .zip(&energy)
            .position(|(&d, &e)| {
                d > self.config.mixing_threshold && e >= self.config.energy_threshold
            });

        let outcome = match crossing {
            Some(index) => {
                let mixing_time_ms =
                    (index as f64 - pre_delay_samples as f64) / sample_rate * 1000.0;
                tracing::debug!(index, mixing_time_ms, "Mixing time detected");
                MixingOutcome::Found {
                    index,
                    mixing_time_ms,
                }
            }
            None => {
                tracing::debug!(
                    samples = signal.len(),
                    peak_density = curve.peak(),
                    "{}",
                    NOT_FOUND_DIAGNOSTIC
                );
                MixingOutcome::NotFound
            }
        };

        Ok(MixingTimeResult {
            outcome,
            curve,
            sample_rate,
            pre_delay_samples,
        })
    }

    /// Normalized echo density curve over the whole signal
    ///
    /// Exact at every `sparse_step`-th sample, interpolated elsewhere. The
    /// caller must have checked that the signal is at least one window long.
    pub fn echo_density(&self, signal: &[f32]) -> EchoDensityCurve {
        let reference = gaussian_outlier_fraction();

        let (nodes, values): (Vec<usize>, Vec<f64>) = (0..signal.len())
            .step_by(self.config.sparse_step)
            .filter_map(|n| Some((n, self.local_density(signal, n)? / reference)))
            .unzip();

        EchoDensityCurve::from_nodes(signal.len(), nodes, values)
    }

    /// Un-normalized echo density at sample `n`
    ///
    /// The weighted mass of samples whose magnitude exceeds the windowed RMS
    /// `sqrt(Σ w·h²)` of the segment around `n`. `None` if `n` is past the
    /// end of `signal`.
    pub fn local_density(&self, signal: &[f32], n: usize) -> Option<f64> {
        let (segment, weights) = self.window.segment(signal, n)?;

        let local_rms = segment
            .iter()
            .zip(weights)
            .map(|(&h, &w)| {
                let h = h as f64;
                w * h * h
            })
            .sum::<f64>()
            .sqrt();

        let density = segment
            .iter()
            .zip(weights)
            .filter(|&(&h, _)| (h as f64).abs() > local_rms)
            .map(|(_, &w)| w)
            .sum();
        Some(density)
    }

    fn validate(&self, signal: &[f32], sample_rate: f64) -> Result<(), EstimateError> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(EstimateError::InvalidSampleRate(sample_rate));
        }
        if signal.len() < self.window.len() {
            return Err(EstimateError::SignalTooShort {
                len: signal.len(),
                window: self.window.len(),
            });
        }
        if let Some(index) = signal.iter().position(|x| !x.is_finite()) {
            return Err(EstimateError::NonFiniteSample { index });
        }
        Ok(())
    }
}

/// One-shot estimate with the default policy and a custom window length
///
/// Equivalent to `EchoDensityEstimator::with_window_length(window_length)?.estimate(...)`.
pub fn estimate(
    signal: &[f32],
    sample_rate: f64,
    window_length: usize,
    pre_delay_samples: usize,
) -> Result<MixingTimeResult, EstimateError> {
    EchoDensityEstimator::with_window_length(window_length)?.estimate(
        signal,
        sample_rate,
        pre_delay_samples,
    )
}
