//! Mixtime - mixing-time estimation for room impulse responses
//!
//! This library re-exports the estimator, audio loading, batch processing
//! and statistics functionality from `mixtime-core`.
//!
//! The `mixtime` binary wraps it in a command line tool.

pub use mixtime_core::{batch, config, density, error, export, io, plot, signal, stats};

pub use mixtime_core::{
    estimate, AnalysisConfig, AnalysisWindow, BatchConfig, BatchError, EchoDensityCurve,
    EchoDensityEstimator, EstimateError, EstimatorConfig, LoadError, MixingOutcome,
    MixingTimeResult, MixtimeConfig, NoiseGenerator, PlotError, Signal,
};
pub use mixtime_core::{
    BUILD_DATE, DEFAULT_ENERGY_THRESHOLD, DEFAULT_MIXING_THRESHOLD, DEFAULT_SPARSE_STEP,
    DEFAULT_WINDOW_LENGTH, LONG_VERSION, VERSION,
};
