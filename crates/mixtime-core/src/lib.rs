//! Mixtime Core - Echo density, mixing-time estimation, and batch processing
//!
//! This library estimates the mixing time of a room impulse response with the
//! normalized echo density criterion (Abel/Huang). The estimator lives in
//! [`density`]; loading, table processing and statistics around it live in
//! [`io`], [`batch`] and [`stats`]. [`plot`] renders
//! the results as PNG or SVG charts.

pub mod batch;
pub mod config;
pub mod density;
pub mod error;
pub mod export;
pub mod io;
pub mod plot;
pub mod signal;
pub mod stats;

pub use config::{AnalysisConfig, BatchConfig, MixtimeConfig};
pub use density::estimator::{
    estimate, EchoDensityEstimator, EstimatorConfig, MixingOutcome, MixingTimeResult,
};
pub use density::{curve::EchoDensityCurve, window::AnalysisWindow};
pub use error::{BatchError, EstimateError, LoadError, PlotError};
pub use signal::{NoiseGenerator, Signal};

/// Library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date stamped by build.rs (YYYY-MM-DD)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Version with build date, shown by `mixtime --version`
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (built ",
    env!("BUILD_DATE"),
    ")"
);

/// Default analysis window length in samples
pub const DEFAULT_WINDOW_LENGTH: usize = 1024;

/// Distance between exactly computed echo density nodes
pub const DEFAULT_SPARSE_STEP: usize = 500;

/// Normalized echo density that must be exceeded at the mixing time
pub const DEFAULT_MIXING_THRESHOLD: f64 = 1.0;

/// Fraction of total energy that must have arrived at the mixing time
pub const DEFAULT_ENERGY_THRESHOLD: f64 = 0.1;
