//! Normalized echo density analysis
//!
//! This module contains the mixing-time estimator and its building blocks:
//! - Normalized Hann analysis window and edge-aware segment selection ([`window`])
//! - Sparse-node echo density curve and interpolation ([`curve`])
//! - Cumulative energy fraction ([`energy`])
//! - The estimator itself and its result types ([`estimator`])

pub mod curve;
pub mod energy;
pub mod estimator;
pub mod window;

pub use estimator::{estimate, EchoDensityEstimator, EstimatorConfig, MixingOutcome};
