//! Export of estimation results for plotting and reporting
//!
//! The curve is written as CSV (`time_s,amplitude,echo_density`) so any
//! plotting tool can draw the impulse response and its echo density on a
//! shared time axis. [`EstimateReport`] is the JSON form of one estimate.

use crate::density::estimator::MixingTimeResult;
use crate::error::BatchError;
use crate::signal::Signal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serializable summary of one estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateReport {
    pub file: Option<String>,
    pub sample_rate: f64,
    pub samples: usize,
    pub window_length: usize,
    pub pre_delay_samples: usize,
    pub found: bool,
    /// Sentinel 0.0 when not found
    pub mixing_time_ms: f64,
    pub crossing_index: Option<usize>,
    pub peak_density: f64,
    pub diagnostic: String,
}

impl EstimateReport {
    pub fn new(file: Option<&Path>, window_length: usize, result: &MixingTimeResult) -> Self {
        Self {
            file: file.map(|p| p.display().to_string()),
            sample_rate: result.sample_rate,
            samples: result.curve.len(),
            window_length,
            pre_delay_samples: result.pre_delay_samples,
            found: result.is_found(),
            mixing_time_ms: result.mixing_time_ms(),
            crossing_index: result.crossing_index(),
            peak_density: result.curve.peak(),
            diagnostic: result.diagnostic().to_string(),
        }
    }
}

/// Write `time_s,amplitude,echo_density` rows for every sample
pub fn write_curve_csv(
    path: &Path,
    signal: &Signal,
    result: &MixingTimeResult,
) -> Result<(), BatchError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["time_s", "amplitude", "echo_density"])?;

    for ((t, &x), &d) in signal
        .time_axis()
        .zip(&signal.samples)
        .zip(result.curve.values())
    {
        writer.write_record([t.to_string(), x.to_string(), d.to_string()])?;
    }
    writer.flush()?;

    tracing::info!(path = %path.display(), rows = signal.len(), "Echo density curve exported");
    Ok(())
}
