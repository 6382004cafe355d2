//! Persistent analysis and batch configuration
//!
//! Stored as JSON. Every field has a serde default, so partial files and
//! `{}` are valid and older files keep loading when fields are added.

use crate::density::estimator::EstimatorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_window_length() -> usize {
    crate::DEFAULT_WINDOW_LENGTH
}

fn default_sparse_step() -> usize {
    crate::DEFAULT_SPARSE_STEP
}

fn default_mixing_threshold() -> f64 {
    crate::DEFAULT_MIXING_THRESHOLD
}

fn default_energy_threshold() -> f64 {
    crate::DEFAULT_ENERGY_THRESHOLD
}

fn default_path_column() -> String {
    "file_rir".to_string()
}

fn default_output_column() -> String {
    "t_abel".to_string()
}

fn default_decimals() -> u32 {
    2
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Estimator parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Analysis window length in samples (even)
    #[serde(default = "default_window_length")]
    pub window_length: usize,
    /// Samples subtracted from the detected crossing index
    #[serde(default)]
    pub pre_delay_samples: usize,
    /// Distance between exactly computed density nodes
    #[serde(default = "default_sparse_step")]
    pub sparse_step: usize,
    /// Normalized echo density that must be exceeded
    #[serde(default = "default_mixing_threshold")]
    pub mixing_threshold: f64,
    /// Cumulative energy fraction that must be reached
    #[serde(default = "default_energy_threshold")]
    pub energy_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_length: default_window_length(),
            pre_delay_samples: 0,
            sparse_step: default_sparse_step(),
            mixing_threshold: default_mixing_threshold(),
            energy_threshold: default_energy_threshold(),
        }
    }
}

impl AnalysisConfig {
    /// Estimator policy part of this config
    pub fn estimator_config(&self) -> EstimatorConfig {
        EstimatorConfig {
            window_length: self.window_length,
            sparse_step: self.sparse_step,
            mixing_threshold: self.mixing_threshold,
            energy_threshold: self.energy_threshold,
        }
    }
}

/// Table processing parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Column holding impulse response file paths
    #[serde(default = "default_path_column")]
    pub path_column: String,
    /// Column receiving the mixing times (replaced if present)
    #[serde(default = "default_output_column")]
    pub output_column: String,
    /// Decimal places of the written mixing times
    #[serde(default = "default_decimals")]
    pub decimals: u32,
    /// Worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Base directory for relative paths (None = current directory)
    #[serde(default)]
    pub audio_root: Option<PathBuf>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            path_column: default_path_column(),
            output_column: default_output_column(),
            decimals: default_decimals(),
            workers: default_workers(),
            audio_root: None,
        }
    }
}

/// Complete configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MixtimeConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

impl MixtimeConfig {
    /// Load config from `path`
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)?;
        tracing::info!(path = %path.display(), "Loaded config from disk");
        Ok(config)
    }

    /// Load config from `path`, falling back to defaults on any error
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to load config, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Save config to disk, creating parent directories if needed
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::info!(path = %path.display(), "Config saved to disk");
        Ok(())
    }
}
