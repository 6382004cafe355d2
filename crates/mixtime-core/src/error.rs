//! Error types for estimation, audio loading, and batch processing

use std::path::PathBuf;
use thiserror::Error;

/// Errors that reject an estimator call before anything is computed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimateError {
    #[error("Signal shorter than analysis window: {len} samples < window of {window}")]
    SignalTooShort { len: usize, window: usize },

    #[error("Analysis window length must be positive and even, got {0}")]
    InvalidWindowLength(usize),

    #[error("Sparse step must be positive")]
    ZeroSparseStep,

    #[error("Sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f64),

    #[error("Non-finite sample at index {index}")]
    NonFiniteSample { index: usize },
}

/// Errors from the audio-loading collaborator
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to decode WAV file {path}: {source}")]
    Wav {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("Unsupported sample format in {path}: {bits}-bit {format}")]
    UnsupportedFormat {
        path: PathBuf,
        bits: u16,
        format: &'static str,
    },

    #[error("Audio file contains no samples: {0}")]
    Empty(PathBuf),
}

/// Errors from the batch/table collaborator
///
/// [`BatchError::Load`], [`BatchError::Estimate`] and [`BatchError::EmptyPath`]
/// describe a single row; the batch records them and keeps going. The other
/// variants abort the batch.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Invalid analysis configuration: {0}")]
    InvalidConfig(EstimateError),

    #[error("Column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    #[error("Row {row} of {path} has {fields} fields but the header has {expected}")]
    TooManyFields {
        path: PathBuf,
        row: usize,
        fields: usize,
        expected: usize,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Row {row}: {source}")]
    Load {
        row: usize,
        #[source]
        source: LoadError,
    },

    #[error("Row {row}: {source}")]
    Estimate {
        row: usize,
        #[source]
        source: EstimateError,
    },

    #[error("Row {row}: empty path cell")]
    EmptyPath { row: usize },
}

/// Errors from chart rendering
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to draw {path}: {message}")]
    Draw { path: PathBuf, message: String },

    #[error("Nothing to plot: {0}")]
    Empty(&'static str),
}
