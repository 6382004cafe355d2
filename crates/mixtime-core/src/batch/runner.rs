//! Per-row mixing-time estimation over a CSV table
//!
//! Each row names an impulse response file. Rows are handed to a pool of
//! worker threads over a bounded channel; every worker shares the same
//! immutable [`EchoDensityEstimator`]. A row that fails to load or estimate
//! gets an empty cell and the batch continues.

use super::table::{format_value, Table};
use crate::config::{AnalysisConfig, BatchConfig};
use crate::density::estimator::{EchoDensityEstimator, MixingTimeResult};
use crate::error::BatchError;
use crate::io::wav::load_wav;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Result of a single row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowOutcome {
    Found { mixing_time_ms: f64 },
    NotFound,
    Failed { error: String },
}

impl RowOutcome {
    /// Cell written to the output column
    pub fn cell(&self, decimals: u32) -> String {
        match self {
            RowOutcome::Found { mixing_time_ms } => format_value(*mixing_time_ms, decimals),
            RowOutcome::NotFound => format_value(0.0, decimals),
            RowOutcome::Failed { .. } => String::new(),
        }
    }
}

/// One processed row
#[derive(Debug, Clone, Serialize)]
pub struct RowReport {
    /// Zero-based data row (header excluded)
    pub row: usize,
    pub path: String,
    pub outcome: RowOutcome,
}

/// Summary of a batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub total: usize,
    pub succeeded: usize,
    pub not_found: usize,
    pub failed: usize,
    pub rows: Vec<RowReport>,
}

/// Estimate every row of `input` and write the table to `output`
///
/// `output` may equal `input` to update the table in place.
///
/// # Errors
/// Fails before touching any row if the analysis config is invalid, the CSV
/// cannot be read, or the path column is missing. Fails after processing if
/// the output cannot be written. Per-row failures are not errors.
pub fn run_batch(
    input: &Path,
    output: &Path,
    analysis: &AnalysisConfig,
    batch: &BatchConfig,
) -> Result<BatchReport, BatchError> {
    let started_at = Utc::now();
    let timer = Instant::now();

    let estimator =
        EchoDensityEstimator::new(analysis.estimator_config()).map_err(BatchError::InvalidConfig)?;

    let mut table = Table::read(input)?;
    let path_index = table.require_column(&batch.path_column, input)?;
    let paths: Vec<String> = table.column(path_index).map(str::to_string).collect();

    tracing::info!(
        input = %input.display(),
        rows = paths.len(),
        workers = batch.workers,
        "Starting batch"
    );

    let outcomes = process_rows(&estimator, &paths, analysis.pre_delay_samples, batch);

    let cells = outcomes.iter().map(|o| o.cell(batch.decimals)).collect();
    table.set_column(&batch.output_column, cells);
    table.write(output)?;

    let rows: Vec<RowReport> = paths
        .into_iter()
        .zip(outcomes)
        .enumerate()
        .map(|(row, (path, outcome))| RowReport { row, path, outcome })
        .collect();

    let count = |pred: fn(&RowOutcome) -> bool| rows.iter().filter(|r| pred(&r.outcome)).count();
    let report = BatchReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        started_at,
        elapsed_ms: timer.elapsed().as_millis() as u64,
        total: rows.len(),
        succeeded: count(|o| matches!(o, RowOutcome::Found { .. })),
        not_found: count(|o| matches!(o, RowOutcome::NotFound)),
        failed: count(|o| matches!(o, RowOutcome::Failed { .. })),
        rows,
    };

    tracing::info!(
        output = %output.display(),
        succeeded = report.succeeded,
        not_found = report.not_found,
        failed = report.failed,
        elapsed_ms = report.elapsed_ms,
        "Updated table saved"
    );

    Ok(report)
}

/// Run every path through the worker pool, returning outcomes in row order
fn process_rows(
    estimator: &EchoDensityEstimator,
    paths: &[String],
    pre_delay_samples: usize,
    batch: &BatchConfig,
) -> Vec<RowOutcome> {
    let workers = batch.workers.clamp(1, paths.len().max(1));
    let (job_tx, job_rx) = crossbeam_channel::bounded::<usize>(workers * 2);
    let (result_tx, result_rx) = crossbeam_channel::unbounded::<(usize, RowOutcome)>();

    let mut outcomes: Vec<Option<RowOutcome>> = vec![None; paths.len()];

    std::thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                for row in job_rx {
                    let outcome = process_row(
                        estimator,
                        row,
                        &paths[row],
                        batch.audio_root.as_deref(),
                        pre_delay_samples,
                    );
                    if result_tx.send((row, outcome)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(result_tx);

        for row in 0..paths.len() {
            if job_tx.send(row).is_err() {
                break;
            }
        }
        drop(job_tx);

        for (row, outcome) in result_rx {
            outcomes[row] = Some(outcome);
        }
    });

    outcomes
        .into_iter()
        .map(|o| {
            o.unwrap_or_else(|| RowOutcome::Failed {
                error: "worker exited before processing row".to_string(),
            })
        })
        .collect()
}

fn process_row(
    estimator: &EchoDensityEstimator,
    row: usize,
    cell: &str,
    audio_root: Option<&Path>,
    pre_delay_samples: usize,
) -> RowOutcome {
    match estimate_row(estimator, row, cell, audio_root, pre_delay_samples) {
        Ok(result) if result.is_found() => {
            tracing::info!(row, path = cell, mixing_time_ms = result.mixing_time_ms(), "Processed");
            RowOutcome::Found {
                mixing_time_ms: result.mixing_time_ms(),
            }
        }
        Ok(result) => {
            tracing::warn!(row, path = cell, "{}", result.diagnostic());
            RowOutcome::NotFound
        }
        Err(e) => {
            tracing::warn!(row, path = cell, error = %e, "Error processing row");
            RowOutcome::Failed {
                error: e.to_string(),
            }
        }
    }
}

fn estimate_row(
    estimator: &EchoDensityEstimator,
    row: usize,
    cell: &str,
    audio_root: Option<&Path>,
    pre_delay_samples: usize,
) -> Result<MixingTimeResult, BatchError> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Err(BatchError::EmptyPath { row });
    }
    let path = resolve_path(cell, audio_root);

    let signal = load_wav(&path).map_err(|source| BatchError::Load { row, source })?;
    estimator
        .estimate(&signal.samples, signal.sample_rate, pre_delay_samples)
        .map_err(|source| BatchError::Estimate { row, source })
}

fn resolve_path(cell: &str, audio_root: Option<&Path>) -> PathBuf {
    let path = Path::new(cell);
    match audio_root {
        Some(root) if path.is_relative() => root.join(path),
        _ => path.to_path_buf(),
    }
}
