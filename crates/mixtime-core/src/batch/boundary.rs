//! Mixing time to boundary sample conversion
//!
//! Downstream tools split impulse responses into early reflections and late
//! reverberation at a sample index. This derives that index from a column of
//! mixing times in milliseconds.

use super::table::Table;
use crate::error::BatchError;
use std::path::Path;

/// Default name of the derived boundary column
pub const DEFAULT_BOUNDARY_COLUMN: &str = "BP2";

/// Default sample rate of the boundary index (48 kHz)
pub const DEFAULT_BOUNDARY_SAMPLE_RATE: f64 = 48000.0;

/// Sample index of `mixing_time_ms` at `sample_rate`, rounded half to even
pub fn boundary_sample(mixing_time_ms: f64, sample_rate: f64) -> i64 {
    (mixing_time_ms * (sample_rate / 1000.0)).round_ties_even() as i64
}

/// Add `boundary_column` derived from `source_column` and write to `output`
///
/// Cells with a missing or unparseable mixing time stay empty.
///
/// # Returns
/// Number of rows that received a boundary value
pub fn derive_boundary_column(
    input: &Path,
    output: &Path,
    source_column: &str,
    boundary_column: &str,
    sample_rate: f64,
) -> Result<usize, BatchError> {
    let mut table = Table::read(input)?;
    let source = table.require_column(source_column, input)?;

    let values: Vec<String> = table
        .column(source)
        .map(|cell| match cell.trim().parse::<f64>() {
            Ok(ms) if ms.is_finite() => boundary_sample(ms, sample_rate).to_string(),
            _ => String::new(),
        })
        .collect();
    let converted = values.iter().filter(|v| !v.is_empty()).count();

    table.set_column(boundary_column, values);
    table.write(output)?;

    tracing::info!(
        output = %output.display(),
        converted,
        skipped = table.rows.len() - converted,
        "Boundary column saved"
    );
    Ok(converted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_boundary_sample() {
        assert_eq!(boundary_sample(20.83, 48000.0), 1000);
        assert_eq!(boundary_sample(0.0, 48000.0), 0);
        assert_eq!(boundary_sample(10.0, 44100.0), 441);
        assert_eq!(boundary_sample(-5.0, 48000.0), -240);
        // 0.5 sample ties round to even
        assert_eq!(boundary_sample(0.03125, 48000.0), 2);
    }

    #[test]
    fn test_derive_boundary_column() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.csv");
        let output = dir.path().join("out.csv");
        std::fs::write(&input, "file_rir,t_abel\na.wav,20.83\nb.wav,\nc.wav,31.25\n").unwrap();

        let converted =
            derive_boundary_column(&input, &output, "t_abel", DEFAULT_BOUNDARY_COLUMN, 48000.0)
                .unwrap();
        assert_eq!(converted, 2);

        let table = Table::read(&output).unwrap();
        assert_eq!(table.headers, vec!["file_rir", "t_abel", "BP2"]);
        let bp: Vec<&str> = table.column(2).collect();
        assert_eq!(bp, vec!["1000", "", "1500"]);
    }

    #[test]
    fn test_derive_boundary_missing_column() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.csv");
        std::fs::write(&input, "file_rir\na.wav\n").unwrap();

        let output = dir.path().join("o.csv");
        let err =
            derive_boundary_column(&input, &output, "t_abel", "BP2", 48000.0).unwrap_err();
        assert!(matches!(err, BatchError::MissingColumn { .. }));
    }
}
