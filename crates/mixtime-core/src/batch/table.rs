//! In-memory CSV table
//!
//! Cells are kept as strings so columns the batch does not touch are written
//! back exactly as read. Short rows are padded with empty cells; rows longer
//! than the header are rejected, since their extra cells have no column.

use crate::error::BatchError;
use csv::{ReaderBuilder, Writer};
use std::path::Path;

/// Header row plus string cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Read a CSV file with a header row
    pub fn read(path: &Path) -> Result<Self, BatchError> {
        let mut reader = ReaderBuilder::new().flexible(true).from_path(path)?;
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() > headers.len() {
                return Err(BatchError::TooManyFields {
                    path: path.to_path_buf(),
                    row: index,
                    fields: record.len(),
                    expected: headers.len(),
                });
            }
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            if row.len() < headers.len() {
                row.resize(headers.len(), String::new());
            }
            rows.push(row);
        }

        tracing::debug!(path = %path.display(), rows = rows.len(), "Read table");
        Ok(Self { headers, rows })
    }

    /// Write the table as CSV, creating or truncating `path`
    pub fn write(&self, path: &Path) -> Result<(), BatchError> {
        let mut writer = Writer::from_path(path)?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Index of `name`, or [`BatchError::MissingColumn`] naming `path`
    pub fn require_column(&self, name: &str, path: &Path) -> Result<usize, BatchError> {
        self.column_index(name)
            .ok_or_else(|| BatchError::MissingColumn {
                column: name.to_string(),
                path: path.to_path_buf(),
            })
    }

    /// Cells of column `index`, one per row
    pub fn column(&self, index: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(String::as_str).unwrap_or(""))
    }

    /// Replace column `name` with `values`, appending it if absent
    ///
    /// `values` must have one entry per row.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) {
        debug_assert_eq!(values.len(), self.rows.len());

        let index = match self.column_index(name) {
            Some(index) => index,
            None => {
                self.headers.push(name.to_string());
                self.headers.len() - 1
            }
        };

        for (row, value) in self.rows.iter_mut().zip(values) {
            if row.len() <= index {
                row.resize(index + 1, String::new());
            }
            row[index] = value;
        }
    }
}

/// Round half to even at `decimals` places
pub fn round_half_even(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    let rounded = (value * scale).round_ties_even() / scale;
    // Avoid writing "-0.0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Cell text for a numeric value rounded to `decimals` places
pub fn format_value(value: f64, decimals: u32) -> String {
    format!("{:?}", round_half_even(value, decimals))
}

/// Finite numeric values of `column`, skipping empty or unparseable cells
pub fn read_numeric_column(path: &Path, column: &str) -> Result<Vec<f64>, BatchError> {
    let table = Table::read(path)?;
    let index = table.require_column(column, path)?;
    Ok(table
        .column(index)
        .filter_map(|cell| cell.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_csv(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_read_and_write_preserve_cells() {
        let dir = tempdir().unwrap();
        let contents = "id,file_rir,note\n1,a.wav,\"x, y\"\n2,b.wav,z\n";
        let path = write_csv(dir.path(), "in.csv", contents);

        let table = Table::read(&path).unwrap();
        assert_eq!(table.headers, vec!["id", "file_rir", "note"]);
        assert_eq!(table.rows[0], vec!["1", "a.wav", "x, y"]);

        let out = dir.path().join("out.csv");
        table.write(&out).unwrap();
        assert_eq!(Table::read(&out).unwrap(), table);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let dir = tempdir().unwrap();
        let path = write_csv(dir.path(), "short.csv", "a,b,c\n1\n1,2,3\n");
        let table = Table::read(&path).unwrap();
        assert_eq!(table.rows[0], vec!["1", "", ""]);
    }

    #[test]
    fn test_long_rows_are_rejected() {
        let dir = tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "long.csv",
            "room,file_rir\nhall,a.wav\nattic,b.wav,operator note\n",
        );

        let err = Table::read(&path).unwrap_err();
        assert!(matches!(
            err,
            BatchError::TooManyFields {
                row: 1,
                fields: 3,
                expected: 2,
                ..
            }
        ));
        assert!(err.to_string().contains("long.csv"));

        // Two extra cells fail the same way instead of breaking the writer later
        let path = write_csv(dir.path(), "longer.csv", "room,file_rir\nhall,a.wav,x,y\n");
        assert!(matches!(
            Table::read(&path),
            Err(BatchError::TooManyFields { row: 0, fields: 4, .. })
        ));
    }

    #[test]
    fn test_set_column_appends_and_replaces() {
        let mut table = Table {
            headers: vec!["file_rir".into()],
            rows: vec![vec!["a.wav".into()], vec!["b.wav".into()]],
        };

        table.set_column("t_abel", vec!["1.5".into(), "".into()]);
        assert_eq!(table.headers, vec!["file_rir", "t_abel"]);
        assert_eq!(table.rows[0], vec!["a.wav", "1.5"]);

        table.set_column("t_abel", vec!["2.0".into(), "3.0".into()]);
        assert_eq!(table.headers.len(), 2);
        assert_eq!(table.column(1).collect::<Vec<_>>(), vec!["2.0", "3.0"]);
    }

    #[test]
    fn test_missing_column() {
        let dir = tempdir().unwrap();
        let path = write_csv(dir.path(), "t.csv", "a,b\n1,2\n");
        let err = read_numeric_column(&path, "t_abel").unwrap_err();
        assert!(matches!(err, BatchError::MissingColumn { ref column, .. } if column == "t_abel"));
    }

    #[test]
    fn test_read_numeric_column_drops_missing() {
        let dir = tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "t.csv",
            "file_rir,t_abel\na.wav,20.83\nb.wav,\nc.wav,NaN\nd.wav,31.5\ne.wav,oops\n",
        );
        assert_eq!(read_numeric_column(&path, "t_abel").unwrap(), vec![20.83, 31.5]);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(format_value(20.8333333, 2), "20.83");
        assert_eq!(format_value(29.0, 2), "29.0");
        assert_eq!(format_value(-0.001, 2), "0.0");
        assert_eq!(format_value(-3.14159, 2), "-3.14");
        // Ties go to even
        assert_eq!(round_half_even(2.5, 0), 2.0);
        assert_eq!(round_half_even(3.5, 0), 4.0);
    }
}
