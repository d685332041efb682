//! Whitespace-delimited numeric matrices and vertex label files.
//!
//! Connectome files are plain text with one row per line and values
//! separated by any run of spaces or tabs. Label files are CSV with one integer per line.

use std::path::Path;

use csv::{ReaderBuilder, Trim};

use qc_model::Matrix;

use crate::error::{IngestError, Result};

/// Reads a whitespace-delimited numeric matrix.
///
/// `nan`, `inf` and `-inf` are accepted. Spaces and tabs may be mixed and
/// repeated.
/// Every row must have the same number of values.
pub fn read_matrix(path: &Path) -> Result<Matrix> {
    read_delimited(path, b' ')
}

/// Reads a comma-delimited numeric matrix.
pub fn read_csv_matrix(path: &Path) -> Result<Matrix> {
    read_delimited(path, b',')
}

fn read_delimited(path: &Path, delimiter: u8) -> Result<Matrix> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(|source| IngestError::Delimited {
            path: path.to_path_buf(),
            source,
        })?;

    let mut rows: Vec<Vec<f64>> = Vec::new();
    for record_result in reader.records() {
        let record = record_result.map_err(|source| IngestError::Delimited {
            path: path.to_path_buf(),
            source,
        })?;
        let line = record.position().map_or(0, |pos| pos.line());

        let mut row = Vec::with_capacity(record.len());
        for field in record.iter().flat_map(str::split_whitespace) {
            let value = parse_value(field).ok_or_else(|| IngestError::InvalidNumber {
                path: path.to_path_buf(),
                line,
                value: field.to_string(),
            })?;
            row.push(value);
        }
        if row.is_empty() {
            continue;
        }

        if let Some(first) = rows.first()
            && first.len() != row.len()
        {
            return Err(IngestError::RaggedMatrix {
                path: path.to_path_buf(),
                line,
                expected: first.len(),
                found: row.len(),
            });
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(IngestError::EmptyMatrix {
            path: path.to_path_buf(),
        });
    }

    Matrix::from_rows(rows).ok_or_else(|| IngestError::EmptyMatrix {
        path: path.to_path_buf(),
    })
}

fn parse_value(field: &str) -> Option<f64> {
    field.parse::<f64>().ok()
}

/// Reads a vertex label file: one integer label per line.
///
/// Values written as floats (`12.0`) are accepted when integral.
pub fn read_labels(path: &Path) -> Result<Vec<i64>> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(|source| IngestError::Delimited {
            path: path.to_path_buf(),
            source,
        })?;

    let mut labels = Vec::new();
    for record_result in reader.records() {
        let record = record_result.map_err(|source| IngestError::Delimited {
            path: path.to_path_buf(),
            source,
        })?;
        let line = record.position().map_or(0, |pos| pos.line());
        for field in record.iter().flat_map(str::split_whitespace) {
            let label = parse_label(field).ok_or_else(|| IngestError::InvalidNumber {
                path: path.to_path_buf(),
                line,
                value: field.to_string(),
            })?;
            labels.push(label);
        }
    }
    Ok(labels)
}

fn parse_label(field: &str) -> Option<i64> {
    if let Ok(value) = field.parse::<i64>() {
        return Some(value);
    }
    let value = field.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 {
        #[allow(clippy::cast_possible_truncation)]
        Some(value as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn reads_space_delimited_matrix() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "fc.txt", "1 2 3\n4  5 6\n\n7 8 nan\n");
        let m = read_matrix(&path).unwrap();
        assert_eq!(m.rows(), 3);
        assert_eq!(m.cols(), 3);
        assert_eq!(m.get(1, 1), 5.0);
        assert!(m.get(2, 2).is_nan());
    }

    #[test]
    fn reads_tab_delimited_matrix() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "fc.txt", "1\t2\n3\t\t4\n5 \t6\n");
        let m = read_matrix(&path).unwrap();
        assert_eq!(m.rows(), 3);
        assert_eq!(m.row(0), &[1.0, 2.0]);
        assert_eq!(m.row(1), &[3.0, 4.0]);
        assert_eq!(m.row(2), &[5.0, 6.0]);
    }

    #[test]
    fn reads_infinities() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "sc.txt", "0 inf\n-inf 1e-3\n");
        let m = read_matrix(&path).unwrap();
        assert_eq!(m.get(0, 1), f64::INFINITY);
        assert_eq!(m.get(1, 0), f64::NEG_INFINITY);
        assert!((m.get(1, 1) - 0.001).abs() < 1e-12);
    }

    #[test]
    fn rejects_ragged_rows() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bad.txt", "1 2 3\n4 5\n");
        let err = read_matrix(&path).unwrap_err();
        assert!(matches!(
            err,
            IngestError::RaggedMatrix {
                expected: 3,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn rejects_non_numeric_values() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bad.txt", "1 x\n");
        let err = read_matrix(&path).unwrap_err();
        assert!(matches!(err, IngestError::InvalidNumber { ref value, .. } if value == "x"));
    }

    #[test]
    fn rejects_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "empty.txt", "\n\n");
        assert!(matches!(
            read_matrix(&path).unwrap_err(),
            IngestError::EmptyMatrix { .. }
        ));
    }

    #[test]
    fn missing_matrix_is_file_not_found() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            read_matrix(&dir.path().join("none.txt")).unwrap_err(),
            IngestError::FileNotFound { .. }
        ));
    }

    #[test]
    fn reads_csv_matrix() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "profiles.csv", "1,2\n3,4\n");
        let m = read_csv_matrix(&path).unwrap();
        assert_eq!(m.row(1), &[3.0, 4.0]);
    }

    #[test]
    fn reads_labels() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "aparc_conte69.csv", "0\n1\n1.0\n1004\n");
        assert_eq!(read_labels(&path).unwrap(), vec![0, 1, 1, 1004]);
    }

    #[test]
    fn rejects_fractional_labels() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "labels.csv", "1.5\n");
        assert!(read_labels(&path).is_err());
    }
}
